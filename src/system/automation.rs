//! Foreground application lookup
//!
//! Used to attach a source hint to ingested entries. Polling runs every
//! 500 ms, so the frontmost app is only a guess at who copied.

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "macos")]
pub use macos::frontmost_app_identifier;

#[cfg(not(target_os = "macos"))]
pub fn frontmost_app_identifier() -> Option<String> {
    None
}
