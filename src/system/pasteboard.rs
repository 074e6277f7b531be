//! OS clipboard primitive
//!
//! The engine only needs four things from the platform: a change token that
//! moves whenever the clipboard is written, plain-text read and write, and a
//! best-effort guess at the foreground application.

use std::sync::{Arc, Mutex};

use crate::shared::errors::{EngineError, EngineResult};

/// Opaque value that changes whenever the clipboard contents change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChangeToken(pub i64);

pub trait Pasteboard: Send {
    fn change_token(&self) -> ChangeToken;

    /// Current plain text, `None` when the clipboard holds no text
    fn read_text(&mut self) -> EngineResult<Option<String>>;

    fn write_text(&mut self, text: &str) -> EngineResult<()>;

    /// Identifier of the application presumed to own the copy. Advisory only.
    fn foreground_app(&self) -> Option<String>;
}

#[cfg(target_os = "macos")]
pub use macos::MacPasteboard;

#[cfg(not(target_os = "macos"))]
pub use system::SystemPasteboard;

/// Pasteboard backed by the running platform's clipboard
pub fn platform_pasteboard() -> EngineResult<Box<dyn Pasteboard>> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(MacPasteboard::new()))
    }

    #[cfg(not(target_os = "macos"))]
    {
        Ok(Box::new(SystemPasteboard::new()?))
    }
}

#[cfg(target_os = "macos")]
mod macos {
    use cocoa::appkit::NSPasteboardTypeString;
    use cocoa::base::{id, nil};
    use cocoa::foundation::{NSAutoreleasePool, NSInteger, NSString};
    use objc::runtime::{BOOL, NO};
    use objc::{class, msg_send, sel, sel_impl};

    use super::{ChangeToken, Pasteboard};
    use crate::shared::errors::{EngineError, EngineResult};
    use crate::system::automation;

    /// `NSPasteboard.generalPasteboard`, token = `changeCount`
    #[derive(Debug, Default)]
    pub struct MacPasteboard;

    impl MacPasteboard {
        pub fn new() -> Self {
            Self
        }
    }

    fn general_pasteboard() -> EngineResult<id> {
        unsafe {
            let pb: id = msg_send![class!(NSPasteboard), generalPasteboard];
            if pb == nil {
                return Err(EngineError::Clipboard("Failed to get NSPasteboard".to_string()));
            }
            Ok(pb)
        }
    }

    impl Pasteboard for MacPasteboard {
        fn change_token(&self) -> ChangeToken {
            match general_pasteboard() {
                Ok(pb) => unsafe {
                    let count: NSInteger = msg_send![pb, changeCount];
                    ChangeToken(count as i64)
                },
                Err(_) => ChangeToken::default(),
            }
        }

        fn read_text(&mut self) -> EngineResult<Option<String>> {
            let pb = general_pasteboard()?;

            unsafe {
                let pool = NSAutoreleasePool::new(nil);
                let ns_string: id = msg_send![pb, stringForType: NSPasteboardTypeString];

                let text = if ns_string == nil {
                    None
                } else {
                    let c_str = std::ffi::CStr::from_ptr(NSString::UTF8String(ns_string));
                    Some(c_str.to_string_lossy().into_owned())
                };

                pool.drain();
                Ok(text)
            }
        }

        fn write_text(&mut self, text: &str) -> EngineResult<()> {
            let pb = general_pasteboard()?;

            unsafe {
                let pool = NSAutoreleasePool::new(nil);
                let _: NSInteger = msg_send![pb, clearContents];

                let ns_string = NSString::alloc(nil).init_str(text).autorelease();
                if ns_string == nil {
                    pool.drain();
                    return Err(EngineError::Clipboard("Failed to create NSString".to_string()));
                }

                let written: BOOL = msg_send![pb, setString: ns_string forType: NSPasteboardTypeString];
                pool.drain();

                if written == NO {
                    return Err(EngineError::Clipboard("Failed to write to clipboard".to_string()));
                }
            }

            Ok(())
        }

        fn foreground_app(&self) -> Option<String> {
            automation::frontmost_app_identifier()
        }
    }
}

#[cfg(not(target_os = "macos"))]
mod system {
    use cli_clipboard::{ClipboardContext, ClipboardProvider};

    use super::{ChangeToken, Pasteboard};
    use crate::shared::errors::{EngineError, EngineResult};
    use crate::system::automation;

    /// cli-clipboard backed pasteboard.
    ///
    /// These platforms expose no change counter, so the token is a digest of the
    /// current text and the clipboard is read on every check. A copy of text
    /// identical to what is already on the clipboard leaves the token unchanged
    /// and goes unnoticed, even when it differs from the history head.
    #[derive(Debug, Default)]
    pub struct SystemPasteboard;

    impl SystemPasteboard {
        pub fn new() -> EngineResult<Self> {
            // Fail early if the display clipboard is unreachable
            ClipboardContext::new()
                .map_err(|e| EngineError::Clipboard(format!("Failed to open clipboard: {}", e)))?;
            Ok(Self)
        }
    }

    fn current_text() -> EngineResult<String> {
        ClipboardContext::new()
            .and_then(|mut ctx| ctx.get_contents())
            .map_err(|e| EngineError::Clipboard(format!("Failed to read clipboard: {}", e)))
    }

    fn digest_token(text: &str) -> ChangeToken {
        let digest = md5::compute(text.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.0[..8]);
        ChangeToken(i64::from_le_bytes(head))
    }

    impl Pasteboard for SystemPasteboard {
        fn change_token(&self) -> ChangeToken {
            current_text()
                .map(|text| digest_token(&text))
                .unwrap_or_default()
        }

        fn read_text(&mut self) -> EngineResult<Option<String>> {
            current_text().map(|text| if text.is_empty() { None } else { Some(text) })
        }

        fn write_text(&mut self, text: &str) -> EngineResult<()> {
            ClipboardContext::new()
                .and_then(|mut ctx| ctx.set_contents(text.to_string()))
                .map_err(|e| EngineError::Clipboard(format!("Failed to write to clipboard: {}", e)))
        }

        fn foreground_app(&self) -> Option<String> {
            automation::frontmost_app_identifier()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_digest_token_follows_text_not_writes() {
            assert_eq!(digest_token("B"), digest_token("B"));
            assert_ne!(digest_token("A"), digest_token("B"));
        }
    }
}

#[derive(Debug, Default)]
struct MemoryContents {
    text: Option<String>,
    change_count: i64,
    foreground_app: Option<String>,
    fail_writes: bool,
}

/// In-process pasteboard with its own change counter.
///
/// Clones share contents, so a test (or an embedding host) can keep a handle to
/// simulate copies made by other applications while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryPasteboard {
    inner: Arc<Mutex<MemoryContents>>,
}

impl MemoryPasteboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> std::sync::MutexGuard<'_, MemoryContents> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Simulate another application copying `text`
    pub fn external_copy(&self, text: impl Into<String>, app: Option<&str>) {
        let mut contents = self.contents();
        contents.text = Some(text.into());
        contents.foreground_app = app.map(str::to_string);
        contents.change_count += 1;
    }

    /// Simulate another application clearing the clipboard or copying non-text data
    pub fn external_clear(&self) {
        let mut contents = self.contents();
        contents.text = None;
        contents.change_count += 1;
    }

    /// Make subsequent writes fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.contents().fail_writes = fail;
    }

    pub fn text(&self) -> Option<String> {
        self.contents().text.clone()
    }
}

impl Pasteboard for MemoryPasteboard {
    fn change_token(&self) -> ChangeToken {
        ChangeToken(self.contents().change_count)
    }

    fn read_text(&mut self) -> EngineResult<Option<String>> {
        Ok(self.contents().text.clone())
    }

    fn write_text(&mut self, text: &str) -> EngineResult<()> {
        let mut contents = self.contents();
        if contents.fail_writes {
            return Err(EngineError::Clipboard("Failed to write to clipboard".to_string()));
        }
        contents.text = Some(text.to_string());
        contents.change_count += 1;
        Ok(())
    }

    fn foreground_app(&self) -> Option<String> {
        self.contents().foreground_app.clone()
    }
}
