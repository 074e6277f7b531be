pub mod clipboard;
pub mod engine;
pub mod features;
