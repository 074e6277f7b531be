pub mod automation;
pub mod pasteboard;

pub use pasteboard::{platform_pasteboard, ChangeToken, MemoryPasteboard, Pasteboard};
