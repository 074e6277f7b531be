pub mod types;
pub mod settings;
pub mod errors;
pub mod events;
pub mod emit;

// Re-export the error type for convenience
pub use errors::{EngineError, EngineResult};
