// Public modules
pub mod client;
pub mod client_logger;
pub mod config;
pub mod decoder;
pub mod display;
pub mod error;
pub mod observability;
pub mod outcome;
pub mod prompt;
pub mod render;
pub mod stream;

// Re-exports
pub use client::ChatClient;
pub use client_logger::ClientLogger;
pub use config::{ChatArgs, ClientConfig};
pub use decoder::{DecodeMode, Utf8StreamDecoder};
pub use display::{DisplayEvent, RecordingDisplay, ResponseDisplay};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use outcome::RequestOutcome;
pub use prompt::{DEFAULT_PROMPT, resolve_prompt};
pub use render::TerminalDisplay;
pub use stream::{ResponseBuffer, TERMINATION_MARKER, collect_response, read_response};
