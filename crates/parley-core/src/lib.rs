//! Chat session, chat modes, configuration and answer synthesis.

pub mod bootstrap;
pub mod cache;
pub mod channel;
pub mod config;
pub mod error;
pub mod ingest;
pub mod input;
pub mod mode;
pub mod session;
pub mod synthesizer;
pub mod vault;

pub use channel::{Channel, ChannelError, ChannelMessage, Reference};
pub use config::Config;
pub use error::{ChatError, GenerationError};
pub use input::{InputSet, InputSetKey, Source};
pub use mode::ChatMode;
pub use session::Session;
