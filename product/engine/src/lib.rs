pub mod bridge;
pub mod cmd;
pub mod config;
mod error;
pub mod ffmpeg;
pub mod ingest;
pub mod library;
pub mod media_uri;
pub mod paths;
pub mod probe;
pub mod scanner;
pub mod subscriptions;
pub mod tools;

pub use error::{EngineError, Result};
