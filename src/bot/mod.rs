//! Bot module - receives chat messages and answers birthday greetings.

pub mod engine;
pub mod message;
pub mod telegram;
pub mod transport;

pub use engine::{Engine, EngineOptions};
pub use message::{ContactInfo, InboundMessage};
pub use telegram::TelegramTransport;
pub use transport::Transport;
