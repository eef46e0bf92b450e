pub mod anthropic;
pub mod message;
pub mod provider;

pub use anthropic::{AnthropicFactory, AnthropicProvider};
pub use message::*;
pub use provider::*;
