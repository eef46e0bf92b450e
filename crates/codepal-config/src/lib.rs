pub mod loader;
pub mod schema;
pub mod source;

pub use loader::ConfigLoader;
pub use schema::{AssistantSettings, Config, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use source::{ConfigSource, FileConfigSource};
