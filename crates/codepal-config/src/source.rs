use parking_lot::Mutex;
use std::path::PathBuf;

use crate::{AssistantSettings, Config, ConfigLoader};

/// Where a conversation reads its settings from, once per request.
pub trait ConfigSource: Send + Sync {
    fn settings(&self) -> AssistantSettings;
}

impl ConfigSource for Config {
    fn settings(&self) -> AssistantSettings {
        Config::settings(self)
    }
}

impl ConfigSource for AssistantSettings {
    fn settings(&self) -> AssistantSettings {
        self.clone()
    }
}

/// Re-reads every config layer on each call, so edits apply to the next message.
///
/// A layer that fails to load keeps the last good configuration.
pub struct FileConfigSource {
    project_dir: Option<PathBuf>,
    last_good: Mutex<Config>,
}

impl FileConfigSource {
    pub fn new(project_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            last_good: Mutex::new(Config::default()),
        }
    }

    pub fn load(&self) -> Config {
        let mut loader = ConfigLoader::new();
        match loader.load_all(self.project_dir.as_deref()) {
            Ok(config) => {
                *self.last_good.lock() = config.clone();
                config
            }
            Err(error) => {
                tracing::warn!(error = %format!("{error:#}"), "failed to reload config, keeping previous");
                self.last_good.lock().clone()
            }
        }
    }
}

impl ConfigSource for FileConfigSource {
    fn settings(&self) -> AssistantSettings {
        self.load().settings()
    }
}
