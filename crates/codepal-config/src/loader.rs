use crate::Config;
use anyhow::{Context, Result};
use jsonc_parser::{parse_to_serde_value, ParseOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "CODEPAL_CONFIG";
pub const CONFIG_CONTENT_ENV: &str = "CODEPAL_CONFIG_CONTENT";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

static ENV_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{env:([^}]+)\}").unwrap());

pub struct ConfigLoader {
    config: Config,
    config_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            config_paths: Vec::new(),
        }
    }

    pub fn load_from_str(&mut self, content: &str) -> Result<()> {
        let config = parse_jsonc(&substitute_env_vars(content))
            .with_context(|| "Failed to parse config content")?;
        self.config.merge(config);
        Ok(())
    }

    /// Missing files are skipped silently; unreadable or invalid ones are errors.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let content = substitute_env_vars(&content);
        let config = parse_jsonc(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        tracing::debug!(path = %path.display(), "loaded config file");
        self.config.merge(config);
        self.config_paths.push(path.to_path_buf());
        Ok(())
    }

    pub fn load_global(&mut self) -> Result<()> {
        let Some(global_config_path) = global_config_path() else {
            return Ok(());
        };

        for ext in &["jsonc", "json"] {
            let path = global_config_path.with_extension(ext);
            if path.exists() {
                self.load_from_file(&path)?;
                break;
            }
        }
        Ok(())
    }

    pub fn load_project<P: AsRef<Path>>(&mut self, project_dir: P) -> Result<()> {
        let project_dir = project_dir.as_ref();
        for target in [
            "codepal.jsonc",
            "codepal.json",
            ".codepal/codepal.jsonc",
            ".codepal/codepal.json",
        ] {
            self.load_from_file(project_dir.join(target))?;
        }
        Ok(())
    }

    pub fn load_from_env(&mut self) -> Result<()> {
        if let Ok(config_path) = env::var(CONFIG_ENV) {
            self.load_from_file(&config_path)?;
        }
        Ok(())
    }

    pub fn load_from_env_content(&mut self) -> Result<()> {
        if let Ok(config_content) = env::var(CONFIG_CONTENT_ENV) {
            self.load_from_str(&config_content)?;
        }
        Ok(())
    }

    /// Uses `ANTHROPIC_API_KEY` only when no layer configured a key.
    pub fn apply_api_key_fallback(&mut self, value: Option<String>) {
        if self.config.settings().api_key.is_none() {
            if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
                tracing::debug!("using api key from {}", API_KEY_ENV);
                self.config.api_key = Some(key);
            }
        }
    }

    /// Merge order (low -> high precedence):
    /// 1. Global config (~/.config/codepal/codepal.json{c,})
    /// 2. Custom config file (CODEPAL_CONFIG)
    /// 3. Project config (codepal.json{c,}, .codepal/codepal.json{c,})
    /// 4. Inline config (CODEPAL_CONFIG_CONTENT)
    /// Then the ANTHROPIC_API_KEY fallback.
    pub fn load_all(&mut self, project_dir: Option<&Path>) -> Result<Config> {
        self.load_global()?;
        self.load_from_env()?;
        if let Some(project_dir) = project_dir {
            self.load_project(project_dir)?;
        }
        self.load_from_env_content()?;
        self.apply_api_key_fallback(env::var(API_KEY_ENV).ok());
        Ok(self.config.clone())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("codepal/codepal"))
}

/// Substitute `{env:VAR}` patterns with environment variable values.
/// Works on the raw JSONC text before parsing.
fn substitute_env_vars(text: &str) -> String {
    ENV_PATTERN
        .replace_all(text, |caps: &regex::Captures| {
            env::var(&caps[1]).unwrap_or_default()
        })
        .to_string()
}

fn parse_jsonc(content: &str) -> Result<Config> {
    let parse_options = ParseOptions {
        allow_trailing_commas: true,
        ..Default::default()
    };
    let parsed = parse_to_serde_value(content, &parse_options)
        .with_context(|| "Failed to parse JSONC")?
        .context("Config content is empty")?;
    serde_json::from_value(parsed).with_context(|| "Failed to parse config JSON")
}
