use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_MAX_TOKENS: u64 = 4000;

/// On-disk configuration. Every field is optional so that layers can be merged.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(alias = "api_key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(alias = "default_model", alias = "model", skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    #[serde(alias = "max_tokens", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,

    /// Overrides the provider endpoint (proxies, gateways).
    #[serde(alias = "base_url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(alias = "log_level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Later layers win field by field.
    pub fn merge(&mut self, other: Config) {
        merge_option_replace(&mut self.schema, other.schema);
        merge_option_replace(&mut self.api_key, other.api_key);
        merge_option_replace(&mut self.default_model, other.default_model);
        merge_option_replace(&mut self.max_tokens, other.max_tokens);
        merge_option_replace(&mut self.base_url, other.base_url);
        merge_option_replace(&mut self.log_level, other.log_level);
    }

    /// Resolves defaults. Blank strings count as unset.
    pub fn settings(&self) -> AssistantSettings {
        AssistantSettings {
            api_key: non_blank(self.api_key.as_deref()),
            model: non_blank(self.default_model.as_deref())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: self
                .max_tokens
                .filter(|t| *t > 0)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            base_url: non_blank(self.base_url.as_deref()),
        }
    }
}

/// The values a conversation needs for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u64,
    pub base_url: Option<String>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Config::default().settings()
    }
}

fn merge_option_replace<T>(target: &mut Option<T>, source: Option<T>) {
    if let Some(value) = source {
        *target = Some(value);
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
