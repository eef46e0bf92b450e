use anyhow::Result;
use std::path::Path;

use codepal_config::{ConfigLoader, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use codepal_provider::AnthropicProvider;

pub(crate) fn list_models() {
    println!("\n╔══════════════════════════════════════════╗");
    println!("║         Available Models                 ║");
    println!("╚══════════════════════════════════════════╝\n");

    for model in AnthropicProvider::known_models() {
        let marker = if model.id == DEFAULT_MODEL { " (default)" } else { "" };
        println!("  {}{}", model.id, marker);
        println!(
            "      {} · context {} · max output {}",
            model.name, model.context_window, model.max_output_tokens
        );
    }
    println!("\nSet `defaultModel` in codepal.json to pick one.");
}

pub(crate) fn show_config(root: &Path) -> Result<()> {
    let mut loader = ConfigLoader::new();
    let config = loader.load_all(Some(root))?;
    let settings = config.settings();

    println!("\n╔══════════════════════════════════════════╗");
    println!("║         Configuration                    ║");
    println!("╚══════════════════════════════════════════╝\n");

    println!("Workspace: {}", root.display());
    if loader.config_paths().is_empty() {
        println!("Config files: none");
    } else {
        println!("Config files:");
        for path in loader.config_paths() {
            println!("  - {}", path.display());
        }
    }

    println!();
    println!("API key:    {}", mask_key(settings.api_key.as_deref()));
    println!(
        "Model:      {}{}",
        settings.model,
        if config.default_model.is_none() { " (default)" } else { "" }
    );
    println!(
        "Max tokens: {}{}",
        settings.max_tokens,
        if settings.max_tokens == DEFAULT_MAX_TOKENS && config.max_tokens.is_none() {
            " (default)"
        } else {
            ""
        }
    );
    if let Some(base_url) = &settings.base_url {
        println!("Base URL:   {}", base_url);
    }
    if let Some(level) = &config.log_level {
        println!("Log level:  {}", level);
    }
    Ok(())
}

fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "not set".to_string(),
        Some(key) if key.chars().count() <= 8 => "set".to_string(),
        Some(key) => {
            let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("set (…{})", tail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(None), "not set");
        assert_eq!(mask_key(Some("short")), "set");
        assert_eq!(mask_key(Some("sk-ant-0123456789abcd")), "set (…abcd)");
    }
}
