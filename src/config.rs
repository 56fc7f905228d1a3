use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crate::providers::{builtin_api_modes, ProviderPreset, ProviderRegistry};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// API modes offered in the form
    #[serde(default = "builtin_api_modes")]
    pub api_modes: Vec<String>,
    /// Provider presets; the built-in table is used when empty
    #[serde(default)]
    pub providers: Vec<ProviderPreset>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api_modes: builtin_api_modes(),
            providers: Vec::new(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            log_level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    13457
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Get default config file path
    /// Returns ~/.provider-config-merge/config.toml (cross-platform)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Failed to get home directory")?;
        let config_dir = home.join(".provider-config-merge");
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from a TOML file, creating a default one first if missing
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // Resolve environment variables
        config.resolve_env_vars()?;

        Ok(config)
    }

    /// Build the provider preset registry
    pub fn registry(&self) -> ProviderRegistry {
        if self.providers.is_empty() {
            ProviderRegistry::new(crate::providers::builtin_presets(), self.api_modes.clone())
        } else {
            ProviderRegistry::new(self.providers.clone(), self.api_modes.clone())
        }
    }

    fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        eprintln!("Created default config file at: {}", path.display());
        eprintln!("Edit it to add your own provider presets.");

        Ok(())
    }

    /// Generate default configuration content as TOML string
    fn default_config_content() -> String {
        r#"# Provider Config Merge Configuration
#
# Without [[providers]] entries the built-in provider table is used.

api_modes = ["openai-completions", "openai-responses", "anthropic-messages", "google-generative-ai"]

[server]
host = "127.0.0.1"
port = 13457
log_level = "info"

# Provider presets shown in the form. Adding any replaces the built-in table.
# A base_url starting with '$' is read from that environment variable.
# Example:
# [[providers]]
# name = "ollama"
# base_url = "http://localhost:11434"
# models = ["llama3", "qwen2.5-coder"]
"#.to_string()
    }

    /// Resolve `$VAR` base URLs from the environment
    fn resolve_env_vars(&mut self) -> Result<()> {
        for provider in &mut self.providers {
            if let Some(env_var) = provider.base_url.strip_prefix('$').map(str::to_string) {
                match std::env::var(&env_var) {
                    Ok(value) => provider.base_url = value,
                    Err(_) => anyhow::bail!(
                        "Environment variable {} not found for provider {}",
                        env_var,
                        provider.name
                    ),
                }
            }
        }

        Ok(())
    }
}
