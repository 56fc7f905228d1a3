pub mod registry;

use serde::{Deserialize, Serialize};

pub use registry::ProviderRegistry;

/// A known provider and the base URL it is reached at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPreset {
    pub name: String,
    pub base_url: String,
    /// Suggested model identifiers for this provider
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
}

impl ProviderPreset {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            models: Vec::new(),
        }
    }
}

/// Built-in provider table, used when the configuration lists no presets
pub fn builtin_presets() -> Vec<ProviderPreset> {
    vec![
        ProviderPreset::new("milocode", "https://api.joyzhi.com"),
        ProviderPreset::new("ollama", "http://localhost:11434"),
        ProviderPreset::new("duckcodingJP", "https://jp.duckcoding.com"),
        ProviderPreset::new("FastRouter", "https://api-key.info"),
        ProviderPreset::new("i7Relay", "https://i7dc.com/api"),
    ]
}

/// Built-in API modes
pub fn builtin_api_modes() -> Vec<String> {
    [
        "openai-completions",
        "openai-responses",
        "anthropic-messages",
        "google-generative-ai",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
