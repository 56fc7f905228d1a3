use super::{builtin_api_modes, builtin_presets, ProviderPreset};
use std::collections::HashMap;
use tracing::warn;

/// Provider registry that holds the preset lookup table
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    /// Presets in display order
    presets: Vec<ProviderPreset>,
    /// Map of provider name -> index into `presets` for fast lookup
    by_name: HashMap<String, usize>,
    api_modes: Vec<String>,
}

impl ProviderRegistry {
    /// Create a registry from presets and API modes.
    /// A repeated provider name keeps its first position and takes the later entry.
    pub fn new(presets: Vec<ProviderPreset>, api_modes: Vec<String>) -> Self {
        let mut registry = Self {
            presets: Vec::with_capacity(presets.len()),
            by_name: HashMap::new(),
            api_modes,
        };

        for preset in presets {
            match registry.by_name.get(&preset.name) {
                Some(&index) => {
                    warn!("Duplicate provider preset '{}', later entry wins", preset.name);
                    registry.presets[index] = preset;
                }
                None => {
                    registry
                        .by_name
                        .insert(preset.name.clone(), registry.presets.len());
                    registry.presets.push(preset);
                }
            }
        }

        registry
    }

    /// Registry with the built-in provider table and API modes
    pub fn builtin() -> Self {
        Self::new(builtin_presets(), builtin_api_modes())
    }

    pub fn presets(&self) -> &[ProviderPreset] {
        &self.presets
    }

    /// Provider names in table order
    pub fn providers(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ProviderPreset> {
        self.by_name.get(name).map(|&index| &self.presets[index])
    }

    pub fn base_url_for(&self, name: &str) -> Option<&str> {
        self.get(name).map(|p| p.base_url.as_str())
    }

    /// Suggested models for a provider (empty for unknown providers)
    pub fn models_for(&self, name: &str) -> &[String] {
        self.get(name).map(|p| p.models.as_slice()).unwrap_or(&[])
    }

    /// Unique base URLs, in the order they first appear
    pub fn base_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = Vec::new();
        for preset in &self.presets {
            if !urls.contains(&preset.base_url.as_str()) {
                urls.push(preset.base_url.as_str());
            }
        }
        urls
    }

    pub fn api_modes(&self) -> &[String] {
        &self.api_modes
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = ProviderRegistry::builtin();

        assert_eq!(
            registry.providers(),
            vec!["milocode", "ollama", "duckcodingJP", "FastRouter", "i7Relay"]
        );
        assert_eq!(registry.base_url_for("ollama"), Some("http://localhost:11434"));
        assert_eq!(registry.base_url_for("unknown"), None);
        assert_eq!(registry.api_modes()[0], "openai-completions");
    }

    #[test]
    fn test_base_urls_are_unique_in_first_seen_order() {
        let registry = ProviderRegistry::new(
            vec![
                ProviderPreset::new("a", "https://one"),
                ProviderPreset::new("b", "https://two"),
                ProviderPreset::new("c", "https://one"),
            ],
            Vec::new(),
        );

        assert_eq!(registry.base_urls(), vec!["https://one", "https://two"]);
    }

    #[test]
    fn test_duplicate_preset_replaces_in_place() {
        let registry = ProviderRegistry::new(
            vec![
                ProviderPreset::new("a", "https://old"),
                ProviderPreset::new("b", "https://b"),
                ProviderPreset::new("a", "https://new"),
            ],
            Vec::new(),
        );

        assert_eq!(registry.providers(), vec!["a", "b"]);
        assert_eq!(registry.base_url_for("a"), Some("https://new"));
    }

    #[test]
    fn test_models_for_unknown_provider_is_empty() {
        let mut preset = ProviderPreset::new("ollama", "http://localhost:11434");
        preset.models = vec!["llama3".to_string()];
        let registry = ProviderRegistry::new(vec![preset], Vec::new());

        assert_eq!(registry.models_for("ollama"), ["llama3".to_string()]);
        assert!(registry.models_for("nope").is_empty());
    }
}
