//! Form state for the connection settings.
//!
//! Every select field is either a preset option or a free-typed custom value.
//! [`FormState::view`] derives what the page shows from that state; the page
//! never holds state of its own: every edit is a [`FormAction`] applied with
//! [`FormState::apply`]. [`FormState::to_payload`] runs the presence checks
//! and hands a [`Payload`] to the merger.

use crate::merge::Payload;
use crate::providers::ProviderRegistry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Option value that switches a select field to its custom input
pub const CUSTOM_OPTION: &str = "custom";

/// Presence check failures, reported before the merger runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter the config JSON")]
    MissingConfig,

    #[error("Please select or enter a base URL")]
    MissingBaseUrl,

    #[error("Please enter an API key")]
    MissingApiKey,

    #[error("Please select or enter at least one model ID")]
    MissingModels,
}

/// Value of a select field: a preset option or a custom entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldChoice {
    Preset(String),
    Custom(String),
}

impl FieldChoice {
    /// Effective value, trimmed
    pub fn value(&self) -> &str {
        match self {
            FieldChoice::Preset(value) | FieldChoice::Custom(value) => value.trim(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, FieldChoice::Custom(_))
    }

    /// Option value selected in the dropdown
    fn selected(&self) -> &str {
        match self {
            FieldChoice::Preset(value) => value,
            FieldChoice::Custom(_) => CUSTOM_OPTION,
        }
    }

    fn first_or_custom<S: AsRef<str>>(options: &[S]) -> Self {
        options
            .first()
            .map(|o| FieldChoice::Preset(o.as_ref().to_string()))
            .unwrap_or_else(|| FieldChoice::Custom(String::new()))
    }
}

impl Default for FieldChoice {
    fn default() -> Self {
        FieldChoice::Custom(String::new())
    }
}

/// One edit made in the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FormAction {
    SetConfig { text: String },
    SetApiKey { text: String },
    SelectProvider { choice: FieldChoice },
    SetBaseUrl { choice: FieldChoice },
    SetApiMode { choice: FieldChoice },
    AddModelRow { choice: FieldChoice },
    RemoveModelRow { index: usize },
    SetModelRow { index: usize, choice: FieldChoice },
}

/// Current state of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub config: String,
    pub api_key: String,
    pub provider: FieldChoice,
    pub base_url: FieldChoice,
    pub api_mode: FieldChoice,
    model_rows: Vec<FieldChoice>,
}

impl FormState {
    /// Fresh form with the first provider, its base URL, the first API mode
    /// and a single model row preselected
    pub fn new(registry: &ProviderRegistry) -> Self {
        let provider = FieldChoice::first_or_custom(&registry.providers());
        let base_url = registry
            .base_url_for(provider.value())
            .map(|url| FieldChoice::Preset(url.to_string()))
            .unwrap_or_else(|| FieldChoice::first_or_custom(&registry.base_urls()));
        let model_row = FieldChoice::first_or_custom(registry.models_for(provider.value()));

        Self {
            config: String::new(),
            api_key: String::new(),
            provider,
            base_url,
            api_mode: FieldChoice::first_or_custom(registry.api_modes()),
            model_rows: vec![model_row],
        }
    }

    /// Change the provider. A preset provider with a known base URL pulls
    /// that URL into the base URL field; a custom provider leaves it alone.
    pub fn select_provider(&mut self, registry: &ProviderRegistry, choice: FieldChoice) {
        if let FieldChoice::Preset(name) = &choice {
            if let Some(url) = registry.base_url_for(name) {
                self.base_url = FieldChoice::Preset(url.to_string());
            }
        }
        self.provider = choice;
    }

    pub fn model_rows(&self) -> &[FieldChoice] {
        &self.model_rows
    }

    pub fn add_model_row(&mut self, choice: FieldChoice) {
        self.model_rows.push(choice);
    }

    /// Remove a model row. The last remaining row stays.
    pub fn remove_model_row(&mut self, index: usize) -> bool {
        if self.model_rows.len() <= 1 || index >= self.model_rows.len() {
            return false;
        }
        self.model_rows.remove(index);
        true
    }

    pub fn set_model_row(&mut self, index: usize, choice: FieldChoice) -> bool {
        match self.model_rows.get_mut(index) {
            Some(row) => {
                *row = choice;
                true
            }
            None => false,
        }
    }

    /// Apply one edit. Returns false when the edit changed nothing
    /// (out-of-range row, removing the last row).
    pub fn apply(&mut self, registry: &ProviderRegistry, action: FormAction) -> bool {
        match action {
            FormAction::SetConfig { text } => self.config = text,
            FormAction::SetApiKey { text } => self.api_key = text,
            FormAction::SelectProvider { choice } => self.select_provider(registry, choice),
            FormAction::SetBaseUrl { choice } => self.base_url = choice,
            FormAction::SetApiMode { choice } => self.api_mode = choice,
            FormAction::AddModelRow { choice } => self.add_model_row(choice),
            FormAction::RemoveModelRow { index } => return self.remove_model_row(index),
            FormAction::SetModelRow { index, choice } => return self.set_model_row(index, choice),
        }
        true
    }

    /// Derive what the page shows
    pub fn view(&self, registry: &ProviderRegistry) -> FormView {
        let removable = self.model_rows.len() > 1;
        let model_options = registry.models_for(self.provider.value());

        FormView {
            provider: SelectView::new(&registry.providers(), &self.provider),
            base_url: SelectView::new(&registry.base_urls(), &self.base_url),
            api_mode: SelectView::new(registry.api_modes(), &self.api_mode),
            model_rows: self
                .model_rows
                .iter()
                .map(|row| ModelRowView {
                    select: SelectView::new(model_options, row),
                    removable,
                })
                .collect(),
        }
    }

    /// Collect the trimmed values and run the presence checks
    pub fn to_payload(&self) -> Result<Payload, ValidationError> {
        FormSubmission::from(self).into_payload()
    }
}

/// One dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// A select field with its trailing custom option and custom input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectView {
    pub options: Vec<SelectOption>,
    pub selected: String,
    pub custom_visible: bool,
    pub custom_value: String,
}

impl SelectView {
    fn new<S: AsRef<str>>(options: &[S], choice: &FieldChoice) -> Self {
        let mut options: Vec<SelectOption> = options
            .iter()
            .map(|o| SelectOption {
                value: o.as_ref().to_string(),
                label: o.as_ref().to_string(),
            })
            .collect();
        options.push(SelectOption {
            value: CUSTOM_OPTION.to_string(),
            label: "Custom".to_string(),
        });

        let custom_value = match choice {
            FieldChoice::Custom(value) => value.clone(),
            FieldChoice::Preset(_) => String::new(),
        };

        Self {
            options,
            selected: choice.selected().to_string(),
            custom_visible: choice.is_custom(),
            custom_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelRowView {
    #[serde(flatten)]
    pub select: SelectView,
    pub removable: bool,
}

/// Presentation derived from [`FormState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub provider: SelectView,
    pub base_url: SelectView,
    pub api_mode: SelectView,
    pub model_rows: Vec<ModelRowView>,
}

/// Flat form values as posted by the page, before any checks.
/// Missing fields read as empty so they fail the presence checks instead of
/// failing to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSubmission {
    pub config: String,
    #[serde(rename = "baseurl")]
    pub base_url: String,
    #[serde(rename = "apikey")]
    pub api_key: String,
    #[serde(rename = "apimode")]
    pub api_mode: String,
    pub provider: String,
    #[serde(rename = "modelIds")]
    pub model_ids: Vec<String>,
}

impl FormSubmission {
    /// Trim every value, drop blank model IDs, then check presence in form
    /// order: config, base URL, API key, models.
    pub fn into_payload(self) -> Result<Payload, ValidationError> {
        let config = self.config.trim().to_string();
        let base_url = self.base_url.trim().to_string();
        let api_key = self.api_key.trim().to_string();
        let model_ids: Vec<String> = self
            .model_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        if config.is_empty() {
            return Err(ValidationError::MissingConfig);
        }
        if base_url.is_empty() {
            return Err(ValidationError::MissingBaseUrl);
        }
        if api_key.is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        if model_ids.is_empty() {
            return Err(ValidationError::MissingModels);
        }

        Ok(Payload {
            config,
            base_url,
            api_key,
            api_mode: self.api_mode.trim().to_string(),
            provider: self.provider.trim().to_string(),
            model_ids,
        })
    }
}

impl From<&FormState> for FormSubmission {
    fn from(state: &FormState) -> Self {
        Self {
            config: state.config.clone(),
            base_url: state.base_url.value().to_string(),
            api_key: state.api_key.clone(),
            api_mode: state.api_mode.value().to_string(),
            provider: state.provider.value().to_string(),
            model_ids: state
                .model_rows
                .iter()
                .map(|row| row.value().to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderPreset;

    fn registry() -> ProviderRegistry {
        let mut ollama = ProviderPreset::new("ollama", "http://localhost:11434");
        ollama.models = vec!["llama3".to_string(), "qwen2".to_string()];
        ProviderRegistry::new(
            vec![
                ollama,
                ProviderPreset::new("relay", "https://relay.example"),
            ],
            vec!["openai-completions".to_string()],
        )
    }

    fn filled_form() -> FormState {
        let registry = registry();
        let mut form = FormState::new(&registry);
        form.config = "  {\"a\":1}  ".to_string();
        form.api_key = " key ".to_string();
        form
    }

    #[test]
    fn test_new_form_preselects_first_entries() {
        let registry = registry();
        let form = FormState::new(&registry);

        assert_eq!(form.provider, FieldChoice::Preset("ollama".to_string()));
        assert_eq!(
            form.base_url,
            FieldChoice::Preset("http://localhost:11434".to_string())
        );
        assert_eq!(
            form.api_mode,
            FieldChoice::Preset("openai-completions".to_string())
        );
        assert_eq!(form.model_rows(), [FieldChoice::Preset("llama3".to_string())]);
    }

    #[test]
    fn test_new_form_with_empty_registry_uses_custom_inputs() {
        let registry = ProviderRegistry::new(Vec::new(), Vec::new());
        let form = FormState::new(&registry);
        let view = form.view(&registry);

        assert!(view.provider.custom_visible);
        assert!(view.base_url.custom_visible);
        assert!(view.api_mode.custom_visible);
        assert_eq!(view.provider.options.len(), 1);
        assert_eq!(view.provider.options[0].value, CUSTOM_OPTION);
    }

    #[test]
    fn test_preset_provider_binds_base_url() {
        let registry = registry();
        let mut form = FormState::new(&registry);
        form.base_url = FieldChoice::Custom("https://mine".to_string());

        form.select_provider(&registry, FieldChoice::Preset("relay".to_string()));

        assert_eq!(
            form.base_url,
            FieldChoice::Preset("https://relay.example".to_string())
        );
        assert!(!form.view(&registry).base_url.custom_visible);
    }

    #[test]
    fn test_custom_provider_keeps_base_url() {
        let registry = registry();
        let mut form = FormState::new(&registry);
        form.base_url = FieldChoice::Custom("https://mine".to_string());

        form.select_provider(&registry, FieldChoice::Custom("acme".to_string()));

        assert_eq!(form.base_url, FieldChoice::Custom("https://mine".to_string()));
        let view = form.view(&registry);
        assert!(view.provider.custom_visible);
        assert_eq!(view.provider.selected, CUSTOM_OPTION);
        assert_eq!(view.provider.custom_value, "acme");
    }

    #[test]
    fn test_last_model_row_cannot_be_removed() {
        let registry = registry();
        let mut form = FormState::new(&registry);

        assert!(!form.remove_model_row(0));
        assert!(!form.view(&registry).model_rows[0].removable);

        form.add_model_row(FieldChoice::Custom("m2".to_string()));
        let view = form.view(&registry);
        assert!(view.model_rows.iter().all(|row| row.removable));
        assert!(view.model_rows[1].select.custom_visible);

        assert!(!form.remove_model_row(5));
        assert!(form.remove_model_row(0));
        assert_eq!(form.model_rows(), [FieldChoice::Custom("m2".to_string())]);
    }

    #[test]
    fn test_model_row_options_follow_provider() {
        let registry = registry();
        let mut form = FormState::new(&registry);

        let values: Vec<String> = form.view(&registry).model_rows[0]
            .select
            .options
            .iter()
            .map(|o| o.value.clone())
            .collect();
        assert_eq!(values, vec!["llama3", "qwen2", CUSTOM_OPTION]);

        form.select_provider(&registry, FieldChoice::Preset("relay".to_string()));
        assert_eq!(form.view(&registry).model_rows[0].select.options.len(), 1);
    }

    #[test]
    fn test_to_payload_trims_and_drops_blank_rows() {
        let mut form = filled_form();
        form.add_model_row(FieldChoice::Custom("   ".to_string()));
        form.add_model_row(FieldChoice::Custom(" m2 ".to_string()));

        let payload = form.to_payload().unwrap();

        assert_eq!(payload.config, "{\"a\":1}");
        assert_eq!(payload.api_key, "key");
        assert_eq!(payload.provider, "ollama");
        assert_eq!(payload.model_ids, vec!["llama3", "m2"]);
    }

    #[test]
    fn test_validation_order() {
        let mut form = filled_form();
        form.config = " ".to_string();
        form.api_key.clear();
        assert_eq!(form.to_payload(), Err(ValidationError::MissingConfig));

        form.config = "{}".to_string();
        form.base_url = FieldChoice::Custom(String::new());
        assert_eq!(form.to_payload(), Err(ValidationError::MissingBaseUrl));

        form.base_url = FieldChoice::Custom("https://x".to_string());
        assert_eq!(form.to_payload(), Err(ValidationError::MissingApiKey));

        form.api_key = "k".to_string();
        form.set_model_row(0, FieldChoice::Custom(String::new()));
        assert_eq!(form.to_payload(), Err(ValidationError::MissingModels));
    }

    #[test]
    fn test_apply_routes_every_edit() {
        let registry = registry();
        let mut form = FormState::new(&registry);

        assert!(form.apply(&registry, FormAction::SetConfig { text: "{}".to_string() }));
        assert!(form.apply(&registry, FormAction::SetApiKey { text: "k".to_string() }));
        assert!(form.apply(
            &registry,
            FormAction::SelectProvider {
                choice: FieldChoice::Preset("relay".to_string())
            }
        ));
        assert!(form.apply(
            &registry,
            FormAction::AddModelRow {
                choice: FieldChoice::Custom("m2".to_string())
            }
        ));
        assert!(form.apply(
            &registry,
            FormAction::SetModelRow {
                index: 0,
                choice: FieldChoice::Custom("m1".to_string())
            }
        ));
        assert!(!form.apply(&registry, FormAction::RemoveModelRow { index: 7 }));

        let payload = form.to_payload().unwrap();
        assert_eq!(payload.base_url, "https://relay.example");
        assert_eq!(payload.provider, "relay");
        assert_eq!(payload.model_ids, vec!["m1", "m2"]);
    }

    #[test]
    fn test_action_wire_format() {
        let action: FormAction = serde_json::from_str(
            r#"{"action":"set_model_row","index":1,"choice":{"kind":"custom","value":"x"}}"#,
        )
        .unwrap();

        assert_eq!(
            action,
            FormAction::SetModelRow {
                index: 1,
                choice: FieldChoice::Custom("x".to_string())
            }
        );
    }

    #[test]
    fn test_submission_with_missing_fields_fails_presence_check() {
        let submission: FormSubmission =
            serde_json::from_str(r#"{"config":"{}","baseurl":"http://x"}"#).unwrap();

        assert_eq!(
            submission.into_payload(),
            Err(ValidationError::MissingApiKey)
        );
    }
}
