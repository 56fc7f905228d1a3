//! Builds the merged model/agent configuration document.
//!
//! The user's base config is parsed as JSON and spread into a fresh object.
//! The generated `models` and `agents` sections replace any same-named
//! top-level keys, and the top-level `auth` key is dropped. Nothing is
//! retained between calls.

pub mod error;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

pub use error::MergeError;

/// Mode instructing the downstream tool to combine the `models` section with
/// its other configuration sources.
pub const MERGE_MODE: &str = "merge";

/// Connection settings and base config collected from the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Raw JSON text of the user's base config
    pub config: String,
    #[serde(rename = "baseurl")]
    pub base_url: String,
    #[serde(rename = "apikey")]
    pub api_key: String,
    #[serde(rename = "apimode")]
    pub api_mode: String,
    pub provider: String,
    /// Model identifiers in display order; the first one is the primary model
    #[serde(rename = "modelIds")]
    pub model_ids: Vec<String>,
}

impl Payload {
    /// Composite `provider/model` reference used by the agents section
    pub fn model_ref(&self, model_id: &str) -> String {
        format!("{}/{}", self.provider, model_id)
    }

    /// Reference to the primary model, if any model was given
    pub fn primary_ref(&self) -> Option<String> {
        self.model_ids.first().map(|id| self.model_ref(id))
    }
}

/// The merged configuration document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedConfig(Map<String, Value>);

impl MergedConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Render for display, pretty-printed with 2-space indentation
    pub fn to_pretty_string(&self) -> String {
        format!("{:#}", Value::Object(self.0.clone()))
    }
}

/// Merge the generated `models` and `agents` sections into the base config.
///
/// Presence of the payload fields is the caller's responsibility. The only
/// failure is base config text that is not valid JSON.
pub fn merge(payload: &Payload) -> Result<MergedConfig, MergeError> {
    let agents = agents_section(payload);
    let models = models_section(payload);

    let base = spread(serde_json::from_str(&payload.config)?);

    // Map::remove reorders under preserve_order, so filter instead
    let mut merged: Map<String, Value> = base
        .into_iter()
        .filter(|(key, _)| key != "auth")
        .collect();
    merged.insert("models".to_string(), models);
    merged.insert("agents".to_string(), agents);

    debug!(
        "Merged config for provider '{}' with {} model(s), {} top-level keys",
        payload.provider,
        payload.model_ids.len(),
        merged.len()
    );

    Ok(MergedConfig(merged))
}

/// Top-level entries contributed by the base config. Objects give their keys,
/// arrays their indices, strings one entry per character; `null`, booleans
/// and numbers contribute nothing.
fn spread(base: Value) -> Map<String, Value> {
    match base {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        Value::String(text) => text
            .chars()
            .enumerate()
            .map(|(index, c)| (index.to_string(), Value::String(c.to_string())))
            .collect(),
        Value::Null | Value::Bool(_) | Value::Number(_) => Map::new(),
    }
}

/// `{ defaults: { model: { primary }, models: { "provider/id": { alias } } } }`
fn agents_section(payload: &Payload) -> Value {
    let mut agent_models = Map::new();
    for id in &payload.model_ids {
        // Identical composite keys keep the first position, last value wins
        agent_models.insert(payload.model_ref(id), json!({ "alias": id }));
    }

    json!({
        "defaults": {
            "model": {
                "primary": payload.primary_ref()
            },
            "models": agent_models
        }
    })
}

/// `{ mode: "merge", providers: { provider: { baseUrl, apiKey, api, models } } }`
fn models_section(payload: &Payload) -> Value {
    let models: Vec<Value> = payload
        .model_ids
        .iter()
        .map(|id| json!({ "id": id, "name": id }))
        .collect();

    let mut providers = Map::new();
    providers.insert(
        payload.provider.clone(),
        json!({
            "baseUrl": payload.base_url,
            "apiKey": payload.api_key,
            "api": payload.api_mode,
            "models": models
        }),
    );

    json!({
        "mode": MERGE_MODE,
        "providers": providers
    })
}
