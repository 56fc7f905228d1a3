use axum::{extract::State, response::Html, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::form::{FormAction, FormState, FormSubmission, FormView};
use crate::merge::{merge, Payload};
use crate::providers::ProviderPreset;

use super::{AppError, AppState};

const FORM_PAGE: &str = include_str!("../../static/index.html");

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderPreset>,
    pub base_urls: Vec<String>,
    pub api_modes: Vec<String>,
}

/// Current form state posted back by the page with the edit to apply
#[derive(Debug, Deserialize)]
pub struct FormUpdate {
    pub state: FormState,
    pub action: FormAction,
}

/// Form state and the view derived from it
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub state: FormState,
    pub view: FormView,
}

impl FormResponse {
    fn new(state: FormState, app: &AppState) -> Self {
        let view = state.view(&app.registry);
        Self { state, view }
    }
}

#[derive(Debug, Serialize)]
pub struct MergeResponse {
    /// Display text, pretty-printed
    pub output: String,
    pub config: Value,
}

pub async fn serve_form() -> Html<&'static str> {
    Html(FORM_PAGE)
}

pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn get_providers(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    let registry = &state.registry;

    Json(ProvidersResponse {
        providers: registry.presets().to_vec(),
        base_urls: registry.base_urls().into_iter().map(str::to_string).collect(),
        api_modes: registry.api_modes().to_vec(),
    })
}

/// Fresh form
pub async fn get_form(State(state): State<Arc<AppState>>) -> Json<FormResponse> {
    let form = FormState::new(&state.registry);
    Json(FormResponse::new(form, &state))
}

/// Apply one edit and derive the new view
pub async fn update_form(
    State(state): State<Arc<AppState>>,
    Json(update): Json<FormUpdate>,
) -> Json<FormResponse> {
    let mut form = update.state;
    if !form.apply(&state.registry, update.action.clone()) {
        debug!("Form edit changed nothing: {:?}", update.action);
    }
    Json(FormResponse::new(form, &state))
}

/// Presence checks on the form state, then merge
pub async fn submit_form(Json(form): Json<FormState>) -> Result<Json<MergeResponse>, AppError> {
    let payload = form.to_payload().map_err(|e| {
        warn!("Rejected form submission: {}", e);
        AppError::from(e)
    })?;
    merge_payload(payload)
}

/// Presence checks on flat values, then merge
pub async fn merge_config(
    Json(submission): Json<FormSubmission>,
) -> Result<Json<MergeResponse>, AppError> {
    let payload = submission.into_payload().map_err(|e| {
        warn!("Rejected merge request: {}", e);
        AppError::from(e)
    })?;
    merge_payload(payload)
}

fn merge_payload(payload: Payload) -> Result<Json<MergeResponse>, AppError> {
    let merged = merge(&payload).map_err(|e| {
        warn!("Base config for provider '{}' did not parse: {}", payload.provider, e);
        AppError::from(e)
    })?;

    info!(
        "Generated config for provider '{}' ({} model(s))",
        payload.provider,
        payload.model_ids.len()
    );

    Ok(Json(MergeResponse {
        output: merged.to_pretty_string(),
        config: merged.into_value(),
    }))
}
