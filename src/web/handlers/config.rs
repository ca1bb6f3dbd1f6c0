//! `GET/PATCH /config*` (spec §6/§9): read-only process settings plus the
//! mutable per-task-type model registry.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::AppResult;
use crate::web::state::AppState;

pub async fn get_config(State(state): State<AppState>) -> Json<Settings> {
    Json(state.settings.read().clone())
}

#[derive(Deserialize)]
pub struct PatchConfigBody {
    pub orchestrator_intensity: Option<crate::config::OrchestratorIntensity>,
}

pub async fn patch_config(State(state): State<AppState>, Json(body): Json<PatchConfigBody>) -> Json<Settings> {
    let mut settings = state.settings.write();
    if let Some(intensity) = body.orchestrator_intensity {
        settings.orchestrator_intensity = intensity;
    }
    Json(settings.clone())
}

pub async fn get_models(State(state): State<AppState>) -> Json<HashMap<String, String>> {
    Json(state.model_registry.get_all_models())
}

#[derive(Deserialize)]
pub struct PutModelsBody {
    pub task_type: String,
    pub model_id: String,
}

#[derive(Serialize)]
pub struct ModelsResponse {
    pub models: HashMap<String, String>,
}

pub async fn put_models(State(state): State<AppState>, Json(body): Json<PutModelsBody>) -> AppResult<Json<ModelsResponse>> {
    state.model_registry.set_model(&body.task_type, body.model_id);
    Ok(Json(ModelsResponse { models: state.model_registry.get_all_models() }))
}
