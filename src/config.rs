//! Layered configuration: code defaults, overridden by `config.toml` if
//! present, overridden by environment variables. Mirrors the key names
//! the original settings module used so ops tooling doesn't have to
//! learn new names.

use std::collections::HashMap;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestratorIntensity {
    Aggressive,
    Normal,
    Idle,
    Paused,
}

impl OrchestratorIntensity {
    /// Tick interval in seconds; `None` for `Paused` (no dispatch at all).
    pub fn tick_seconds(self) -> Option<u64> {
        match self {
            OrchestratorIntensity::Aggressive => Some(60),
            OrchestratorIntensity::Normal => Some(300),
            OrchestratorIntensity::Idle => Some(1800),
            OrchestratorIntensity::Paused => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub redis_url: String,
    pub openrouter_api_key: String,
    pub default_model: String,
    pub books_path: String,
    pub covers_path: String,
    pub embedding_model: String,
    pub embedding_dimension: u32,
    pub embedding_base_url: String,
    pub orchestrator_intensity: OrchestratorIntensity,
    pub orchestrator_tick_interval: u64,
    pub cors_origins: String,
    pub api_host: String,
    pub api_port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "postgres://bookflix:bookflix_dev_password@db:5432/bookflix".into(),
            redis_url: "redis://redis:6379/0".into(),
            openrouter_api_key: String::new(),
            default_model: "stepfun/step-3.5-flash:free".into(),
            books_path: "/books".into(),
            covers_path: "/app/covers".into(),
            embedding_model: "all-MiniLM-L6-v2".into(),
            embedding_dimension: 384,
            embedding_base_url: "http://embedder:8001".into(),
            orchestrator_intensity: OrchestratorIntensity::Normal,
            orchestrator_tick_interval: 300,
            cors_origins: "http://localhost:3000,http://localhost:5173".into(),
            api_host: "0.0.0.0".into(),
            api_port: 8000,
        }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::raw().only(&[
                "DATABASE_URL",
                "REDIS_URL",
                "OPENROUTER_API_KEY",
                "DEFAULT_MODEL",
                "BOOKS_PATH",
                "COVERS_PATH",
                "EMBEDDING_MODEL",
                "EMBEDDING_DIMENSION",
                "EMBEDDING_BASE_URL",
                "ORCHESTRATOR_INTENSITY",
                "ORCHESTRATOR_TICK_INTERVAL",
                "CORS_ORIGINS",
                "API_HOST",
                "API_PORT",
            ]))
            .extract()?;
        Ok(settings)
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Task-type-keyed LLM model overrides. Process-wide singleton, held in
/// `AppState`, mutated only through `PATCH /config/models` — last write
/// wins, no durability (spec §5/§9).
#[derive(Debug)]
pub struct ModelRegistry {
    default_model: String,
    defaults: HashMap<String, String>,
    overrides: RwLock<HashMap<String, String>>,
}

const TASK_TYPES: &[&str] = &["default", "insight", "chat", "feed", "topic", "summary"];

impl ModelRegistry {
    pub fn new(default_model: String) -> Self {
        let defaults = TASK_TYPES
            .iter()
            .map(|t| (t.to_string(), default_model.clone()))
            .collect();
        Self {
            default_model,
            defaults,
            overrides: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_model(&self, task_type: &str) -> String {
        if let Some(m) = self.overrides.read().get(task_type) {
            return m.clone();
        }
        self.defaults
            .get(task_type)
            .cloned()
            .unwrap_or_else(|| self.default_model.clone())
    }

    pub fn set_model(&self, task_type: &str, model_id: String) {
        self.overrides.write().insert(task_type.to_string(), model_id);
    }

    pub fn get_all_models(&self) -> HashMap<String, String> {
        let mut result = self.defaults.clone();
        result.extend(self.overrides.read().iter().map(|(k, v)| (k.clone(), v.clone())));
        result
    }

    pub fn reset(&self, task_type: Option<&str>) {
        let mut overrides = self.overrides.write();
        match task_type {
            Some(t) => {
                overrides.remove(t);
            }
            None => overrides.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_default() {
        let reg = ModelRegistry::new("base-model".into());
        assert_eq!(reg.get_model("chat"), "base-model");
        reg.set_model("chat", "fancy-model".into());
        assert_eq!(reg.get_model("chat"), "fancy-model");
        reg.reset(Some("chat"));
        assert_eq!(reg.get_model("chat"), "base-model");
    }

    #[test]
    fn unknown_task_type_falls_back_to_default() {
        let reg = ModelRegistry::new("base-model".into());
        assert_eq!(reg.get_model("nonexistent"), "base-model");
    }
}
