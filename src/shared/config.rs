//! Application configuration. Bind address, storage, completion provider credentials.

use serde::Deserialize;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_API_VERSION: &str = "v1";

/// Where sessions and message logs live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Sqlite,
    Memory,
}

/// Which completion service backs the coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Gemini,
    OpenAi,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Listen address. Read from COACH_BIND_ADDR.
    #[serde(default)]
    pub bind_addr: Option<String>,

    #[serde(default)]
    pub data_dir: Option<String>,

    /// "sqlite" (default) or "memory". Read from COACH_STORAGE.
    #[serde(default)]
    pub storage: Option<String>,

    /// "gemini" (default) or "openai". Read from COACH_AI_PROVIDER.
    #[serde(default)]
    pub ai_provider: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Gemini
    // ─────────────────────────────────────────────────────────────────────────
    /// Read from COACH_GEMINI_API_KEY or GEMINI_API_KEY.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default)]
    pub gemini_model: Option<String>,

    #[serde(default)]
    pub gemini_api_version: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // OpenAI-compatible
    // ─────────────────────────────────────────────────────────────────────────
    /// Read from COACH_AI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// Defaults to OpenAI chat completions. Read from COACH_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// Defaults to "gpt-4o-mini". Read from COACH_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("COACH"));
        if let Ok(path) = std::env::var("COACH_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // Unprefixed names so an existing Gemini .env works as is
        if cfg.gemini_api_key.is_none() {
            cfg.gemini_api_key = non_empty(std::env::var("GEMINI_API_KEY").ok());
        }
        if cfg.gemini_model.is_none() {
            cfg.gemini_model = non_empty(std::env::var("GEMINI_MODEL").ok());
        }
        if cfg.gemini_api_version.is_none() {
            cfg.gemini_api_version = non_empty(std::env::var("GEMINI_API_VERSION").ok());
        }
        Ok(cfg)
    }

    pub fn bind_addr_or_default(&self) -> String {
        non_empty(self.bind_addr.clone()).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
    }

    pub fn data_dir_or_default(&self) -> String {
        non_empty(self.data_dir.clone()).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
    }

    /// Unknown values fall back to SQLite.
    pub fn storage_kind(&self) -> StorageKind {
        match self.storage.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "memory" => StorageKind::Memory,
            _ => StorageKind::Sqlite,
        }
    }

    /// Unknown values fall back to Gemini.
    pub fn ai_provider(&self) -> AiProvider {
        match self.ai_provider.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "openai" => AiProvider::OpenAi,
            _ => AiProvider::Gemini,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Completion Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    pub fn gemini_api_key(&self) -> Option<String> {
        non_empty(self.gemini_api_key.clone())
    }

    pub fn gemini_model_or_default(&self) -> String {
        non_empty(self.gemini_model.clone()).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string())
    }

    pub fn gemini_api_version_or_default(&self) -> String {
        non_empty(self.gemini_api_version.clone())
            .unwrap_or_else(|| DEFAULT_GEMINI_API_VERSION.to_string())
    }

    pub fn ai_api_key(&self) -> Option<String> {
        non_empty(self.ai_api_key.clone())
    }

    /// Returns the AI API URL. Defaults to OpenAI chat completions endpoint.
    pub fn ai_api_url_or_default(&self) -> String {
        non_empty(self.ai_api_url.clone())
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string())
    }

    pub fn ai_model_or_default(&self) -> String {
        non_empty(self.ai_model.clone()).unwrap_or_else(|| "gpt-4o-mini".to_string())
    }

    /// True when the selected provider has an API key.
    pub fn is_ai_configured(&self) -> bool {
        match self.ai_provider() {
            AiProvider::Gemini => self.gemini_api_key().is_some(),
            AiProvider::OpenAi => self.ai_api_key().is_some(),
        }
    }
}
