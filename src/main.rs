//! Wiring & DI. Entry point: bootstrap adapters, inject into services, serve HTTP.
//! No business logic here.

use career_coach::adapters::ai::{GeminiAdapter, MockCompletionAdapter, OpenAiAdapter};
use career_coach::adapters::http::{AppState, build_router};
use career_coach::adapters::persistence::{MemoryRepo, SqliteRepo};
use career_coach::domain::{GoalEvaluator, KeywordGoalEvaluator};
use career_coach::ports::{CompletionPort, MessageLogPort, SessionPort, TurnHandlerPort};
use career_coach::shared::config::{AiProvider, AppConfig, StorageKind};
use career_coach::usecases::{CoachingService, SessionService};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config load failed, using defaults");
        AppConfig::default()
    });

    // --- Storage ---
    let storage = cfg.storage_kind();
    let (log, sessions): (Arc<dyn MessageLogPort>, Arc<dyn SessionPort>) = match storage {
        StorageKind::Sqlite => {
            let data_path = PathBuf::from(cfg.data_dir_or_default());
            let repo = Arc::new(
                SqliteRepo::connect(&data_path)
                    .await
                    .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
            );
            (
                Arc::clone(&repo) as Arc<dyn MessageLogPort>,
                repo as Arc<dyn SessionPort>,
            )
        }
        StorageKind::Memory => {
            warn!("in-memory storage selected, sessions are lost on restart");
            let repo = Arc::new(MemoryRepo::new());
            (
                Arc::clone(&repo) as Arc<dyn MessageLogPort>,
                repo as Arc<dyn SessionPort>,
            )
        }
    };

    // --- Completion service ---
    let completion: Arc<dyn CompletionPort> = match (cfg.ai_provider(), cfg.is_ai_configured()) {
        (AiProvider::Gemini, true) => {
            let model = cfg.gemini_model_or_default();
            let version = cfg.gemini_api_version_or_default();
            info!(model = %model, api_version = %version, "Gemini completion adapter enabled");
            Arc::new(GeminiAdapter::new(
                cfg.gemini_api_key().unwrap_or_default(),
                &model,
                &version,
            ))
        }
        (AiProvider::OpenAi, true) => {
            info!(
                model = %cfg.ai_model_or_default(),
                url = %cfg.ai_api_url_or_default(),
                "OpenAI-compatible completion adapter enabled"
            );
            Arc::new(OpenAiAdapter::new(
                cfg.ai_api_url_or_default(),
                cfg.ai_api_key().unwrap_or_default(),
                cfg.ai_model_or_default(),
            ))
        }
        (provider, false) => {
            warn!(?provider, "no API key for the selected provider, using mock completion adapter");
            Arc::new(MockCompletionAdapter::new())
        }
    };

    // --- Services ---
    let evaluator: Arc<dyn GoalEvaluator> = Arc::new(KeywordGoalEvaluator::new());
    let turns: Arc<dyn TurnHandlerPort> =
        Arc::new(CoachingService::new(evaluator, Arc::clone(&completion)));
    let session_service = Arc::new(SessionService::new(
        Arc::clone(&turns),
        completion,
        log,
        sessions,
    ));

    let router = build_router(Arc::new(AppState {
        turns,
        sessions: session_service,
    }));

    // --- Serve ---
    let bind_addr = cfg.bind_addr_or_default();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("bind {} failed: {}", bind_addr, e))?;
    info!(addr = %bind_addr, "career coach listening");
    axum::serve(listener, router).await?;

    Ok(())
}
