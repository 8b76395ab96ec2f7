//! HTTP inbound adapter (axum).
//!
//! Endpoints:
//!
//! - `POST /api/chat`: One turn with a client-held transcript
//! - `POST /api/sessions/{id}/chat`: One turn with the transcript rebuilt from storage
//! - `GET  /api/sessions/{id}/messages`: Ordered log; greets a fresh session first
//! - `PUT  /api/sessions/{id}/summary`: Upsert the session's survey summary
//! - `GET  /api/domains`: Domain table for the selector and mission card
//! - `GET  /health`

pub mod dto;

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{DomainError, StoredMessage, TurnInput, TurnOutcome, registry};
use crate::ports::TurnHandlerPort;
use crate::usecases::{SessionService, SessionTurn};
use dto::{
    ChatRequest, DomainDto, ErrorResponse, HealthResponse, SessionChatRequest, SummaryRequest,
    parse_domain,
};

/// Shared handler state.
pub struct AppState {
    pub turns: Arc<dyn TurnHandlerPort>,
    pub sessions: Arc<SessionService>,
}

pub type SharedState = Arc<AppState>;

/// Build the router with all routes and request tracing.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/domains", get(domains_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/sessions/{id}/chat", post(session_chat_handler))
        .route("/api/sessions/{id}/messages", get(session_messages_handler))
        .route("/api/sessions/{id}/summary", put(session_summary_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Maps domain errors onto status codes with a user-safe message.
pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self(DomainError::Validation(format!(
            "リクエストの形式が正しくありません: {}",
            e.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Upstream(_)
            | DomainError::Persistence(_)
            | DomainError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.user_message(),
            }),
        )
            .into_response()
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn domains_handler() -> Json<Vec<DomainDto>> {
    Json(registry::all().iter().map(DomainDto::from).collect())
}

/// `POST /api/chat`
async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let Json(req) = payload?;
    let domain = parse_domain(req.domain.as_deref())?;
    let message = req.message.unwrap_or_default();
    info!(domain = %domain, history = req.messages.len(), "chat request");

    let outcome = state
        .turns
        .handle_turn(TurnInput {
            message: message.clone(),
            domain,
            prior_transcript: req.messages,
            turn_count: req.turn_count.unwrap_or(0),
            user_name: req.user_name,
            domain_user_turns: None,
        })
        .await?;

    if let Some(session_id) = req.session_id.as_deref().filter(|s| !s.trim().is_empty()) {
        state
            .sessions
            .record_exchange(session_id, domain, &message, &outcome.reply)
            .await;
    }

    Ok(Json(outcome))
}

/// `POST /api/sessions/{id}/chat`
async fn session_chat_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
    payload: Result<Json<SessionChatRequest>, JsonRejection>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let Json(req) = payload?;
    let domain = parse_domain(req.domain.as_deref())?;
    info!(session_id = %session_id, domain = %domain, "session chat request");

    let outcome = state
        .sessions
        .chat(
            &session_id,
            SessionTurn {
                message: req.message.unwrap_or_default(),
                domain,
                turn_count: req.turn_count,
                user_name: req.user_name,
            },
        )
        .await?;
    Ok(Json(outcome))
}

/// `GET /api/sessions/{id}/messages`
async fn session_messages_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<StoredMessage>>, ApiError> {
    Ok(Json(state.sessions.messages_or_greeting(&session_id).await?))
}

/// `PUT /api/sessions/{id}/summary`
async fn session_summary_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    state
        .sessions
        .update_summary(&session_id, &req.summary)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryRepo;
    use crate::domain::{Domain, KeywordGoalEvaluator};
    use crate::ports::{CompletionPort, MessageLogPort};
    use crate::usecases::CoachingService;
    use crate::usecases::test_helpers::{FailingCompletion, RecordingCompletion};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        completion: Arc<RecordingCompletion>,
        repo: Arc<MemoryRepo>,
    }

    fn app_with(completion: Arc<dyn CompletionPort>) -> (Router, Arc<MemoryRepo>) {
        let repo = Arc::new(MemoryRepo::new());
        let turns: Arc<dyn TurnHandlerPort> = Arc::new(CoachingService::new(
            Arc::new(KeywordGoalEvaluator::new()),
            completion.clone(),
        ));
        let sessions = Arc::new(SessionService::new(
            turns.clone(),
            completion,
            repo.clone(),
            repo.clone(),
        ));
        (build_router(Arc::new(AppState { turns, sessions })), repo)
    }

    fn test_app(reply: &str) -> TestApp {
        let completion = Arc::new(RecordingCompletion::new(reply));
        let (router, repo) = app_with(completion.clone());
        TestApp {
            router,
            completion,
            repo,
        }
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn chat_returns_reply_and_evaluation() {
        let app = test_app("素敵ですね");
        let req = post_json(
            "/api/chat",
            serde_json::json!({
                "message": "協調性があると思う",
                "domain": "self-awareness",
                "messages": [
                    {"role": "assistant", "content": "最近頑張ったことは？"},
                    {"role": "user", "content": "体育祭で係をした"}
                ],
                "turnCount": 2
            }),
        );

        let response = app.router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["reply"], "素敵ですね");
        assert_eq!(json["evaluation"]["isGoalMet"], true);
        assert_eq!(json["evaluation"]["missingElements"], serde_json::json!([]));
        assert_eq!(app.completion.prompts().len(), 1);
    }

    #[tokio::test]
    async fn chat_accepts_legacy_mode_field() {
        let app = test_app("ok");
        let req = post_json(
            "/api/chat",
            serde_json::json!({"message": "学費が知りたい", "mode": "info"}),
        );
        let json = body_json(app.router.oneshot(req).await.unwrap()).await;
        assert_eq!(json["evaluation"]["missingElements"], serde_json::json!(["調べ方"]));
    }

    #[tokio::test]
    async fn blank_or_missing_message_is_400() {
        for body in [
            serde_json::json!({"message": "   "}),
            serde_json::json!({"domain": "goal"}),
        ] {
            let app = test_app("unused");
            let response = app
                .router
                .oneshot(post_json("/api/chat", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = body_json(response).await;
            assert_eq!(json["error"], "メッセージが空です。");
            assert!(app.completion.prompts().is_empty());
        }
    }

    #[tokio::test]
    async fn unknown_domain_and_malformed_json_are_400() {
        let app = test_app("unused");
        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/api/chat",
                serde_json::json!({"message": "hi", "domain": "career"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upstream_failure_is_generic_500() {
        let (router, _repo) = app_with(Arc::new(FailingCompletion));
        let response = router
            .oneshot(post_json("/api/chat", serde_json::json!({"message": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "AI応答の生成に失敗しました。");
    }

    #[tokio::test]
    async fn chat_with_session_id_logs_exchange() {
        let app = test_app("返答です");
        let req = post_json(
            "/api/chat",
            serde_json::json!({"message": "こんにちは", "sessionId": "abc"}),
        );
        let response = app.router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let rows = app.repo.list_messages("abc").await.unwrap();
        let contents: Vec<&str> = rows.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["こんにちは", "返答です"]);
        assert!(rows.iter().all(|r| r.domain == Some(Domain::SelfAwareness)));
    }

    #[tokio::test]
    async fn foreign_transcript_roles_are_treated_as_assistant() {
        let app = test_app("ok");
        let req = post_json(
            "/api/chat",
            serde_json::json!({
                "message": "協調性です",
                "messages": [
                    {"role": "model", "content": "リーダーの経験は？"},
                    {"role": "user", "content": "係をしました"}
                ]
            }),
        );
        let response = app.router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["evaluation"]["isGoalMet"], true);
        assert!(app.completion.prompts()[0].contains("AI: リーダーの経験は？"));
    }

    #[tokio::test]
    async fn session_flow_greets_then_chats() {
        let app = test_app("やあ");

        let req = Request::builder()
            .method("PUT")
            .uri("/api/sessions/s1/summary")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"summary":"学年: 3年"}"#))
            .unwrap();
        let response = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let req = Request::builder()
            .uri("/api/sessions/s1/messages")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.router.clone().oneshot(req).await.unwrap()).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["role"], "assistant");
        assert_eq!(json[0]["sessionId"], "s1");

        let response = app
            .router
            .oneshot(post_json(
                "/api/sessions/s1/chat",
                serde_json::json!({"message": "今月中に志望校を決める", "domain": "goal"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["evaluation"]["isGoalMet"], true);

        let prompts = app.completion.prompts();
        assert!(prompts[0].contains("学年: 3年"));
        assert!(prompts[1].contains("AI: やあ"));
        assert_eq!(app.repo.list_messages("s1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn domains_listing() {
        let app = test_app("unused");
        let req = Request::builder()
            .uri("/api/domains")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.router.oneshot(req).await.unwrap()).await;
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 6);
        assert_eq!(list[0]["id"], "self-awareness");
        assert_eq!(list[0]["next"], "info");
        assert_eq!(list[5]["next"], serde_json::Value::Null);
        assert_eq!(list[4]["requiredElements"][1], "対策(2つ以上)");
    }
}
