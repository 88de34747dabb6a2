//! HTTP + WebSocket API for CalmPath
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/{id} - Full session snapshot
//! - POST /session/{id}/message - Send a user message
//! - POST /session/{id}/tutorial/start|advance|finish|escalate - Guided walk
//! - POST /session/{id}/breathing/start|pause|resume - Breathing exercise
//! - POST /session/{id}/offline/category|answer|next|back - Offline walk
//! - POST /session/{id}/connectivity - Push a connectivity report
//! - GET /checklist, POST /checklist/toggle - Preparedness checklist
//! - WS /ws/{id} - Live updates
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::warn;

use crate::core::breathing::CycleSnapshot;
use crate::core::checklist::SafetyChecklist;
use crate::core::clock::Ticker;
use crate::core::provider::{AssessmentProvider, TriageProvider};
use crate::core::session::{CrisisSession, SessionError, SessionSnapshot, TimerOwner};
use crate::core::store::OfflineStore;
use crate::core::tutorial::TutorialSnapshot;
use crate::types::{FlowEvent, LinkState, PanicLevel};

/// One live session plus its transport-side machinery
pub struct Session {
    pub session: CrisisSession,
    pub ticker: Ticker,
    pub update_tx: broadcast::Sender<SessionUpdate>,
}

/// Live update message pushed over the WebSocket
#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdate {
    pub session_id: String,
    pub panic_level: PanicLevel,
    pub timer_owner: TimerOwner,
    pub events: Vec<FlowEvent>,
    pub tutorial: Option<TutorialSnapshot>,
    pub breathing: Option<CycleSnapshot>,
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
    pub checklist: RwLock<SafetyChecklist>,
    pub store: OfflineStore,
    pub provider: Arc<dyn AssessmentProvider>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Uniform response for every state-changing session call
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub events: Vec<FlowEvent>,
    pub session: SessionSnapshot,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PatternRequest {
    pub pattern: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub option: String,
}

#[derive(Debug, Deserialize)]
pub struct ConnectivityRequest {
    pub state: LinkState,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub item: String,
}

/// Checklist item with its tick
#[derive(Debug, Serialize)]
pub struct ChecklistItemView {
    pub text: String,
    pub checked: bool,
}

/// Checklist section for the wire
#[derive(Debug, Serialize)]
pub struct ChecklistSectionView {
    pub emoji: String,
    pub label: String,
    pub items: Vec<ChecklistItemView>,
}

/// Checklist response
#[derive(Debug, Serialize)]
pub struct ChecklistResponse {
    pub sections: Vec<ChecklistSectionView>,
    pub done: usize,
    pub total: usize,
}

/// Create the API router with the bundled local provider
pub fn create_router(store_dir: String) -> Router {
    create_router_with(OfflineStore::new(store_dir), Arc::new(TriageProvider::new()))
}

/// Create the API router over explicit store and provider
pub fn create_router_with(store: OfflineStore, provider: Arc<dyn AssessmentProvider>) -> Router {
    let checklist = match store.load_checklist() {
        Ok(map) => SafetyChecklist::with_checked(map),
        Err(err) => {
            warn!(error = %err, "checklist record unreadable, starting fresh");
            SafetyChecklist::new()
        }
    };

    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        checklist: RwLock::new(checklist),
        store,
        provider,
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/message", post(send_message))
        .route("/session/:id/tutorial/start", post(tutorial_start))
        .route("/session/:id/tutorial/advance", post(tutorial_advance))
        .route("/session/:id/tutorial/finish", post(tutorial_finish))
        .route("/session/:id/tutorial/escalate", post(tutorial_escalate))
        .route("/session/:id/breathing/start", post(breathing_start))
        .route("/session/:id/breathing/pause", post(breathing_pause))
        .route("/session/:id/breathing/resume", post(breathing_resume))
        .route("/session/:id/offline/category", post(offline_category))
        .route("/session/:id/offline/answer", post(offline_answer))
        .route("/session/:id/offline/next", post(offline_next))
        .route("/session/:id/offline/back", post(offline_back))
        .route("/session/:id/connectivity", post(connectivity))
        .route("/checklist", get(get_checklist))
        .route("/checklist/toggle", post(toggle_checklist))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session, restoring any persisted offline answers
async fn create_session(State(state): State<Arc<AppState>>) -> Json<NewSessionResponse> {
    let session_id = generate_session_id();
    let answers = state.store.load_answers().unwrap_or_default();
    let (tx, _) = broadcast::channel(100);

    let session = Session {
        session: CrisisSession::with_offline_answers(session_id.clone(), answers),
        ticker: Ticker::new(),
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);

    Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    })
}

/// Get the full session snapshot
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let sessions = state.sessions.read().await;
    let slot = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(slot.session.snapshot()))
}

/// Send one user message through the provider
///
/// The sessions lock is held to claim the in-flight slot and again to absorb
/// the outcome, never across the provider await; other sessions stay live and
/// a concurrent second send is rejected with 409 instead of queueing on the
/// lock. The exchange itself runs detached so a client that disconnects
/// mid-request cannot strand the claimed slot.
async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ActionResponse>, StatusCode> {
    {
        let mut sessions = state.sessions.write().await;
        let slot = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
        slot.session.begin_message(&req.text).map_err(status_for)?;
    }

    let exchange = tokio::spawn(complete_send(state, id, req.text));
    exchange.await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
}

/// Run the provider exchange for a claimed send and absorb its outcome
async fn complete_send(
    state: Arc<AppState>,
    id: String,
    text: String,
) -> Result<Json<ActionResponse>, StatusCode> {
    let result = state.provider.get_assessment(&text, &id).await;

    let mut sessions = state.sessions.write().await;
    let slot = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let events = slot.session.complete_message(result);
    finish_action(&state, slot, events)
}

async fn tutorial_start(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| s.start_tutorial()).await
}

async fn tutorial_advance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| s.advance_step()).await
}

async fn tutorial_finish(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| s.finish_tutorial()).await
}

async fn tutorial_escalate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| s.escalate()).await
}

async fn breathing_start(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PatternRequest>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| s.start_breathing(&req.pattern)).await
}

async fn breathing_pause(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| s.pause_breathing().map(|_| Vec::new())).await
}

async fn breathing_resume(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| s.resume_breathing().map(|_| Vec::new())).await
}

async fn offline_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| {
        s.select_offline_category(&req.category);
        Ok(Vec::new())
    })
    .await
}

/// Record an answer and persist the whole answer map
async fn offline_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let slot = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    let events = slot.session.answer_offline(&req.option);
    // Persistence is best-effort; losing the disk must not lose the user
    if let Err(err) = state.store.save_answers(slot.session.offline().answers()) {
        warn!(error = %err, "offline answers not persisted");
    }

    finish_action(&state, slot, events)
}

async fn offline_next(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| {
        s.offline_next();
        Ok(Vec::new())
    })
    .await
}

async fn offline_back(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| {
        s.offline_back();
        Ok(Vec::new())
    })
    .await
}

/// Push a connectivity report into the session
async fn connectivity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ConnectivityRequest>,
) -> Result<Json<ActionResponse>, StatusCode> {
    run_session_op(&state, &id, |s| Ok(s.on_connectivity(req.state))).await
}

/// Get the checklist with ticks and progress
async fn get_checklist(State(state): State<Arc<AppState>>) -> Json<ChecklistResponse> {
    let checklist = state.checklist.read().await;
    Json(checklist_view(&checklist))
}

/// Toggle one checklist item and persist the tick map
async fn toggle_checklist(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ToggleRequest>,
) -> Json<ChecklistResponse> {
    let mut checklist = state.checklist.write().await;
    checklist.toggle(&req.item);
    if let Err(err) = state.store.save_checklist(checklist.checked_map()) {
        warn!(error = %err, "checklist not persisted");
    }
    Json(checklist_view(&checklist))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let slot = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = slot.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Handle WebSocket connection
async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<SessionUpdate>) {
    while let Ok(update) = rx.recv().await {
        let json = serde_json::to_string(&update).unwrap_or_default();
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
}

/// Lock, run one session operation, broadcast, respond
async fn run_session_op<F>(
    state: &Arc<AppState>,
    id: &str,
    op: F,
) -> Result<Json<ActionResponse>, StatusCode>
where
    F: FnOnce(&mut CrisisSession) -> Result<Vec<FlowEvent>, SessionError>,
{
    let mut sessions = state.sessions.write().await;
    let slot = sessions.get_mut(id).ok_or(StatusCode::NOT_FOUND)?;
    let events = op(&mut slot.session).map_err(status_for)?;
    finish_action(state, slot, events)
}

/// Broadcast the update, keep the ticker aligned, build the response
fn finish_action(
    state: &Arc<AppState>,
    slot: &mut Session,
    events: Vec<FlowEvent>,
) -> Result<Json<ActionResponse>, StatusCode> {
    broadcast_update(slot, events.clone());
    sync_ticker(state, slot);
    Ok(Json(ActionResponse {
        events,
        session: slot.session.snapshot(),
    }))
}

fn broadcast_update(slot: &Session, events: Vec<FlowEvent>) {
    let update = SessionUpdate {
        session_id: slot.session.id().to_string(),
        panic_level: slot.session.panic_level(),
        timer_owner: slot.session.timer_owner(),
        events,
        tutorial: slot.session.tutorial().map(|t| t.snapshot()),
        breathing: slot.session.breathing().map(|c| c.snapshot()),
    };
    let _ = slot.update_tx.send(update);
}

/// Start or stop the wall-clock driver to match what the session needs
fn sync_ticker(state: &Arc<AppState>, slot: &mut Session) {
    if slot.session.timer_active() {
        if !slot.ticker.is_running() {
            let task = tick_loop(state.clone(), slot.session.id().to_string());
            slot.ticker.start(task);
        }
    } else {
        slot.ticker.stop();
    }
}

/// Periodic task feeding ticks into one session until it goes idle
fn tick_loop(state: Arc<AppState>, id: String) -> impl std::future::Future<Output = ()> + Send {
    async move {
        let mut interval = tokio::time::interval(Ticker::period());
        // The first interval tick fires immediately; swallow it
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut sessions = state.sessions.write().await;
            let Some(slot) = sessions.get_mut(&id) else {
                break;
            };
            let events = slot.session.tick();
            if !events.is_empty() {
                broadcast_update(slot, events);
            }
            if !slot.session.timer_active() {
                break;
            }
        }
    }
}

fn status_for(err: SessionError) -> StatusCode {
    match err {
        SessionError::RequestOutstanding => StatusCode::CONFLICT,
        SessionError::UnknownPattern(_) => StatusCode::BAD_REQUEST,
        SessionError::NoAssessment | SessionError::NoTutorial | SessionError::NoBreathing => {
            StatusCode::CONFLICT
        }
    }
}

fn checklist_view(checklist: &SafetyChecklist) -> ChecklistResponse {
    let sections = checklist
        .sections()
        .iter()
        .map(|section| ChecklistSectionView {
            emoji: section.emoji.to_string(),
            label: section.label.to_string(),
            items: section
                .items
                .iter()
                .map(|item| ChecklistItemView {
                    text: item.to_string(),
                    checked: checklist.is_checked(item),
                })
                .collect(),
        })
        .collect();
    let (done, total) = checklist.progress();
    ChecklistResponse {
        sections,
        done,
        total,
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("session_{:x}", nanos as u64)
}

/// Run the API server
pub async fn run_server(addr: &str, store_dir: String) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(store_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("🧭 CalmPath API running on {}", addr);
    println!("  POST /session/new                 - Create session");
    println!("  GET  /session/:id                 - Full snapshot");
    println!("  POST /session/:id/message         - Send a message");
    println!("  POST /session/:id/tutorial/...    - start|advance|finish|escalate");
    println!("  POST /session/:id/breathing/...   - start|pause|resume");
    println!("  POST /session/:id/offline/...     - category|answer|next|back");
    println!("  POST /session/:id/connectivity    - Push online/offline");
    println!("  GET  /checklist                   - Preparedness checklist");
    println!("  WS   /ws/:id                      - Live updates");
    println!("  GET  /health                      - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
