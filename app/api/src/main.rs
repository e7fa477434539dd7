use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

use domain::requests::inputs::{AssistantInput, GateInput, SubmitRequestInput};
use domain::requests::RequestDraft;
use domain::screens::Screen;
use domain::Error;
use store::assistant::InsightsClient;
use store::config::Config;
use store::gate::{AccessGate, GateOutcome};
use store::gateway::DotationLookup;
use store::state::{AppStore, LoadPhase};

#[derive(Clone)]
struct AppState {
    store: Arc<AppStore>,
    gate: Arc<Mutex<AccessGate>>,
    assistant: Arc<InsightsClient>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = Config::from_env();
    let store = Arc::new(AppStore::new(config.build_gateway()));

    // A failed load is served as the terminal error state; a reload can
    // still recover the process without a restart.
    if let Err(err) = store.load_initial_state().await {
        tracing::error!("initial load failed, serving the error state: {}", err);
    }

    let state = AppState {
        store,
        gate: Arc::new(Mutex::new(AccessGate::new())),
        assistant: Arc::new(InsightsClient::new(config.gemini_api_key.clone())),
    };

    let app = Router::new()
        .route("/state", get(get_state))
        .route("/state/reload", post(reload_state))
        .route("/inventory", get(list_inventory))
        .route("/requests", post(submit_request).get(list_pending))
        .route("/requests/:id/approve", post(approve_request))
        .route("/access/:screen", post(gate_submit))
        .route("/access/:screen/cancel", post(gate_cancel))
        .route("/session/logout", post(logout))
        .route("/dotation/:employee_id", get(get_dotation))
        .route("/assistant", post(ask_assistant))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("EPP control API listening on port {}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}

fn reject(err: Error) -> (StatusCode, String) {
    let status = match err {
        Error::Validation { .. } | Error::Duplicate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::NoActiveApprover | Error::DeliveryInFlight { .. } => StatusCode::CONFLICT,
        Error::Remote { .. } => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}

/// Every data route serves the load phase: nothing is answered from a
/// partial snapshot.
async fn ensure_ready(store: &AppStore) -> Result<(), (StatusCode, String)> {
    match store.load_phase().await {
        LoadPhase::Ready => Ok(()),
        LoadPhase::Loading => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Sheet data is still loading".to_string(),
        )),
        LoadPhase::Failed(message) => Err((StatusCode::SERVICE_UNAVAILABLE, message)),
    }
}

async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    let (phase, error) = match state.store.load_phase().await {
        LoadPhase::Loading => ("loading", None),
        LoadPhase::Ready => ("ready", None),
        LoadPhase::Failed(message) => ("failed", Some(message)),
    };

    Json(json!({
        "phase": phase,
        "error": error,
        "pendingRequests": state.store.pending_requests().await.len(),
        "eppColumns": state.store.epp_columns().await,
        "currentApprover": state.store.current_approver().await,
    }))
}

async fn reload_state(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.store.load_initial_state().await.map_err(reject)?;
    Ok((StatusCode::OK, "Sheet snapshot reloaded"))
}

#[derive(Deserialize)]
struct InventoryQuery {
    q: Option<String>,
}

async fn list_inventory(
    Query(query): Query<InventoryQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_ready(&state.store).await?;

    let mut inventory = state.store.inventory().await;
    if let Some(needle) = query.q.as_deref() {
        let needle = needle.to_lowercase();
        inventory.retain(|item| {
            item.id.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle)
        });
    }
    Ok(Json(inventory))
}

/// Replays the UI form through the draft builder, so every structural
/// rule is enforced server-side before the request joins the pending
/// list.
async fn submit_request(
    State(state): State<AppState>,
    Json(input): Json<SubmitRequestInput>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_ready(&state.store).await?;

    let mut draft = RequestDraft::new(input.requester_name, input.requester_id, input.reason);
    for collaborator in &input.collaborators {
        draft
            .add_collaborator(&collaborator.employee_id, &collaborator.employee_name)
            .map_err(reject)?;
        for code in &collaborator.item_codes {
            let item = state.store.resolve_item(code).await.map_err(reject)?;
            draft.add_item(&collaborator.employee_id, &item).map_err(reject)?;
        }
    }

    let parts = draft.build().map_err(reject)?;
    let id = state.store.add_request(parts).await;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn list_pending(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_ready(&state.store).await?;
    Ok(Json(state.store.pending_deliveries().await))
}

async fn approve_request(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_ready(&state.store).await?;
    state.store.approve_and_process(&id).await.map_err(reject)?;
    Ok((StatusCode::OK, "Delivery processed"))
}

async fn gate_submit(
    Path(screen): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<GateInput>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_ready(&state.store).await?;
    let screen: Screen = screen.parse().map_err(reject)?;

    let mut gate = state.gate.lock().await;
    let outcome = match gate.request_access(screen) {
        GateOutcome::Pending(_) => gate.submit(&input.passcode, &state.store).await,
        granted => granted,
    };

    match outcome {
        GateOutcome::Granted(screen) => Ok(Json(json!({ "granted": true, "screen": screen }))),
        _ => Err((StatusCode::UNAUTHORIZED, "Incorrect passcode".to_string())),
    }
}

async fn gate_cancel(
    Path(screen): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let _: Screen = screen.parse().map_err(reject)?;
    state.gate.lock().await.cancel();
    Ok((StatusCode::OK, "Access attempt cancelled"))
}

/// Leaving the delivery screen always closes the approver session.
async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    state.store.logout_approver().await;
    (StatusCode::OK, "Session closed")
}

async fn get_dotation(
    Path(employee_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_ready(&state.store).await?;

    let lookup = state
        .store
        .employee_dotation(&employee_id)
        .await
        .map_err(reject)?;

    Ok(match lookup {
        DotationLookup::Found(dotation) => Json(json!({ "found": true, "data": dotation })),
        DotationLookup::Missing { message } => {
            Json(json!({ "found": false, "message": message }))
        }
    })
}

async fn ask_assistant(
    State(state): State<AppState>,
    Json(input): Json<AssistantInput>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_ready(&state.store).await?;

    let inventory = state.store.inventory().await;
    let answer = state.assistant.inventory_insights(&inventory, &input.query).await;
    Ok(Json(json!({ "answer": answer })))
}
