use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use axum::{extract::State, Json};
use serde::{Serialize, Deserialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use smokefree::{Dashboard, DashboardView, Notification, ChatRoom, ChatMessage, Price};
use smokefree::backend::JsonStore;
use smokefree::record::parse_day;

use crate::error::{ServerError, ServerResult};

#[derive(Clone)]
pub(crate) struct AppState {
    pub dashboard: Arc<Mutex<Dashboard<JsonStore>>>,
    pub chat: Arc<ChatRoom<JsonStore>>
}

impl AppState {
    fn dashboard(&self) -> ServerResult<MutexGuard<'_, Dashboard<JsonStore>>> {
        self.dashboard.lock().map_err(|_| anyhow!("dashboard state poisoned").into())
    }
}

#[derive(Serialize)]
pub(crate) struct DashboardResponse {
    notification: Option<Notification>,
    view: DashboardView
}

#[derive(Deserialize)]
pub(crate) struct RecordRequest {
    /// Defaults to today
    date: Option<String>,
    smoked: bool
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuitDateRequest {
    quit_date: String
}

/// Price straight from a form field, as a number or a numeric string.
#[serde_as]
#[derive(Deserialize)]
pub(crate) struct PriceRequest {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    price: Price
}

#[derive(Deserialize)]
pub(crate) struct ChatRequest {
    text: String
}

#[derive(Serialize)]
pub(crate) struct ChatResponse {
    /// `None` when the text was blank
    message: Option<ChatMessage>
}

/// Runs store-bound work on the blocking pool; the store does plain file I/O.
async fn blocking<T, F>(work: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static
{
    return tokio::task::spawn_blocking(work).await?;
}

pub(crate) async fn get_dashboard(State(state): State<AppState>) -> ServerResult<Json<DashboardResponse>> {
    return blocking(move || {
        let mut dashboard = state.dashboard()?;
        let notification = dashboard.load();
        Ok(Json(DashboardResponse { notification, view: dashboard.view() }))
    }).await;
}

pub(crate) async fn post_record(
    State(state): State<AppState>,
    Json(request): Json<RecordRequest>
) -> ServerResult<Json<DashboardResponse>> {
    let date = match request.date.as_deref() {
        Some(text) => Some(parse_day(text).map_err(|err| ServerError::BadRequest(err.to_string()))?),
        None => None
    };
    return blocking(move || {
        let mut dashboard = state.dashboard()?;
        let date = date.unwrap_or_else(|| dashboard.view().today);
        let notification = dashboard.record_outcome(date, request.smoked);
        Ok(Json(DashboardResponse { notification: Some(notification), view: dashboard.view() }))
    }).await;
}

pub(crate) async fn put_quit_date(
    State(state): State<AppState>,
    Json(request): Json<QuitDateRequest>
) -> ServerResult<Json<DashboardResponse>> {
    let date = parse_day(&request.quit_date).map_err(|err| ServerError::BadRequest(err.to_string()))?;
    return blocking(move || {
        let mut dashboard = state.dashboard()?;
        let notification = dashboard.set_quit_date(date);
        Ok(Json(DashboardResponse { notification: Some(notification), view: dashboard.view() }))
    }).await;
}

pub(crate) async fn put_price(
    State(state): State<AppState>,
    Json(request): Json<PriceRequest>
) -> ServerResult<Json<DashboardResponse>> {
    return blocking(move || {
        let mut dashboard = state.dashboard()?;
        let notification = dashboard.set_price(request.price);
        Ok(Json(DashboardResponse { notification: Some(notification), view: dashboard.view() }))
    }).await;
}

pub(crate) async fn get_chat(State(state): State<AppState>) -> ServerResult<Json<Vec<ChatMessage>>> {
    return blocking(move || Ok(Json(state.chat.messages()?))).await;
}

pub(crate) async fn post_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>
) -> ServerResult<Json<ChatResponse>> {
    return blocking(move || {
        let message = state.chat.send(&request.text)?;
        Ok(Json(ChatResponse { message }))
    }).await;
}
