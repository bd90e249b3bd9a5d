//! Todo list endpoint handlers.

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use log::debug;
use serde::{Deserialize, Serialize};
use todolist_core::{TodoItem, TodoItemList};

/// Item fields accepted on create. Position is always assigned by the server.
#[derive(Debug, Deserialize)]
pub struct NewItem {
    #[serde(default, alias = "Id")]
    pub id: Option<String>,
    #[serde(alias = "item", alias = "Item")]
    pub text: String,
}

/// `POST /todolist/` body.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    #[serde(alias = "Item")]
    pub item: NewItem,
    /// Client's view of the list length. Informational only.
    #[serde(default, rename = "listSize", alias = "ListSize")]
    pub list_size: Option<i64>,
}

/// `PUT /todolist/{id}` body. Id and position in the body are ignored.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(alias = "item", alias = "Item")]
    pub text: String,
}

/// `PUT /todolist/{id}/order` body.
#[derive(Debug, Deserialize)]
pub struct MoveItemRequest {
    #[serde(default, alias = "startingPosition")]
    pub start: Option<i64>,
    #[serde(alias = "endingPosition", alias = "position")]
    pub end: i64,
}

/// `PUT /todolist/order` body.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(rename = "idOfItem", alias = "id")]
    pub id: String,
    #[serde(default, rename = "startingPosition", alias = "start")]
    pub start: Option<i64>,
    #[serde(rename = "endingPosition", alias = "end")]
    pub end: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: todolist_core::core_version(),
    })
}

/// POST /todolist/ - append a new item
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TodoItem>)> {
    let request = body(payload)?;
    debug!(
        "event=http_create module=server client_list_size={:?}",
        request.list_size
    );
    let NewItem { id, text } = request.item;
    let item = state.run(move |service| service.add_item(text, id)).await?;
    Ok((StatusCode::ACCEPTED, Json(item)))
}

/// GET /todolist/ - full list ordered by position
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<TodoItemList>> {
    let list = state.run(|service| service.list_items()).await?;
    Ok(Json(list))
}

/// GET /todolist/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TodoItem>> {
    let item = state.run(move |service| service.get_item(&id)).await?;
    Ok(Json(item))
}

/// PUT /todolist/{id} - replace item text
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TodoItem>)> {
    let UpdateItemRequest { text } = body(payload)?;
    let item = state
        .run(move |service| service.update_item(&id, text))
        .await?;
    Ok((StatusCode::ACCEPTED, Json(item)))
}

/// DELETE /todolist/{id} - remove and close the gap
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.run(move |service| service.delete_item(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /todolist/{id}/order - move one item
pub async fn move_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MoveItemRequest>, JsonRejection>,
) -> AppResult<Json<TodoItem>> {
    let MoveItemRequest { start, end } = body(payload)?;
    let item = state
        .run(move |service| service.move_item(&id, end, start))
        .await?;
    Ok(Json(item))
}

/// PUT /todolist/order - move one item named in the body
pub async fn reorder_item(
    State(state): State<AppState>,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> AppResult<Json<TodoItem>> {
    let ReorderRequest { id, start, end } = body(payload)?;
    let item = state
        .run(move |service| service.move_item(&id, end, start))
        .await?;
    Ok(Json(item))
}
