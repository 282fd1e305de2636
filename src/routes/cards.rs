use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::error::AppError;
use crate::models::{CardPatch, ListCardsQuery, NewCard};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/cards", get(list_cards).post(create_card))
        .route("/v1/cards/review", get(list_review_cards))
        .route("/v1/cards/random", get(show_random_card))
        .route(
            "/v1/cards/{id}",
            get(show_card).patch(update_card).delete(delete_card),
        )
}

/// Ids are positive integers; anything else cannot name a card.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::NotFound),
    }
}

fn read_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<ListCardsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (cards, metadata) = state.cards.list(&query).await?;
    Ok(Json(json!({ "cards": cards, "metadata": metadata })))
}

async fn create_card(
    State(state): State<AppState>,
    payload: Result<Json<NewCard>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let input = read_json(payload)?;
    let card = state.cards.create(input).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/v1/cards/{}", card.id))],
        Json(json!({ "card": card })),
    ))
}

async fn show_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let card = state.cards.get(parse_id(&id)?).await?;
    Ok(Json(json!({ "card": card })))
}

async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CardPatch>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let patch = read_json(payload)?;
    let card = state.cards.update(id, patch).await?;
    Ok(Json(json!({ "card": card })))
}

async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.cards.delete(parse_id(&id)?).await?;
    Ok(Json(json!({ "message": "card successfully deleted" })))
}

async fn list_review_cards(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cards = state.cards.due().await?;
    Ok(Json(json!({ "cards": cards })))
}

async fn show_random_card(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let card = state.cards.random().await?;
    Ok(Json(json!({ "card": card })))
}
