use crate::dtos::{CalendarRequest, CalendarResponse};
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::middleware::FirmContext;

pub async fn get_calendar(
    State(state): State<AppState>,
    ctx: FirmContext,
) -> Result<Json<CalendarResponse>, AppError> {
    let calendar = state.deadlines.calendar_for(&ctx.firm_id).await?;
    Ok(Json(CalendarResponse::from(calendar)))
}

pub async fn put_calendar(
    State(state): State<AppState>,
    ctx: FirmContext,
    Json(payload): Json<CalendarRequest>,
) -> Result<Json<CalendarResponse>, AppError> {
    let calendar = state
        .deadlines
        .replace_calendar(&ctx, payload.entries)
        .await?;
    Ok(Json(CalendarResponse::from(calendar)))
}
