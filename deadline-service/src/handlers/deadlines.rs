use crate::dtos::{
    DeadlineResponse, ListDeadlinesParams, SeedDeadlinesRequest, SeedDeadlinesResponse,
};
use crate::models::{ClientRecord, FinancialYear};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use service_core::middleware::{ActorRole, FirmContext};
use validator::Validate;

pub async fn seed_deadlines(
    State(state): State<AppState>,
    ctx: FirmContext,
    Path(client_id): Path<String>,
    Json(payload): Json<SeedDeadlinesRequest>,
) -> Result<(StatusCode, Json<SeedDeadlinesResponse>), AppError> {
    ctx.require_staff()?;
    payload.validate()?;

    let client = ClientRecord {
        client_id,
        firm_id: ctx.firm_id.clone(),
        assigned_ca_id: payload.assigned_ca_id,
        onboarded_on: payload.onboarded_on,
    };
    let outcome = state
        .deadlines
        .seed_client(&client, payload.financial_year.map(FinancialYear::new))
        .await?;

    let status = if outcome.summary.inserted > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(SeedDeadlinesResponse {
            financial_year: outcome.financial_year.to_string(),
            generated: outcome.generated,
            inserted: outcome.summary.inserted,
            existing: outcome.summary.existing,
        }),
    ))
}

pub async fn list_deadlines(
    State(state): State<AppState>,
    ctx: FirmContext,
    Path(client_id): Path<String>,
    Query(params): Query<ListDeadlinesParams>,
) -> Result<Json<Vec<DeadlineResponse>>, AppError> {
    if ctx.role == ActorRole::Client && ctx.user_id != client_id {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Clients can only view their own deadlines"
        )));
    }

    let today = params.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let deadlines = state
        .deadlines
        .list(&ctx.firm_id, &client_id, today)
        .await?;
    Ok(Json(deadlines.into_iter().map(DeadlineResponse::from).collect()))
}

pub async fn mark_filed(
    State(state): State<AppState>,
    ctx: FirmContext,
    Path(deadline_id): Path<String>,
) -> Result<Json<DeadlineResponse>, AppError> {
    let deadline = state.deadlines.mark_filed(&ctx, &deadline_id).await?;
    Ok(Json(DeadlineResponse::from(deadline)))
}
