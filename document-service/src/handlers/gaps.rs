use crate::services::GapReport;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;
use service_core::middleware::{ActorRole, FirmContext};

pub async fn get_gaps(
    State(state): State<AppState>,
    ctx: FirmContext,
    Path(client_id): Path<String>,
) -> Result<Json<GapReport>, AppError> {
    if ctx.role == ActorRole::Client && ctx.user_id != client_id {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Clients can only view their own gap report"
        )));
    }
    Ok(Json(state.gaps.compute_gaps(&ctx.firm_id, &client_id).await))
}

pub async fn reconcile(
    State(state): State<AppState>,
    ctx: FirmContext,
    Path(client_id): Path<String>,
) -> Result<Json<GapReport>, AppError> {
    ctx.require_staff()?;
    let report = state.gaps.reconcile(&ctx.firm_id, &client_id).await?;
    Ok(Json(report))
}
