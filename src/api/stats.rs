//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::Stats};

use super::AuthenticatedUser;

/// Get dashboard statistics: totals and the most-borrowed books
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = Stats)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Stats>> {
    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
