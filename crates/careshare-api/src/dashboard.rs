use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use careshare_types::api::DashboardResponse;

use crate::convert;
use crate::error::ApiError;
use crate::forms;
use crate::middleware::CurrentUser;
use crate::state::{AppState, db_call};

const RECENT_DONATIONS: u32 = 5;
const RECENT_UPDATES: u32 = 5;

/// Public summary of one orphanage.
pub async fn dashboard(
    State(state): State<AppState>,
    Path(orphanage_id): Path<String>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let orphanage_id = forms::path_id("Orphanage", &orphanage_id)?;
    load(&state, orphanage_id).await.map(Json)
}

/// Dashboard of the orphanage managed by the signed-in account.
pub async fn my_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<DashboardResponse>, ApiError> {
    load(&state, user.orphanage()?).await.map(Json)
}

async fn load(state: &AppState, orphanage_id: Uuid) -> Result<DashboardResponse, ApiError> {
    let id = orphanage_id.to_string();
    let snapshot = db_call(state, move |db| {
        let Some(orphanage) = db.get_orphanage(&id)? else {
            return Ok(None);
        };
        Ok(Some((
            orphanage,
            db.count_children(&id)?,
            db.count_staff(&id)?,
            db.critical_needs(&id)?,
            db.recent_donations(&id, RECENT_DONATIONS)?,
            db.recent_updates(&id, RECENT_UPDATES)?,
        )))
    })
    .await?;

    let Some((orphanage, child_count, staff_count, critical, donations, updates)) = snapshot else {
        return Err(ApiError::NotFound { resource: "Orphanage" });
    };

    Ok(DashboardResponse {
        orphanage_id,
        orphanage_name: orphanage.name,
        child_count,
        staff_count,
        critical_needs: critical.into_iter().map(convert::critical_need).collect(),
        recent_donations: donations.into_iter().map(convert::donation_summary).collect(),
        recent_updates: updates.into_iter().map(convert::update).collect(),
    })
}
