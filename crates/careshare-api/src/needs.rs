use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;

use careshare_db::models::PledgeOutcome;
use careshare_types::api::{CategoryResponse, HomeResponse, NeedResponse, PledgeForm};

use crate::convert;
use crate::error::ApiError;
use crate::forms;
use crate::state::{AppState, db_call};

pub async fn home(State(state): State<AppState>) -> Result<Json<HomeResponse>, ApiError> {
    let (orphanages, active_needs) = db_call(&state, |db| {
        Ok((db.count_orphanages()?, db.count_active_items()?))
    })
    .await?;

    Ok(Json(HomeResponse {
        service: "careshare".to_string(),
        orphanages,
        active_needs,
    }))
}

/// Every item of every orphanage, active and pledged, grouped by orphanage.
pub async fn list_needs(State(state): State<AppState>) -> Result<Json<Vec<NeedResponse>>, ApiError> {
    let rows = db_call(&state, |db| db.list_needs()).await?;
    Ok(Json(rows.into_iter().map(convert::need).collect()))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let rows = db_call(&state, |db| db.list_categories()).await?;
    Ok(Json(rows.into_iter().map(convert::category).collect()))
}

/// Anonymous pledge. A pledge on an item that is already pledged is not an
/// error; the donor lands back on the listing and sees who got there first.
pub async fn pledge(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Form(form): Form<PledgeForm>,
) -> Result<Response, ApiError> {
    let item_id = forms::path_id("Item", &item_id)?;
    let donor = forms::required("donor_name", &form.donor_name)?.to_string();

    let id = item_id.to_string();
    let outcome = db_call(&state, move |db| db.pledge_item(&id, &donor)).await?;

    match outcome {
        PledgeOutcome::Pledged => {
            info!("Item {} pledged", item_id);
            Ok(Redirect::to("/needs").into_response())
        }
        PledgeOutcome::AlreadyPledged => {
            info!("Item {} was already pledged", item_id);
            Ok(Redirect::to("/needs").into_response())
        }
        PledgeOutcome::NotFound => Err(ApiError::NotFound { resource: "Item" }),
    }
}
