//! Orphanage-side bookkeeping: news updates, stock levels, children and staff.
//! Every handler here writes to the signed-in account's own orphanage.

use axum::{
    Extension, Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;

use careshare_types::api::{ChildForm, CreatedResponse, FormDescriptor, InventoryForm, StaffForm, UpdateForm};

use crate::convert;
use crate::error::ApiError;
use crate::forms;
use crate::items::ensure_category;
use crate::middleware::CurrentUser;
use crate::state::{AppState, db_call};

pub async fn add_update_form() -> Json<FormDescriptor> {
    Json(FormDescriptor::post("/add_update", &["title", "body"]))
}

pub async fn add_update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<UpdateForm>,
) -> Result<Response, ApiError> {
    let orphanage_id = user.orphanage()?;
    let title = forms::required("title", &form.title)?.to_string();
    let body = forms::required("body", &form.body)?.to_string();

    let orphanage = orphanage_id.to_string();
    let id = db_call(&state, move |db| db.add_update(&orphanage, &title, &body)).await?;

    info!("Orphanage {} posted update {}", orphanage_id, id);
    Ok(Redirect::to("/dashboard").into_response())
}

pub async fn set_inventory(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<InventoryForm>,
) -> Result<Response, ApiError> {
    let orphanage_id = user.orphanage()?;
    let category_id = forms::uuid("category_id", &form.category_id)?.to_string();
    let quantity = forms::count("quantity", &form.quantity)?;
    ensure_category(&state, Some(category_id.clone())).await?;

    let orphanage = orphanage_id.to_string();
    let category = category_id.clone();
    db_call(&state, move |db| db.set_inventory(&orphanage, &category, quantity)).await?;

    info!("Orphanage {} has {} on hand in category {}", orphanage_id, quantity, category_id);
    Ok(Redirect::to("/dashboard").into_response())
}

pub async fn add_child(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<ChildForm>,
) -> Result<Response, ApiError> {
    let orphanage_id = user.orphanage()?;
    let name = forms::required("name", &form.name)?.to_string();
    let age = forms::optional(form.age.as_deref())
        .map(|age| forms::count("age", age))
        .transpose()?;

    let orphanage = orphanage_id.to_string();
    let id = db_call(&state, move |db| db.add_child(&orphanage, &name, age)).await?;

    info!("Orphanage {} added child record {}", orphanage_id, id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: convert::id(&id) })).into_response())
}

pub async fn add_staff(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<StaffForm>,
) -> Result<Response, ApiError> {
    let orphanage_id = user.orphanage()?;
    let name = forms::required("name", &form.name)?.to_string();
    let role = forms::optional(form.role.as_deref()).map(str::to_string);

    let orphanage = orphanage_id.to_string();
    let id = db_call(&state, move |db| db.add_staff(&orphanage, &name, role.as_deref())).await?;

    info!("Orphanage {} added staff record {}", orphanage_id, id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: convert::id(&id) })).into_response())
}
