use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;

use careshare_db::models::{ItemFields, OwnedWrite};
use careshare_types::api::{FormDescriptor, ItemForm, ItemResponse};
use careshare_types::models::ItemStatus;

use crate::convert;
use crate::error::ApiError;
use crate::forms;
use crate::middleware::CurrentUser;
use crate::state::{AppState, db_call};

const ITEM_FIELDS: &[&str] = &["name", "quantity", "urgent", "category_id", "status"];

/// Owned, validated copy of an `ItemForm`.
struct ParsedItem {
    name: String,
    category_id: Option<String>,
    quantity: u32,
    urgent: bool,
    status: Option<ItemStatus>,
}

impl ParsedItem {
    fn from_form(form: &ItemForm) -> Result<Self, ApiError> {
        let status = forms::optional(form.status.as_deref())
            .map(|s| {
                s.parse::<ItemStatus>()
                    .map_err(|_| ApiError::validation("status must be Active or Pledged"))
            })
            .transpose()?;

        Ok(Self {
            name: forms::required("name", &form.name)?.to_string(),
            category_id: forms::optional_uuid("category_id", form.category_id.as_deref())?
                .map(|id| id.to_string()),
            quantity: forms::positive_quantity("quantity", &form.quantity)?,
            urgent: forms::checkbox(form.urgent.as_deref()),
            status,
        })
    }

    fn fields(&self) -> ItemFields<'_> {
        ItemFields {
            name: &self.name,
            category_id: self.category_id.as_deref(),
            quantity: self.quantity,
            urgent: self.urgent,
            status: self.status,
        }
    }
}

pub(crate) async fn ensure_category(state: &AppState, category_id: Option<String>) -> Result<(), ApiError> {
    let Some(id) = category_id else {
        return Ok(());
    };
    match db_call(state, move |db| db.get_category(&id)).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::validation("category_id does not name a category")),
    }
}

fn owned_write(outcome: OwnedWrite) -> Result<(), ApiError> {
    match outcome {
        OwnedWrite::Done => Ok(()),
        OwnedWrite::NotFound => Err(ApiError::NotFound { resource: "Item" }),
        OwnedWrite::NotOwner => Err(ApiError::Unauthorized { resource: "item" }),
        OwnedWrite::MissingPledge => Err(ApiError::validation(
            "an item can only be marked Pledged through a pledge",
        )),
    }
}

pub async fn add_item_form() -> Json<FormDescriptor> {
    Json(FormDescriptor::post("/add_item", ITEM_FIELDS))
}

pub async fn add_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<ItemForm>,
) -> Result<Response, ApiError> {
    let orphanage_id = user.orphanage()?;
    let item = ParsedItem::from_form(&form)?;
    if item.status.is_some_and(|s| s != ItemStatus::Active) {
        return Err(ApiError::validation("new items start out Active"));
    }
    ensure_category(&state, item.category_id.clone()).await?;

    let orphanage = orphanage_id.to_string();
    let id = db_call(&state, move |db| db.add_item(&orphanage, &item.fields())).await?;

    info!("Orphanage {} posted item {}", orphanage_id, id);
    Ok(Redirect::to("/dashboard").into_response())
}

/// Current values of an item, for pre-filling the edit form. Owner only.
pub async fn edit_item_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let id = forms::path_id("Item", &item_id)?.to_string();
    let item = db_call(&state, move |db| db.get_item(&id))
        .await?
        .ok_or(ApiError::NotFound { resource: "Item" })?;

    if item.owner_user_id.as_deref() != Some(user.user_id.to_string().as_str()) {
        return Err(ApiError::Unauthorized { resource: "item" });
    }
    Ok(Json(convert::item(item)))
}

/// Overwrite an item's fields. Leaving `status` out keeps the current one.
pub async fn edit_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<String>,
    Form(form): Form<ItemForm>,
) -> Result<Response, ApiError> {
    let item_id = forms::path_id("Item", &item_id)?;
    let item = ParsedItem::from_form(&form)?;
    ensure_category(&state, item.category_id.clone()).await?;

    let id = item_id.to_string();
    let user_id = user.user_id.to_string();
    let outcome = db_call(&state, move |db| db.update_item(&id, &user_id, &item.fields())).await?;
    owned_write(outcome)?;

    info!("User {} edited item {}", user.user_id, item_id);
    Ok(Redirect::to("/dashboard").into_response())
}

pub async fn delete_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<String>,
) -> Result<Response, ApiError> {
    let item_id = forms::path_id("Item", &item_id)?;
    let id = item_id.to_string();
    let user_id = user.user_id.to_string();
    let outcome = db_call(&state, move |db| db.delete_item(&id, &user_id)).await?;
    owned_write(outcome)?;

    info!("User {} deleted item {}", user.user_id, item_id);
    Ok(Redirect::to("/dashboard").into_response())
}
