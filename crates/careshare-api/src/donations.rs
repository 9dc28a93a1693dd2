use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use tracing::info;

use careshare_db::models::{DonationOutcome, NewDonation, OwnedWrite};
use careshare_types::api::{DonateFormResponse, DonationForm, DonationReceipt, FormDescriptor, TrackQuery};
use careshare_types::models::DonationStatus;
use careshare_types::money::{parse_amount, to_cents};

use crate::convert;
use crate::error::ApiError;
use crate::forms;
use crate::middleware::CurrentUser;
use crate::state::{AppState, db_call};

/// Donation form prefilled with its target orphanage and category.
pub async fn donate_form(
    State(state): State<AppState>,
    Path((orphanage_id, category_id)): Path<(String, String)>,
) -> Result<Json<DonateFormResponse>, ApiError> {
    let orphanage_id = forms::path_id("Orphanage", &orphanage_id)?;
    let category_id = forms::path_id("Category", &category_id)?;
    let orphanage = orphanage_id.to_string();
    let category = category_id.to_string();
    let (orphanage, category) = db_call(&state, move |db| {
        Ok((db.get_orphanage(&orphanage)?, db.get_category(&category)?))
    })
    .await?;

    let orphanage = orphanage.ok_or(ApiError::NotFound { resource: "Orphanage" })?;
    let category = category.ok_or(ApiError::NotFound { resource: "Category" })?;

    Ok(Json(DonateFormResponse {
        form: FormDescriptor::post(
            "/submit_donation",
            &["donor_name", "orphanage_id", "category_id", "amount", "donation_date"],
        ),
        orphanage_id,
        orphanage_name: orphanage.name,
        category_id,
        category_name: category.name,
    }))
}

pub async fn submit_donation(
    State(state): State<AppState>,
    Form(form): Form<DonationForm>,
) -> Result<Response, ApiError> {
    let donor_name = forms::required("donor_name", &form.donor_name)?.to_string();
    let orphanage_id = forms::uuid("orphanage_id", &form.orphanage_id)?.to_string();
    let category_id = forms::optional_uuid("category_id", form.category_id.as_deref())?
        .map(|id| id.to_string());
    let amount_cents = parse_amount(forms::required("amount", &form.amount)?)
        .and_then(to_cents)
        .ok_or_else(|| {
            ApiError::validation("amount must be a non-negative number with at most two decimals")
        })?;
    let donation_date = match forms::optional(form.donation_date.as_deref()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::validation("donation_date must be YYYY-MM-DD"))?,
        None => Utc::now().date_naive(),
    }
    .format("%Y-%m-%d")
    .to_string();

    let outcome = db_call(&state, move |db| {
        db.record_donation(&NewDonation {
            donor_name: &donor_name,
            orphanage_id: &orphanage_id,
            category_id: category_id.as_deref(),
            amount_cents,
            donation_date: &donation_date,
        })
    })
    .await?;

    match outcome {
        DonationOutcome::Recorded { donation_id } => {
            info!("Recorded donation {}", donation_id);
            let receipt = DonationReceipt {
                donation_id: convert::id(&donation_id),
                status: DonationStatus::Submitted,
            };
            Ok((StatusCode::CREATED, Json(receipt)).into_response())
        }
        DonationOutcome::UnknownOrphanage => Err(ApiError::NotFound { resource: "Orphanage" }),
        DonationOutcome::UnknownCategory => Err(ApiError::NotFound { resource: "Category" }),
    }
}

/// Without a `donation_id` this describes the lookup form; with one it
/// returns the donation's current state.
pub async fn track(
    State(state): State<AppState>,
    Query(query): Query<TrackQuery>,
) -> Result<Response, ApiError> {
    let Some(donation_id) = forms::optional(query.donation_id.as_deref()) else {
        return Ok(Json(FormDescriptor::get("/track", &["donation_id"])).into_response());
    };

    let id = forms::path_id("Donation", donation_id)?.to_string();
    let donation = db_call(&state, move |db| db.get_donation(&id))
        .await?
        .ok_or(ApiError::NotFound { resource: "Donation" })?;

    Ok(Json(convert::donation_detail(donation)).into_response())
}

pub async fn mark_received(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(donation_id): Path<String>,
) -> Result<Response, ApiError> {
    let donation_id = forms::path_id("Donation", &donation_id)?;
    let id = donation_id.to_string();
    let user_id = user.user_id.to_string();
    let outcome = db_call(&state, move |db| db.mark_donation_received(&id, &user_id)).await?;

    match outcome {
        OwnedWrite::Done => {
            info!("Donation {} marked received", donation_id);
            Ok(Redirect::to("/dashboard").into_response())
        }
        OwnedWrite::NotOwner => Err(ApiError::Unauthorized { resource: "donation" }),
        OwnedWrite::NotFound | OwnedWrite::MissingPledge => {
            Err(ApiError::NotFound { resource: "Donation" })
        }
    }
}
