use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DonationStatus, ItemStatus};

// -- Forms --

/// Describes the fields a POST endpoint accepts. Returned by the GET side of
/// the form routes in place of a rendered page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormDescriptor {
    pub action: String,
    pub method: String,
    pub fields: Vec<String>,
}

impl FormDescriptor {
    pub fn post(action: &str, fields: &[&str]) -> Self {
        Self {
            action: action.to_string(),
            method: "POST".to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn get(action: &str, fields: &[&str]) -> Self {
        Self {
            method: "GET".to_string(),
            ..Self::post(action, fields)
        }
    }
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// -- Home / needs --

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub service: String,
    pub orphanages: u64,
    pub active_needs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedResponse {
    pub item_id: Uuid,
    pub orphanage_id: Uuid,
    pub orphanage_name: String,
    pub item_name: String,
    pub category_name: Option<String>,
    pub quantity: u32,
    pub urgent: bool,
    pub status: ItemStatus,
    pub posted_at: DateTime<Utc>,
    pub donor_name: Option<String>,
    pub pledged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
}

// -- Items --

/// Shared by add and edit. Checkbox semantics: `urgent` is present (any
/// value other than "false"/"off") when ticked and absent otherwise.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub urgent: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse {
    pub id: Uuid,
    pub orphanage_id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub quantity: u32,
    pub urgent: bool,
    pub status: ItemStatus,
    pub posted_at: DateTime<Utc>,
    pub donor_name: Option<String>,
    pub pledged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PledgeForm {
    #[serde(default)]
    pub donor_name: String,
}

// -- Updates --

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub posted_at: DateTime<Utc>,
}

// -- Orphanage records --

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InventoryForm {
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub quantity: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChildForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StaffForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

// -- Dashboard --

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub orphanage_id: Uuid,
    pub orphanage_name: String,
    pub child_count: u64,
    pub staff_count: u64,
    pub critical_needs: Vec<CriticalNeed>,
    pub recent_donations: Vec<DonationSummary>,
    pub recent_updates: Vec<UpdateResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalNeed {
    pub category_id: Uuid,
    pub category_name: String,
    pub on_hand: u32,
    pub required: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationSummary {
    pub donation_id: Uuid,
    pub donor_name: String,
    pub donation_date: NaiveDate,
    pub amount: Decimal,
    pub status: DonationStatus,
}

// -- Donations --

#[derive(Debug, Serialize, Deserialize)]
pub struct DonateFormResponse {
    pub form: FormDescriptor,
    pub orphanage_id: Uuid,
    pub orphanage_name: String,
    pub category_id: Uuid,
    pub category_name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DonationForm {
    #[serde(default)]
    pub donor_name: String,
    #[serde(default)]
    pub orphanage_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub donation_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DonationReceipt {
    pub donation_id: Uuid,
    pub status: DonationStatus,
}

/// `donation_id` stays a string so a malformed tracking number reads as
/// not found rather than as a bad request.
#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub donation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DonationDetail {
    pub donation_id: Uuid,
    pub donor_name: String,
    pub orphanage_id: Uuid,
    pub orphanage_name: String,
    pub category_name: Option<String>,
    pub amount: Decimal,
    pub donation_date: NaiveDate,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
}
