//! Database row types and write outcomes. Rows map directly to SQLite
//! columns; conversion into wire types happens in careshare-api.

use careshare_types::models::ItemStatus;

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

/// The identity attached to a live session.
pub struct SessionUserRow {
    pub user_id: String,
    pub email: String,
    pub orphanage_id: Option<String>,
}

pub struct OrphanageRow {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub city: String,
    pub address: String,
    pub contact_email: String,
    pub description: String,
    pub created_at: String,
}

pub struct CategoryRow {
    pub id: String,
    pub name: String,
}

pub struct ItemRow {
    pub id: String,
    pub orphanage_id: String,
    /// User owning the item's orphanage, if the orphanage has an account.
    pub owner_user_id: Option<String>,
    pub name: String,
    pub category_id: Option<String>,
    pub quantity: i64,
    pub urgent: bool,
    pub status: String,
    pub posted_at: String,
    pub donor_name: Option<String>,
    pub pledged_at: Option<String>,
}

/// One line of the public needs listing.
pub struct NeedRow {
    pub item_id: String,
    pub orphanage_id: String,
    pub orphanage_name: String,
    pub item_name: String,
    pub category_name: Option<String>,
    pub quantity: i64,
    pub urgent: bool,
    pub status: String,
    pub posted_at: String,
    pub donor_name: Option<String>,
    pub pledged_at: Option<String>,
}

pub struct UpdateRow {
    pub id: String,
    pub orphanage_id: String,
    pub title: String,
    pub body: String,
    pub posted_at: String,
}

pub struct CriticalNeedRow {
    pub category_id: String,
    pub category_name: String,
    pub on_hand: i64,
    pub required: i64,
}

pub struct DonationSummaryRow {
    pub id: String,
    pub donor_name: String,
    pub donation_date: String,
    pub amount_cents: i64,
    pub status: String,
}

pub struct DonationRow {
    pub id: String,
    pub donor_name: String,
    pub orphanage_id: String,
    pub orphanage_name: String,
    pub owner_user_id: Option<String>,
    pub category_name: Option<String>,
    pub amount_cents: i64,
    pub donation_date: String,
    pub status: String,
    pub created_at: String,
}

// -- Inputs --

pub struct NewOrphanage<'a> {
    pub name: &'a str,
    pub city: &'a str,
    pub address: &'a str,
    pub contact_email: &'a str,
    pub description: &'a str,
}

/// Full set of owner-editable item fields. Edits overwrite all of them
/// except `status`, where `None` keeps the stored value.
pub struct ItemFields<'a> {
    pub name: &'a str,
    pub category_id: Option<&'a str>,
    pub quantity: u32,
    pub urgent: bool,
    pub status: Option<ItemStatus>,
}

pub struct NewDonation<'a> {
    pub donor_name: &'a str,
    pub orphanage_id: &'a str,
    pub category_id: Option<&'a str>,
    pub amount_cents: i64,
    pub donation_date: &'a str,
}

// -- Outcomes --

#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered { user_id: String, orphanage_id: String },
    EmailTaken,
    ContactEmailTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PledgeOutcome {
    Pledged,
    AlreadyPledged,
    NotFound,
}

/// Result of a write that is restricted to the owner of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedWrite {
    Done,
    NotFound,
    NotOwner,
    /// Item edit asked for `Pledged` but the item carries no pledge.
    MissingPledge,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DonationOutcome {
    Recorded { donation_id: String },
    UnknownOrphanage,
    UnknownCategory,
}
