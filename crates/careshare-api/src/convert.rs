//! Row → wire conversions. Stored values are written by this service, so a
//! value that fails to parse is logged and replaced with a default rather
//! than failing the whole response.

use careshare_db::models::{
    CategoryRow, CriticalNeedRow, DonationRow, DonationSummaryRow, ItemRow, NeedRow, UpdateRow,
};
use careshare_types::api::{
    CategoryResponse, CriticalNeed, DonationDetail, DonationSummary, ItemResponse, NeedResponse,
    UpdateResponse,
};
use careshare_types::models::{DonationStatus, ItemStatus};
use careshare_types::money::from_cents;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;
use uuid::Uuid;

pub(crate) fn id(raw: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt id '{}': {}", raw, e);
        Uuid::default()
    })
}

pub(crate) fn timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
        warn!("Corrupt timestamp '{}': {}", raw, e);
        DateTime::default()
    })
}

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|e| {
        warn!("Corrupt date '{}': {}", raw, e);
        NaiveDate::default()
    })
}

fn item_status(raw: &str) -> ItemStatus {
    raw.parse().unwrap_or_else(|e| {
        warn!("{}", e);
        ItemStatus::Active
    })
}

fn donation_status(raw: &str) -> DonationStatus {
    raw.parse().unwrap_or_else(|e| {
        warn!("{}", e);
        DonationStatus::Submitted
    })
}

fn quantity(raw: i64) -> u32 {
    u32::try_from(raw).unwrap_or_default()
}

pub(crate) fn need(row: NeedRow) -> NeedResponse {
    NeedResponse {
        item_id: id(&row.item_id),
        orphanage_id: id(&row.orphanage_id),
        orphanage_name: row.orphanage_name,
        item_name: row.item_name,
        category_name: row.category_name,
        quantity: quantity(row.quantity),
        urgent: row.urgent,
        status: item_status(&row.status),
        posted_at: timestamp(&row.posted_at),
        donor_name: row.donor_name,
        pledged_at: row.pledged_at.as_deref().map(timestamp),
    }
}

pub(crate) fn item(row: ItemRow) -> ItemResponse {
    ItemResponse {
        id: id(&row.id),
        orphanage_id: id(&row.orphanage_id),
        name: row.name,
        category_id: row.category_id.as_deref().map(id),
        quantity: quantity(row.quantity),
        urgent: row.urgent,
        status: item_status(&row.status),
        posted_at: timestamp(&row.posted_at),
        donor_name: row.donor_name,
        pledged_at: row.pledged_at.as_deref().map(timestamp),
    }
}

pub(crate) fn update(row: UpdateRow) -> UpdateResponse {
    UpdateResponse {
        id: id(&row.id),
        title: row.title,
        body: row.body,
        posted_at: timestamp(&row.posted_at),
    }
}

pub(crate) fn category(row: CategoryRow) -> CategoryResponse {
    CategoryResponse {
        id: id(&row.id),
        name: row.name,
    }
}

pub(crate) fn critical_need(row: CriticalNeedRow) -> CriticalNeed {
    CriticalNeed {
        category_id: id(&row.category_id),
        category_name: row.category_name,
        on_hand: quantity(row.on_hand),
        required: quantity(row.required),
    }
}

pub(crate) fn donation_summary(row: DonationSummaryRow) -> DonationSummary {
    DonationSummary {
        donation_id: id(&row.id),
        donor_name: row.donor_name,
        donation_date: date(&row.donation_date),
        amount: from_cents(row.amount_cents),
        status: donation_status(&row.status),
    }
}

pub(crate) fn donation_detail(row: DonationRow) -> DonationDetail {
    DonationDetail {
        donation_id: id(&row.id),
        donor_name: row.donor_name,
        orphanage_id: id(&row.orphanage_id),
        orphanage_name: row.orphanage_name,
        category_name: row.category_name,
        amount: from_cents(row.amount_cents),
        donation_date: date(&row.donation_date),
        status: donation_status(&row.status),
        created_at: timestamp(&row.created_at),
    }
}
