use anyhow::Result;
use careshare_types::models::ItemStatus;
use rusqlite::{Connection, params};

use crate::models::{ItemFields, ItemRow, OwnedWrite, PledgeOutcome};
use crate::{Database, OptionalExt, new_id, now_timestamp};

impl Database {
    /// New items always start `Active`; `fields.status` is ignored here.
    pub fn add_item(&self, orphanage_id: &str, fields: &ItemFields<'_>) -> Result<String> {
        self.with_conn(|conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO items (id, orphanage_id, name, category_id, quantity, urgent, status, posted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'Active', ?7)",
                params![
                    id,
                    orphanage_id,
                    fields.name,
                    fields.category_id,
                    fields.quantity,
                    fields.urgent,
                    now_timestamp()
                ],
            )?;
            Ok(id)
        })
    }

    pub fn get_item(&self, id: &str) -> Result<Option<ItemRow>> {
        self.with_conn(|conn| query_item(conn, id))
    }

    pub fn count_active_items(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 =
                conn.query_row("SELECT COUNT(*) FROM items WHERE status = 'Active'", [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }

    /// Overwrite every editable field of an item owned by `user_id`.
    /// Moving back to `Active` clears the pledge; moving to `Pledged` is only
    /// allowed when a pledge is already recorded. A `None` status keeps the
    /// current one.
    pub fn update_item(
        &self,
        id: &str,
        user_id: &str,
        fields: &ItemFields<'_>,
    ) -> Result<OwnedWrite> {
        self.with_conn(|conn| {
            let Some(item) = query_item(conn, id)? else {
                return Ok(OwnedWrite::NotFound);
            };
            if item.owner_user_id.as_deref() != Some(user_id) {
                return Ok(OwnedWrite::NotOwner);
            }
            // Keep-current status is read under the write's lock.
            let status = match fields.status {
                Some(status) => status,
                None => item.status.parse().map_err(anyhow::Error::new)?,
            };
            if status == ItemStatus::Pledged && item.donor_name.is_none() {
                return Ok(OwnedWrite::MissingPledge);
            }

            conn.execute(
                "UPDATE items SET
                    name = ?1,
                    category_id = ?2,
                    quantity = ?3,
                    urgent = ?4,
                    status = ?5,
                    donor_name = CASE WHEN ?5 = 'Active' THEN NULL ELSE donor_name END,
                    pledged_at = CASE WHEN ?5 = 'Active' THEN NULL ELSE pledged_at END
                 WHERE id = ?6",
                params![
                    fields.name,
                    fields.category_id,
                    fields.quantity,
                    fields.urgent,
                    status.as_str(),
                    id
                ],
            )?;
            Ok(OwnedWrite::Done)
        })
    }

    pub fn delete_item(&self, id: &str, user_id: &str) -> Result<OwnedWrite> {
        self.with_conn(|conn| {
            let Some(item) = query_item(conn, id)? else {
                return Ok(OwnedWrite::NotFound);
            };
            if item.owner_user_id.as_deref() != Some(user_id) {
                return Ok(OwnedWrite::NotOwner);
            }
            conn.execute("DELETE FROM items WHERE id = ?1", [id])?;
            Ok(OwnedWrite::Done)
        })
    }

    /// Compare-and-swap on `status = 'Active'`: of any number of concurrent
    /// pledges for one item exactly one sees an affected row.
    pub fn pledge_item(&self, id: &str, donor_name: &str) -> Result<PledgeOutcome> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE items SET status = 'Pledged', donor_name = ?1, pledged_at = ?2
                 WHERE id = ?3 AND status = 'Active'",
                (donor_name, now_timestamp(), id),
            )?;
            if changed == 1 {
                return Ok(PledgeOutcome::Pledged);
            }

            let exists = conn
                .query_row("SELECT 1 FROM items WHERE id = ?1", [id], |_| Ok(()))
                .optional()?
                .is_some();
            Ok(if exists {
                PledgeOutcome::AlreadyPledged
            } else {
                PledgeOutcome::NotFound
            })
        })
    }
}

fn query_item(conn: &Connection, id: &str) -> Result<Option<ItemRow>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.orphanage_id, o.user_id, i.name, i.category_id, i.quantity, i.urgent,
                i.status, i.posted_at, i.donor_name, i.pledged_at
         FROM items i
         JOIN orphanages o ON o.id = i.orphanage_id
         WHERE i.id = ?1",
    )?;

    stmt.query_row([id], |row| {
        Ok(ItemRow {
            id: row.get(0)?,
            orphanage_id: row.get(1)?,
            owner_user_id: row.get(2)?,
            name: row.get(3)?,
            category_id: row.get(4)?,
            quantity: row.get(5)?,
            urgent: row.get(6)?,
            status: row.get(7)?,
            posted_at: row.get(8)?,
            donor_name: row.get(9)?,
            pledged_at: row.get(10)?,
        })
    })
    .optional()
}
