use anyhow::Result;
use rusqlite::{Connection, params};

use crate::models::{DonationOutcome, DonationRow, NewDonation, OwnedWrite};
use crate::{Database, OptionalExt, new_id, now_timestamp};

impl Database {
    /// Store the donor and the donation together; status starts `Submitted`.
    pub fn record_donation(&self, donation: &NewDonation<'_>) -> Result<DonationOutcome> {
        self.with_tx(|conn| {
            if !exists(conn, "SELECT 1 FROM orphanages WHERE id = ?1", donation.orphanage_id)? {
                return Ok(DonationOutcome::UnknownOrphanage);
            }
            if let Some(category_id) = donation.category_id {
                if !exists(conn, "SELECT 1 FROM item_categories WHERE id = ?1", category_id)? {
                    return Ok(DonationOutcome::UnknownCategory);
                }
            }

            let now = now_timestamp();
            let donor_id = new_id();
            conn.execute(
                "INSERT INTO donors (id, name, created_at) VALUES (?1, ?2, ?3)",
                (&donor_id, donation.donor_name, &now),
            )?;

            let donation_id = new_id();
            conn.execute(
                "INSERT INTO donations (id, donor_id, orphanage_id, category_id, amount_cents, donation_date, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'Submitted', ?7)",
                params![
                    donation_id,
                    donor_id,
                    donation.orphanage_id,
                    donation.category_id,
                    donation.amount_cents,
                    donation.donation_date,
                    now
                ],
            )?;

            Ok(DonationOutcome::Recorded { donation_id })
        })
    }

    pub fn get_donation(&self, id: &str) -> Result<Option<DonationRow>> {
        self.with_conn(|conn| query_donation(conn, id))
    }

    /// The receiving orphanage confirms a donation arrived.
    pub fn mark_donation_received(&self, id: &str, user_id: &str) -> Result<OwnedWrite> {
        self.with_conn(|conn| {
            let Some(donation) = query_donation(conn, id)? else {
                return Ok(OwnedWrite::NotFound);
            };
            if donation.owner_user_id.as_deref() != Some(user_id) {
                return Ok(OwnedWrite::NotOwner);
            }
            conn.execute("UPDATE donations SET status = 'Received' WHERE id = ?1", [id])?;
            Ok(OwnedWrite::Done)
        })
    }
}

fn exists(conn: &Connection, sql: &str, id: &str) -> Result<bool> {
    Ok(conn.query_row(sql, [id], |_| Ok(())).optional()?.is_some())
}

fn query_donation(conn: &Connection, id: &str) -> Result<Option<DonationRow>> {
    let mut stmt = conn.prepare(
        "SELECT d.id, dn.name, o.id, o.name, o.user_id, c.name, d.amount_cents,
                d.donation_date, d.status, d.created_at
         FROM donations d
         JOIN donors dn ON dn.id = d.donor_id
         JOIN orphanages o ON o.id = d.orphanage_id
         LEFT JOIN item_categories c ON c.id = d.category_id
         WHERE d.id = ?1",
    )?;

    stmt.query_row([id], |row| {
        Ok(DonationRow {
            id: row.get(0)?,
            donor_name: row.get(1)?,
            orphanage_id: row.get(2)?,
            orphanage_name: row.get(3)?,
            owner_user_id: row.get(4)?,
            category_name: row.get(5)?,
            amount_cents: row.get(6)?,
            donation_date: row.get(7)?,
            status: row.get(8)?,
            created_at: row.get(9)?,
        })
    })
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::SEED_CATEGORIES;
    use crate::queries::fixtures::register;

    fn donation<'a>(orphanage_id: &'a str, category_id: Option<&'a str>) -> NewDonation<'a> {
        NewDonation {
            donor_name: "Asha",
            orphanage_id,
            category_id,
            amount_cents: 2550,
            donation_date: "2024-05-01",
        }
    }

    #[test]
    fn recorded_donation_can_be_tracked() {
        let db = Database::open_in_memory().unwrap();
        let (_, home) = register(&db, "sunrise@example.org", "Sunrise Home");
        let (food, _) = SEED_CATEGORIES[0];

        let DonationOutcome::Recorded { donation_id } =
            db.record_donation(&donation(&home, Some(food))).unwrap()
        else {
            panic!("donation was not recorded");
        };

        let row = db.get_donation(&donation_id).unwrap().unwrap();
        assert_eq!(row.donor_name, "Asha");
        assert_eq!(row.orphanage_name, "Sunrise Home");
        assert_eq!(row.category_name.as_deref(), Some("Food"));
        assert_eq!(row.amount_cents, 2550);
        assert_eq!(row.status, "Submitted");
    }

    #[test]
    fn unknown_targets_are_rejected_without_writing_a_donor() {
        let db = Database::open_in_memory().unwrap();
        let (_, home) = register(&db, "sunrise@example.org", "Sunrise Home");

        assert_eq!(
            db.record_donation(&donation("missing", None)).unwrap(),
            DonationOutcome::UnknownOrphanage
        );
        assert_eq!(
            db.record_donation(&donation(&home, Some("missing"))).unwrap(),
            DonationOutcome::UnknownCategory
        );

        let donors: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM donors", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(donors, 0);
    }

    #[test]
    fn only_the_receiving_orphanage_marks_donations_received() {
        let db = Database::open_in_memory().unwrap();
        let (owner, home) = register(&db, "sunrise@example.org", "Sunrise Home");
        let (intruder, _) = register(&db, "moon@example.org", "Moonlight Home");

        let DonationOutcome::Recorded { donation_id } =
            db.record_donation(&donation(&home, None)).unwrap()
        else {
            panic!("donation was not recorded");
        };

        assert_eq!(db.mark_donation_received(&donation_id, &intruder).unwrap(), OwnedWrite::NotOwner);
        assert_eq!(db.mark_donation_received(&donation_id, &owner).unwrap(), OwnedWrite::Done);
        assert_eq!(db.get_donation(&donation_id).unwrap().unwrap().status, "Received");
        assert_eq!(db.mark_donation_received("missing", &owner).unwrap(), OwnedWrite::NotFound);
    }

    #[test]
    fn deleting_an_orphanage_removes_only_its_donors() {
        let db = Database::open_in_memory().unwrap();
        let (_, home) = register(&db, "sunrise@example.org", "Sunrise Home");
        let (_, other) = register(&db, "moon@example.org", "Moonlight Home");

        let DonationOutcome::Recorded { donation_id: gone } =
            db.record_donation(&donation(&home, None)).unwrap()
        else {
            panic!("donation was not recorded");
        };
        let DonationOutcome::Recorded { donation_id: kept } = db
            .record_donation(&NewDonation { donor_name: "Ravi", ..donation(&other, None) })
            .unwrap()
        else {
            panic!("donation was not recorded");
        };

        assert!(db.delete_orphanage(&home).unwrap());
        assert!(db.get_donation(&gone).unwrap().is_none());
        assert_eq!(db.get_donation(&kept).unwrap().unwrap().donor_name, "Ravi");

        let donors: Vec<String> = db
            .with_conn(|conn| {
                let mut stmt = conn.prepare("SELECT name FROM donors")?;
                let names = stmt.query_map([], |r| r.get(0))?.collect::<rusqlite::Result<_>>()?;
                Ok(names)
            })
            .unwrap();
        assert_eq!(donors, vec!["Ravi".to_string()]);
    }
}
