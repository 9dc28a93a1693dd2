use anyhow::Result;
use rusqlite::params;

use crate::Database;
use crate::models::{CriticalNeedRow, DonationSummaryRow, NeedRow};

impl Database {
    /// Every item of every orphanage, grouped by orphanage name.
    pub fn list_needs(&self) -> Result<Vec<NeedRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT i.id, o.id, o.name, i.name, c.name, i.quantity, i.urgent, i.status,
                        i.posted_at, i.donor_name, i.pledged_at
                 FROM items i
                 JOIN orphanages o ON o.id = i.orphanage_id
                 LEFT JOIN item_categories c ON c.id = i.category_id
                 ORDER BY o.name, i.posted_at, i.rowid",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(NeedRow {
                        item_id: row.get(0)?,
                        orphanage_id: row.get(1)?,
                        orphanage_name: row.get(2)?,
                        item_name: row.get(3)?,
                        category_name: row.get(4)?,
                        quantity: row.get(5)?,
                        urgent: row.get(6)?,
                        status: row.get(7)?,
                        posted_at: row.get(8)?,
                        donor_name: row.get(9)?,
                        pledged_at: row.get(10)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn count_children(&self, orphanage_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM children WHERE orphanage_id = ?1",
                [orphanage_id],
                |r| r.get(0),
            )?;
            Ok(n as u64)
        })
    }

    pub fn count_staff(&self, orphanage_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM staff WHERE orphanage_id = ?1",
                [orphanage_id],
                |r| r.get(0),
            )?;
            Ok(n as u64)
        })
    }

    /// Categories whose active requirement exceeds stock on hand. A category
    /// with no inventory row has zero on hand.
    pub fn critical_needs(&self, orphanage_id: &str) -> Result<Vec<CriticalNeedRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.name, COALESCE(inv.quantity, 0) AS on_hand, req.required
                 FROM (
                     SELECT category_id, SUM(quantity) AS required
                     FROM items
                     WHERE orphanage_id = ?1 AND status = 'Active' AND category_id IS NOT NULL
                     GROUP BY category_id
                 ) req
                 JOIN item_categories c ON c.id = req.category_id
                 LEFT JOIN inventory inv
                     ON inv.orphanage_id = ?1 AND inv.category_id = req.category_id
                 WHERE COALESCE(inv.quantity, 0) < req.required
                 ORDER BY c.name",
            )?;

            let rows = stmt
                .query_map([orphanage_id], |row| {
                    Ok(CriticalNeedRow {
                        category_id: row.get(0)?,
                        category_name: row.get(1)?,
                        on_hand: row.get(2)?,
                        required: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn recent_donations(&self, orphanage_id: &str, limit: u32) -> Result<Vec<DonationSummaryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT d.id, dn.name, d.donation_date, d.amount_cents, d.status
                 FROM donations d
                 JOIN donors dn ON dn.id = d.donor_id
                 WHERE d.orphanage_id = ?1
                 ORDER BY d.donation_date DESC, d.created_at DESC, d.rowid DESC
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map(params![orphanage_id, limit], |row| {
                    Ok(DonationSummaryRow {
                        id: row.get(0)?,
                        donor_name: row.get(1)?,
                        donation_date: row.get(2)?,
                        amount_cents: row.get(3)?,
                        status: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::SEED_CATEGORIES;
    use crate::models::{DonationOutcome, ItemFields, NewDonation};
    use crate::queries::fixtures::register;

    fn item<'a>(name: &'a str, category_id: Option<&'a str>, quantity: u32) -> ItemFields<'a> {
        ItemFields {
            name,
            category_id,
            quantity,
            urgent: false,
            status: None,
        }
    }

    #[test]
    fn needs_are_ordered_by_orphanage_name_with_category() {
        let db = Database::open_in_memory().unwrap();
        let (_, zeta) = register(&db, "zeta@example.org", "Zeta House");
        let (_, alpha) = register(&db, "alpha@example.org", "Alpha Home");
        let (food, _) = SEED_CATEGORIES[0];

        db.add_item(&zeta, &item("Rice", Some(food), 10)).unwrap();
        db.add_item(&alpha, &item("Notebooks", None, 30)).unwrap();

        let needs = db.list_needs().unwrap();
        let names: Vec<&str> = needs.iter().map(|n| n.orphanage_name.as_str()).collect();
        assert_eq!(names, ["Alpha Home", "Zeta House"]);
        assert_eq!(needs[0].category_name, None);
        assert_eq!(needs[1].category_name.as_deref(), Some("Food"));
    }

    #[test]
    fn critical_needs_compare_active_requirement_with_stock() {
        let db = Database::open_in_memory().unwrap();
        let (_, home) = register(&db, "sunrise@example.org", "Sunrise Home");
        let (food, _) = SEED_CATEGORIES[0];
        let (clothing, _) = SEED_CATEGORIES[1];
        let (medical, _) = SEED_CATEGORIES[3];

        // Food: need 30, have 10 -> critical.
        db.add_item(&home, &item("Rice", Some(food), 20)).unwrap();
        db.add_item(&home, &item("Lentils", Some(food), 10)).unwrap();
        db.set_inventory(&home, food, 10).unwrap();
        // Clothing: need 5, have 5 -> fine.
        db.add_item(&home, &item("Shoes", Some(clothing), 5)).unwrap();
        db.set_inventory(&home, clothing, 5).unwrap();
        // Medical: need 2, no stock row -> critical.
        db.add_item(&home, &item("First aid kit", Some(medical), 2)).unwrap();

        let critical = db.critical_needs(&home).unwrap();
        let summary: Vec<(&str, i64, i64)> = critical
            .iter()
            .map(|c| (c.category_name.as_str(), c.on_hand, c.required))
            .collect();
        assert_eq!(summary, [("Food", 10, 30), ("Medical", 0, 2)]);
    }

    #[test]
    fn pledged_items_do_not_count_towards_critical_needs() {
        let db = Database::open_in_memory().unwrap();
        let (_, home) = register(&db, "sunrise@example.org", "Sunrise Home");
        let (food, _) = SEED_CATEGORIES[0];

        let id = db.add_item(&home, &item("Rice", Some(food), 20)).unwrap();
        db.pledge_item(&id, "Asha").unwrap();

        assert!(db.critical_needs(&home).unwrap().is_empty());
    }

    #[test]
    fn recent_donations_are_newest_first_and_capped() {
        let db = Database::open_in_memory().unwrap();
        let (_, home) = register(&db, "sunrise@example.org", "Sunrise Home");
        let (_, other) = register(&db, "moon@example.org", "Moonlight Home");

        for day in 1..=7 {
            let date = format!("2024-03-{:02}", day);
            let outcome = db
                .record_donation(&NewDonation {
                    donor_name: &format!("Donor {}", day),
                    orphanage_id: &home,
                    category_id: None,
                    amount_cents: 100 * day,
                    donation_date: &date,
                })
                .unwrap();
            assert!(matches!(outcome, DonationOutcome::Recorded { .. }));
        }
        db.record_donation(&NewDonation {
            donor_name: "Elsewhere",
            orphanage_id: &other,
            category_id: None,
            amount_cents: 5000,
            donation_date: "2024-12-31",
        })
        .unwrap();

        let recent = db.recent_donations(&home, 5).unwrap();
        let dates: Vec<&str> = recent.iter().map(|d| d.donation_date.as_str()).collect();
        assert_eq!(
            dates,
            ["2024-03-07", "2024-03-06", "2024-03-05", "2024-03-04", "2024-03-03"]
        );
        assert_eq!(recent[0].donor_name, "Donor 7");
    }

    #[test]
    fn head_counts_are_per_orphanage() {
        let db = Database::open_in_memory().unwrap();
        let (_, home) = register(&db, "sunrise@example.org", "Sunrise Home");
        let (_, other) = register(&db, "moon@example.org", "Moonlight Home");

        db.add_child(&home, "Meera", Some(7)).unwrap();
        db.add_child(&home, "Arjun", None).unwrap();
        db.add_child(&other, "Kabir", Some(9)).unwrap();
        db.add_staff(&home, "Lata", Some("Caretaker")).unwrap();

        assert_eq!(db.count_children(&home).unwrap(), 2);
        assert_eq!(db.count_staff(&home).unwrap(), 1);
        assert_eq!(db.count_staff(&other).unwrap(), 0);
    }
}
