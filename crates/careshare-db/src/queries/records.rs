use anyhow::Result;
use rusqlite::params;

use crate::models::{CategoryRow, UpdateRow};
use crate::{Database, OptionalExt, new_id, now_timestamp};

impl Database {
    // -- Updates (append-only) --

    pub fn add_update(&self, orphanage_id: &str, title: &str, body: &str) -> Result<String> {
        self.with_conn(|conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO updates (id, orphanage_id, title, body, posted_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                (&id, orphanage_id, title, body, now_timestamp()),
            )?;
            Ok(id)
        })
    }

    pub fn recent_updates(&self, orphanage_id: &str, limit: u32) -> Result<Vec<UpdateRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, orphanage_id, title, body, posted_at
                 FROM updates
                 WHERE orphanage_id = ?1
                 ORDER BY posted_at DESC, rowid DESC
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map(params![orphanage_id, limit], |row| {
                    Ok(UpdateRow {
                        id: row.get(0)?,
                        orphanage_id: row.get(1)?,
                        title: row.get(2)?,
                        body: row.get(3)?,
                        posted_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Categories --

    pub fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM item_categories ORDER BY name")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(CategoryRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_category(&self, id: &str) -> Result<Option<CategoryRow>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT id, name FROM item_categories WHERE id = ?1", [id], |row| {
                Ok(CategoryRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()
        })
    }

    // -- Children / staff / inventory --

    pub fn add_child(&self, orphanage_id: &str, name: &str, age: Option<u32>) -> Result<String> {
        self.with_conn(|conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO children (id, orphanage_id, name, age, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, orphanage_id, name, age, now_timestamp()],
            )?;
            Ok(id)
        })
    }

    pub fn add_staff(&self, orphanage_id: &str, name: &str, role: Option<&str>) -> Result<String> {
        self.with_conn(|conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO staff (id, orphanage_id, name, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, orphanage_id, name, role, now_timestamp()],
            )?;
            Ok(id)
        })
    }

    /// Upsert the on-hand quantity for one category.
    pub fn set_inventory(&self, orphanage_id: &str, category_id: &str, quantity: u32) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO inventory (orphanage_id, category_id, quantity, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (orphanage_id, category_id)
                 DO UPDATE SET quantity = excluded.quantity, updated_at = excluded.updated_at",
                params![orphanage_id, category_id, quantity, now_timestamp()],
            )?;
            Ok(())
        })
    }
}
