use anyhow::Result;
use rusqlite::{Connection, params};
use tracing::debug;

use crate::models::{NewOrphanage, OrphanageRow, RegisterOutcome, SessionUserRow, UserRow};
use crate::{Database, OptionalExt, new_id, now_timestamp, unique_violation};

impl Database {
    // -- Registration --

    /// Create a user and its orphanage in one transaction. A duplicate email
    /// on either table leaves no rows behind.
    pub fn register_orphanage(
        &self,
        email: &str,
        password_hash: &str,
        orphanage: &NewOrphanage<'_>,
    ) -> Result<RegisterOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let user_id = new_id();
            let orphanage_id = new_id();
            let now = now_timestamp();

            if let Err(e) = tx.execute(
                "INSERT INTO users (id, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
                (&user_id, email, password_hash, &now),
            ) {
                let taken = unique_violation(&e) == Some("users.email");
                return if taken { Ok(RegisterOutcome::EmailTaken) } else { Err(e.into()) };
            }

            if let Err(e) = tx.execute(
                "INSERT INTO orphanages (id, user_id, name, city, address, contact_email, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    orphanage_id,
                    user_id,
                    orphanage.name,
                    orphanage.city,
                    orphanage.address,
                    orphanage.contact_email,
                    orphanage.description,
                    now
                ],
            ) {
                // Dropping `tx` rolls back the user insert.
                let taken = unique_violation(&e) == Some("orphanages.contact_email");
                return if taken { Ok(RegisterOutcome::ContactEmailTaken) } else { Err(e.into()) };
            }

            tx.commit()?;
            Ok(RegisterOutcome::Registered { user_id, orphanage_id })
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    // -- Orphanages --

    pub fn get_orphanage(&self, id: &str) -> Result<Option<OrphanageRow>> {
        self.with_conn(|conn| query_orphanage(conn, id))
    }

    pub fn count_orphanages(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM orphanages", [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }

    /// Hard delete; items, updates, children, staff, inventory and donations
    /// go with it through `ON DELETE CASCADE`.
    /// Items, updates and donations cascade. Donors are one per donation, so
    /// the ones left without a donation go in the same transaction.
    pub fn delete_orphanage(&self, id: &str) -> Result<bool> {
        self.with_tx(|conn| {
            let n = conn.execute("DELETE FROM orphanages WHERE id = ?1", [id])?;
            if n == 1 {
                conn.execute(
                    "DELETE FROM donors WHERE id NOT IN (SELECT donor_id FROM donations)",
                    [],
                )?;
            }
            Ok(n == 1)
        })
    }

    // -- Sessions --

    pub fn create_session(&self, id: &str, user_id: &str, expires_at: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
                (id, user_id, now_timestamp(), expires_at),
            )?;
            Ok(())
        })
    }

    /// Resolve a live session. The session must belong to `user_id` and not be
    /// past `expires_at` relative to `now`.
    pub fn get_session_user(
        &self,
        session_id: &str,
        user_id: &str,
        now: &str,
    ) -> Result<Option<SessionUserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT u.id, u.email, o.id
                 FROM sessions s
                 JOIN users u ON u.id = s.user_id
                 LEFT JOIN orphanages o ON o.user_id = u.id
                 WHERE s.id = ?1 AND s.user_id = ?2 AND s.expires_at > ?3",
                (session_id, user_id, now),
                |row| {
                    Ok(SessionUserRow {
                        user_id: row.get(0)?,
                        email: row.get(1)?,
                        orphanage_id: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn delete_session(&self, session_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM sessions WHERE id = ?1", [session_id])?;
            Ok(n == 1)
        })
    }

    pub fn purge_expired_sessions(&self, now: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", [now])?;
            if n > 0 {
                debug!("Purged {} expired sessions", n);
            }
            Ok(n)
        })
    }
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, email, password, created_at FROM users WHERE email = ?1")?;

    stmt.query_row([email], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            email: row.get(1)?,
            password: row.get(2)?,
            created_at: row.get(3)?,
        })
    })
    .optional()
}

fn query_orphanage(conn: &Connection, id: &str) -> Result<Option<OrphanageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, city, address, contact_email, description, created_at
         FROM orphanages WHERE id = ?1",
    )?;

    stmt.query_row([id], |row| {
        Ok(OrphanageRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            city: row.get(3)?,
            address: row.get(4)?,
            contact_email: row.get(5)?,
            description: row.get(6)?,
            created_at: row.get(7)?,
        })
    })
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::register;

    fn row_count(db: &Database, table: &str) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?)
        })
        .unwrap()
    }

    fn orphanage<'a>(contact_email: &'a str) -> NewOrphanage<'a> {
        NewOrphanage {
            name: "Sunrise Home",
            city: "Pune",
            address: "12 Lake Road",
            contact_email,
            description: "",
        }
    }

    #[test]
    fn registration_creates_linked_user_and_orphanage() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, orphanage_id) = register(&db, "sunrise@example.org", "Sunrise Home");

        let user = db.get_user_by_email("sunrise@example.org").unwrap().unwrap();
        assert_eq!(user.id, user_id);

        let home = db.get_orphanage(&orphanage_id).unwrap().unwrap();
        assert_eq!(home.user_id.as_deref(), Some(user_id.as_str()));
        assert_eq!(home.name, "Sunrise Home");
    }

    #[test]
    fn duplicate_email_is_reported_and_leaves_no_rows() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "sunrise@example.org", "Sunrise Home");

        let outcome = db
            .register_orphanage("sunrise@example.org", "hash", &orphanage("other@example.org"))
            .unwrap();
        assert_eq!(outcome, RegisterOutcome::EmailTaken);
        assert_eq!(row_count(&db, "users"), 1);
        assert_eq!(row_count(&db, "orphanages"), 1);
    }

    #[test]
    fn duplicate_contact_email_rolls_back_the_user() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "sunrise@example.org", "Sunrise Home");

        let outcome = db
            .register_orphanage(
                "new@example.org",
                "hash",
                &orphanage("contact+sunrise@example.org"),
            )
            .unwrap();
        assert_eq!(outcome, RegisterOutcome::ContactEmailTaken);
        assert!(db.get_user_by_email("new@example.org").unwrap().is_none());
        assert_eq!(row_count(&db, "users"), 1);
    }

    #[test]
    fn sessions_expire_and_can_be_revoked() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, orphanage_id) = register(&db, "sunrise@example.org", "Sunrise Home");

        db.create_session("s1", &user_id, "2030-01-01T00:00:00.000000Z").unwrap();
        let live = db
            .get_session_user("s1", &user_id, "2029-12-31T00:00:00.000000Z")
            .unwrap()
            .unwrap();
        assert_eq!(live.orphanage_id.as_deref(), Some(orphanage_id.as_str()));

        assert!(db.get_session_user("s1", &user_id, "2030-01-02T00:00:00.000000Z").unwrap().is_none());
        assert!(db.get_session_user("s1", "someone-else", "2029-12-31T00:00:00.000000Z").unwrap().is_none());

        assert!(db.delete_session("s1").unwrap());
        assert!(db.get_session_user("s1", &user_id, "2029-12-31T00:00:00.000000Z").unwrap().is_none());
    }

    #[test]
    fn purge_removes_only_expired_sessions() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, _) = register(&db, "sunrise@example.org", "Sunrise Home");
        db.create_session("old", &user_id, "2020-01-01T00:00:00.000000Z").unwrap();
        db.create_session("new", &user_id, "2030-01-01T00:00:00.000000Z").unwrap();

        assert_eq!(db.purge_expired_sessions("2025-01-01T00:00:00.000000Z").unwrap(), 1);
        assert_eq!(row_count(&db, "sessions"), 1);
    }
}
