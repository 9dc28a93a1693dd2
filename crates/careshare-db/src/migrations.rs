use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Stable ids for the seeded item categories.
pub const SEED_CATEGORIES: &[(&str, &str)] = &[
    ("00000000-0000-0000-0000-00000000c001", "Food"),
    ("00000000-0000-0000-0000-00000000c002", "Clothing"),
    ("00000000-0000-0000-0000-00000000c003", "Education"),
    ("00000000-0000-0000-0000-00000000c004", "Medical"),
    ("00000000-0000-0000-0000-00000000c005", "Hygiene"),
    ("00000000-0000-0000-0000-00000000c006", "Bedding"),
];

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE orphanages (
                id              TEXT PRIMARY KEY,
                user_id         TEXT UNIQUE REFERENCES users(id),
                name            TEXT NOT NULL,
                city            TEXT NOT NULL,
                address         TEXT NOT NULL,
                contact_email   TEXT NOT NULL UNIQUE,
                description     TEXT NOT NULL DEFAULT '',
                created_at      TEXT NOT NULL
            );

            CREATE TABLE item_categories (
                id      TEXT PRIMARY KEY,
                name    TEXT NOT NULL UNIQUE
            );

            CREATE TABLE items (
                id              TEXT PRIMARY KEY,
                orphanage_id    TEXT NOT NULL REFERENCES orphanages(id) ON DELETE CASCADE,
                name            TEXT NOT NULL,
                category_id     TEXT REFERENCES item_categories(id),
                quantity        INTEGER NOT NULL CHECK (quantity > 0),
                urgent          INTEGER NOT NULL DEFAULT 0,
                status          TEXT NOT NULL DEFAULT 'Active' CHECK (status IN ('Active', 'Pledged')),
                posted_at       TEXT NOT NULL,
                donor_name      TEXT,
                pledged_at      TEXT,
                CHECK (
                    (status = 'Active' AND donor_name IS NULL AND pledged_at IS NULL)
                    OR (status = 'Pledged' AND donor_name IS NOT NULL AND length(trim(donor_name)) > 0 AND pledged_at IS NOT NULL)
                )
            );

            CREATE INDEX idx_items_orphanage ON items(orphanage_id, posted_at);

            CREATE TABLE updates (
                id              TEXT PRIMARY KEY,
                orphanage_id    TEXT NOT NULL REFERENCES orphanages(id) ON DELETE CASCADE,
                title           TEXT NOT NULL,
                body            TEXT NOT NULL,
                posted_at       TEXT NOT NULL
            );

            CREATE INDEX idx_updates_orphanage ON updates(orphanage_id, posted_at);

            CREATE TABLE children (
                id              TEXT PRIMARY KEY,
                orphanage_id    TEXT NOT NULL REFERENCES orphanages(id) ON DELETE CASCADE,
                name            TEXT NOT NULL,
                age             INTEGER,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE staff (
                id              TEXT PRIMARY KEY,
                orphanage_id    TEXT NOT NULL REFERENCES orphanages(id) ON DELETE CASCADE,
                name            TEXT NOT NULL,
                role            TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE inventory (
                orphanage_id    TEXT NOT NULL REFERENCES orphanages(id) ON DELETE CASCADE,
                category_id     TEXT NOT NULL REFERENCES item_categories(id),
                quantity        INTEGER NOT NULL CHECK (quantity >= 0),
                updated_at      TEXT NOT NULL,
                PRIMARY KEY (orphanage_id, category_id)
            );

            CREATE TABLE donors (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE donations (
                id              TEXT PRIMARY KEY,
                donor_id        TEXT NOT NULL REFERENCES donors(id),
                orphanage_id    TEXT NOT NULL REFERENCES orphanages(id) ON DELETE CASCADE,
                category_id     TEXT REFERENCES item_categories(id),
                amount_cents    INTEGER NOT NULL CHECK (amount_cents >= 0),
                donation_date   TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'Submitted' CHECK (status IN ('Submitted', 'Received')),
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_donations_orphanage ON donations(orphanage_id, donation_date);

            CREATE TABLE sessions (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL,
                expires_at  TEXT NOT NULL
            );

            CREATE INDEX idx_sessions_expiry ON sessions(expires_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;

        let mut seed = conn.prepare("INSERT OR IGNORE INTO item_categories (id, name) VALUES (?1, ?2)")?;
        for (id, name) in SEED_CATEGORIES {
            seed.execute((id, name))?;
        }
    }

    info!("Database migrations complete");
    Ok(())
}
