mod accounts;
mod donations;
mod items;
mod records;
mod reports;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::Database;
    use crate::models::{NewOrphanage, RegisterOutcome};

    /// Registers an orphanage with a user account and returns (user_id, orphanage_id).
    pub fn register(db: &Database, email: &str, name: &str) -> (String, String) {
        let contact = format!("contact+{}", email);
        let outcome = db
            .register_orphanage(
                email,
                "$argon2id$not-a-real-hash",
                &NewOrphanage {
                    name,
                    city: "Pune",
                    address: "1 Hill Road",
                    contact_email: &contact,
                    description: "",
                },
            )
            .unwrap();
        match outcome {
            RegisterOutcome::Registered { user_id, orphanage_id } => (user_id, orphanage_id),
            other => panic!("registration failed: {:?}", other),
        }
    }
}
