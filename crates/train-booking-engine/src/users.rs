//! User directory

use tracing::{info, warn};
use train_booking_core::{Error, Result, User, UserPayload};
use uuid::Uuid;

use crate::database::Database;
use crate::storage::WriteBatch;

pub fn add_user(db: &Database, payload: UserPayload) -> Result<User> {
    if payload.is_empty() {
        warn!("rejected empty user payload");
        return Err(Error::InvalidArgument("user payload must not be empty".into()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: payload.name,
        phone_number: payload.phone_number,
        email: payload.email,
        tickets: Vec::new(),
    };

    let mut batch = WriteBatch::default();
    batch.put(&user)?;
    db.commit(batch)?;

    info!(user_id = %user.id, "registered user");
    Ok(user)
}

/// Look up a user; absence is not an error
pub fn get_user(db: &Database, id: &str) -> Result<Option<User>> {
    Ok(db.get(id)?)
}

pub fn get_users(db: &Database) -> Result<Vec<User>> {
    Ok(db.all()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_add_user_starts_without_tickets() {
        let db = Database::new(Box::new(MemoryStorage::new()));
        let user = add_user(
            &db,
            UserPayload {
                name: "Alice".into(),
                phone_number: "555-0101".into(),
                email: "alice@example.com".into(),
            },
        )
        .unwrap();

        assert!(user.tickets.is_empty());
        assert_eq!(get_user(&db, &user.id).unwrap(), Some(user.clone()));
        assert_eq!(get_users(&db).unwrap(), vec![user]);
    }

    #[test]
    fn test_empty_payload_and_missing_user() {
        let db = Database::new(Box::new(MemoryStorage::new()));
        assert!(matches!(
            add_user(&db, UserPayload::default()),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(get_user(&db, "nobody").unwrap(), None);
        assert!(get_users(&db).unwrap().is_empty());
    }
}
