//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orchard_core::{Email, UserId, UserRole};

/// A registered account.
///
/// The password hash lives only in the `users` table and is never part of
/// this model, so it cannot leak through a serialized response.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
