use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

// Accounts are managed elsewhere; bookings only reference these rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}
