use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    // Drives the computed session end time
    pub duration_minutes: i32,
    pub rating: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}
