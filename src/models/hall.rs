use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "hall_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum HallType {
    Standard,
    Vip,
    Imax,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hall {
    pub id: i64,
    pub name: String,
    pub hall_type: HallType,
    pub capacity: i32,
}
