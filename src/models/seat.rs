use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "seat_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatType {
    Standard,
    Vip,
    Wheelchair,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Seat {
    pub id: i64,
    pub hall_id: i64,
    pub row_number: i32,
    pub seat_number: i32,
    pub seat_type: SeatType,
    pub price_multiplier: Decimal,
}

impl Seat {
    pub fn label(&self) -> String {
        format!("Row {}, Seat {}", self.row_number, self.seat_number)
    }
}
