pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::services::{BookingService, SeatService, SessionService};

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub bookings: BookingService,
    pub sessions: SessionService,
    pub seats: SeatService,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        db.run_migrations().await?;
        Ok(Self::from_parts(db, config))
    }

    /// Builds state over an already-connected database. The integration tests
    /// use this with their own pool and migration run.
    pub fn from_parts(db: database::Database, config: config::Config) -> Arc<Self> {
        let bookings = BookingService::new(db.clone());
        let sessions = SessionService::new(db.clone());
        let seats = SeatService::new(db.clone());
        Arc::new(Self { db, config, bookings, sessions, seats })
    }
}
