use serde::Deserialize;
use std::env;

// Top-level configuration container, assembled from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Cadence of the background sweeps and the pending-booking lifetime.
// Deployment parameters, not invariants: any interval keeps the sweeps safe,
// shorter ones just reclaim seats sooner.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    pub booking_expiry_minutes: i64,
    pub booking_sweep_interval_secs: u64,
    pub session_sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "cinema_booking=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
            },
            scheduler: SchedulerConfig::from_env(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        SchedulerConfig {
            booking_expiry_minutes: env::var("BOOKING_EXPIRY_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("BOOKING_EXPIRY_MINUTES must be a valid number"),
            booking_sweep_interval_secs: env::var("BOOKING_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("BOOKING_SWEEP_INTERVAL_SECS must be a valid number"),
            session_sweep_interval_secs: env::var("SESSION_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("SESSION_SWEEP_INTERVAL_SECS must be a valid number"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_defaults_match_deployment_cadence() {
        env::remove_var("BOOKING_EXPIRY_MINUTES");
        env::remove_var("BOOKING_SWEEP_INTERVAL_SECS");
        env::remove_var("SESSION_SWEEP_INTERVAL_SECS");
        // Defaults mirror the production schedule: expiry sweep every 5
        // minutes reclaiming bookings older than 15, advancer every minute.
        let cfg = SchedulerConfig::from_env();
        assert_eq!(cfg.booking_expiry_minutes, 15);
        assert_eq!(cfg.booking_sweep_interval_secs, 300);
        assert_eq!(cfg.session_sweep_interval_secs, 60);
    }
}
