//! Application configuration.
//!
//! Defaults are layered under an optional `civictrack.toml` file and
//! `CIVICTRACK_*` environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::types::Coordinate;

/// AppConfig carries the tunables of the issue tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Outer radius of the "local issues" view, in kilometers.
    pub max_distance_km: f64,
    /// Inner radius of the "local issues" view, in kilometers.
    pub min_distance_km: f64,
    /// Fallback coordinate used when no location has been saved.
    pub default_lat: f64,
    pub default_lng: f64,
    /// Retention caps of the side logs (most recent N entries kept).
    pub admin_log_cap: usize,
    pub activity_log_cap: usize,
    /// Database file path.
    pub db_path: String,
    /// Directory JSON exports are written to.
    pub export_dir: String,
}

impl AppConfig {
    /// Loads configuration: defaults, then `civictrack.toml` if present,
    /// then environment overrides.
    pub fn load() -> Result<Self> {
        let cfg = Config::builder()
            .set_default("max_distance_km", 20.0)?
            .set_default("min_distance_km", 5.0)?
            // Springfield, IL - the deterministic geolocation fallback
            .set_default("default_lat", 39.7817)?
            .set_default("default_lng", -89.6501)?
            .set_default("admin_log_cap", 200)?
            .set_default("activity_log_cap", 100)?
            .set_default("db_path", "civictrack.db")?
            .set_default("export_dir", ".")?
            .add_source(File::with_name("civictrack").required(false))
            .add_source(Environment::with_prefix("CIVICTRACK"))
            .build()
            .context("Failed to load configuration")?;

        cfg.try_deserialize()
            .context("Failed to parse configuration")
    }

    pub fn default_location(&self) -> Coordinate {
        Coordinate {
            lat: self.default_lat,
            lng: self.default_lng,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            max_distance_km: 20.0,
            min_distance_km: 5.0,
            default_lat: 39.7817,
            default_lng: -89.6501,
            admin_log_cap: 200,
            activity_log_cap: 100,
            db_path: "civictrack.db".to_string(),
            export_dir: ".".to_string(),
        }
    }
}
