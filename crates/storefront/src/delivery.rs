//! Delivery zone table loading.

use std::path::Path;

use thiserror::Error;
use zym_power_core::{DeliveryZones, Wilaya};

/// Errors that can occur when loading the delivery zone table.
#[derive(Debug, Error)]
pub enum DeliveryZonesError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid delivery zone table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("delivery zone table is empty")]
    Empty,
}

/// Parse a JSON array of wilayas.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or lists no wilaya.
pub fn parse_zones(json: &str) -> Result<DeliveryZones, DeliveryZonesError> {
    let wilayas: Vec<Wilaya> = serde_json::from_str(json)?;
    if wilayas.is_empty() {
        return Err(DeliveryZonesError::Empty);
    }
    Ok(DeliveryZones::new(wilayas))
}

/// Load the delivery zone table from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_zones(path: &Path) -> Result<DeliveryZones, DeliveryZonesError> {
    let json = std::fs::read_to_string(path).map_err(|source| DeliveryZonesError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let zones = parse_zones(&json)?;
    tracing::info!(path = %path.display(), wilayas = zones.len(), "Loaded delivery zones");
    Ok(zones)
}
