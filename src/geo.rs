//! Geolocation collaborator boundary.
//!
//! The form only consumes a `(latitude, longitude)` pair or a failure; how
//! the fix is obtained is environment-specific. Two providers are wired:
//! a pinned position from `FIRESAFE_POSITION` ("lat,lon", useful for kiosk
//! installs and tests), or a JSON lookup endpoint named by
//! `FIRESAFE_GEO_URL`. With neither configured, positioning is unsupported.

use serde::Deserialize;
use thiserror::Error;

/// A GPS fix in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Why no fix could be acquired. Surfaced to the user as a blocking
/// message; the form's coordinate fields stay unset and the user may
/// retry manually.
#[derive(Debug, Clone, Error)]
pub enum LocationError {
    #[error("Thiết bị không hỗ trợ định vị GPS.")]
    Unsupported,
    #[error("Không thể lấy vị trí: {0}")]
    Unavailable(String),
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    latitude: f64,
    longitude: f64,
}

/// Acquire the current position, high accuracy preferred. One shot, no
/// retry; the caller decides whether to ask again.
pub async fn current_position() -> Result<Coordinates, LocationError> {
    if let Ok(pinned) = std::env::var("FIRESAFE_POSITION") {
        return parse_pinned(&pinned);
    }

    let Ok(url) = std::env::var("FIRESAFE_GEO_URL") else {
        return Err(LocationError::Unsupported);
    };

    let response = reqwest::get(&url)
        .await
        .map_err(|e| LocationError::Unavailable(e.to_string()))?
        .error_for_status()
        .map_err(|e| LocationError::Unavailable(e.to_string()))?;

    let fix: LookupResponse = response
        .json()
        .await
        .map_err(|e| LocationError::Unavailable(e.to_string()))?;

    Ok(Coordinates {
        latitude: fix.latitude,
        longitude: fix.longitude,
    })
}

fn parse_pinned(value: &str) -> Result<Coordinates, LocationError> {
    let mut parts = value.splitn(2, ',');
    let latitude = parts
        .next()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .ok_or_else(|| LocationError::Unavailable(format!("tọa độ không hợp lệ: {value}")))?;
    let longitude = parts
        .next()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .ok_or_else(|| LocationError::Unavailable(format!("tọa độ không hợp lệ: {value}")))?;
    Ok(Coordinates {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_position_parses() {
        let fix = parse_pinned("10.7769, 106.7009").unwrap();
        assert_eq!(fix.latitude, 10.7769);
        assert_eq!(fix.longitude, 106.7009);
    }

    #[test]
    fn malformed_pin_is_unavailable() {
        assert!(matches!(
            parse_pinned("ten point seven"),
            Err(LocationError::Unavailable(_))
        ));
        assert!(matches!(
            parse_pinned("10.0"),
            Err(LocationError::Unavailable(_))
        ));
    }
}
