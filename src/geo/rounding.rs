//! Coordinate rounding for privacy.
//!
//! Snaps a raw coordinate to the centre of a grid cell so that no exact
//! location is stored or transmitted. One degree of latitude is taken as
//! 111 km, one degree of longitude as 111 km * cos(latitude).

use serde::{Deserialize, Serialize};

use crate::error::CoordinateError;

/// Metres per degree of latitude.
pub const METRES_PER_DEGREE: f64 = 111_000.0;

/// Floor for metres per degree of longitude near the poles, where
/// cos(latitude) approaches zero.
pub const MIN_METRES_PER_DEGREE_LON: f64 = 1.0;

/// A full-precision coordinate. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A coordinate snapped to the privacy grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundedCoordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Precision radii offered to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum PrecisionRadius {
    M200,
    M500,
    Km1,
    Km2,
}

impl PrecisionRadius {
    pub const ALL: [PrecisionRadius; 4] = [
        PrecisionRadius::M200,
        PrecisionRadius::M500,
        PrecisionRadius::Km1,
        PrecisionRadius::Km2,
    ];

    pub fn metres(&self) -> u32 {
        match self {
            PrecisionRadius::M200 => 200,
            PrecisionRadius::M500 => 500,
            PrecisionRadius::Km1 => 1000,
            PrecisionRadius::Km2 => 2000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrecisionRadius::M200 => "200 m",
            PrecisionRadius::M500 => "500 m",
            PrecisionRadius::Km1 => "1 km",
            PrecisionRadius::Km2 => "2 km",
        }
    }

    pub fn from_metres(metres: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.metres() == metres)
    }
}

impl From<PrecisionRadius> for u32 {
    fn from(p: PrecisionRadius) -> u32 {
        p.metres()
    }
}

impl TryFrom<u32> for PrecisionRadius {
    type Error = String;

    fn try_from(metres: u32) -> Result<Self, Self::Error> {
        Self::from_metres(metres).ok_or_else(|| format!("unsupported precision: {} m", metres))
    }
}

/// Grid step in degrees for (latitude, longitude) at the given latitude.
pub fn grid_steps(lat: f64, precision_m: f64) -> (f64, f64) {
    let lat_step = precision_m / METRES_PER_DEGREE;
    let metres_per_deg_lon =
        (METRES_PER_DEGREE * lat.to_radians().cos()).max(MIN_METRES_PER_DEGREE_LON);
    (lat_step, precision_m / metres_per_deg_lon)
}

/// Round a coordinate to the privacy grid.
///
/// Latitude is snapped first; the longitude step is derived from the
/// snapped latitude so every point of a latitude band shares one longitude
/// step. This keeps the operation idempotent.
///
/// # Errors
/// Non-finite or out-of-range coordinates and non-positive precision.
pub fn round_coordinates(
    lat: f64,
    lon: f64,
    precision_m: f64,
) -> Result<RoundedCoordinates, CoordinateError> {
    check_axis("lat", lat, 90.0)?;
    check_axis("lon", lon, 180.0)?;
    if !precision_m.is_finite() || precision_m <= 0.0 {
        return Err(CoordinateError::InvalidPrecision(precision_m));
    }

    let lat_step = precision_m / METRES_PER_DEGREE;
    let rounded_lat = snap(lat, lat_step, 90.0);

    let (_, lon_step) = grid_steps(rounded_lat, precision_m);
    let rounded_lon = snap(lon, lon_step, 180.0);

    Ok(RoundedCoordinates {
        lat: rounded_lat,
        lon: rounded_lon,
    })
}

/// Round a [`Coordinates`] with one of the offered radii.
pub fn round_with_radius(
    coords: Coordinates,
    radius: PrecisionRadius,
) -> Result<RoundedCoordinates, CoordinateError> {
    round_coordinates(coords.latitude, coords.longitude, radius.metres() as f64)
}

fn check_axis(field: &'static str, value: f64, limit: f64) -> Result<(), CoordinateError> {
    if !value.is_finite() {
        return Err(CoordinateError::NonFinite { field, value });
    }
    if value.abs() > limit {
        return Err(CoordinateError::OutOfRange { field, value });
    }
    Ok(())
}

/// Nearest multiple of `step`, pulled back one step if it lands past `limit`.
fn snap(value: f64, step: f64, limit: f64) -> f64 {
    let snapped = (value / step).round() * step;
    if snapped.abs() > limit {
        let pulled = snapped - step.copysign(snapped);
        if pulled.abs() > limit {
            // Step wider than the whole axis.
            return 0.0;
        }
        return pulled;
    }
    snapped
}
