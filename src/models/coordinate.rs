//! Validated coordinates and raw location normalization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A latitude/longitude pair known to be finite and in range.
///
/// Deserialization goes through [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinatePair")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Error, PartialEq)]
#[error("coordinate out of range: {latitude},{longitude}")]
pub struct OutOfRange {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct CoordinatePair {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<CoordinatePair> for Coordinate {
    type Error = OutOfRange;

    fn try_from(pair: CoordinatePair) -> Result<Self, Self::Error> {
        Coordinate::new(pair.latitude, pair.longitude).ok_or(OutOfRange {
            latitude: pair.latitude,
            longitude: pair.longitude,
        })
    }
}

impl Coordinate {
    /// Validate a structured pair. Returns `None` for non-finite or
    /// out-of-range components.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lng_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);

        if lat_ok && lng_ok {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }

    /// Parse a `"lat,lng"` string, tolerating whitespace around either half.
    pub fn parse_str(raw: &str) -> Option<Self> {
        let (lat, lng) = raw.split_once(',')?;
        if lng.contains(',') {
            return None;
        }

        let lat: f64 = lat.trim().parse().ok()?;
        let lng: f64 = lng.trim().parse().ok()?;
        Self::new(lat, lng)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// `"lat,lng"` at 6 decimal places, the form the geocoder expects.
    pub fn to_query_value(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// A record's location after normalization.
///
/// `Invalid` is the sentinel for anything that failed to parse or validate;
/// it travels through the pipeline instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Location {
    Valid(Coordinate),
    Invalid,
}

impl Location {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Location::Valid(c) => Some(*c),
            Location::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Location::Valid(_))
    }
}

impl From<Option<Coordinate>> for Location {
    fn from(value: Option<Coordinate>) -> Self {
        value.map_or(Location::Invalid, Location::Valid)
    }
}

/// Location field as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawLocation {
    /// `"lat,lng"`
    Text(String),
    /// GeoJSON point: `coordinates` is `[lng, lat]`
    GeoJson { coordinates: Vec<f64> },
    LatLng {
        #[serde(alias = "latitude")]
        lat: f64,
        #[serde(alias = "longitude", alias = "lon")]
        lng: f64,
    },
    /// Anything else: nulls in the pair, numbers sent as strings, etc.
    Other(serde_json::Value),
}

impl RawLocation {
    pub fn normalize(&self) -> Location {
        match self {
            RawLocation::Text(s) => Coordinate::parse_str(s).into(),
            RawLocation::GeoJson { coordinates } => match coordinates.as_slice() {
                [lng, lat] => Coordinate::new(*lat, *lng).into(),
                _ => Location::Invalid,
            },
            RawLocation::LatLng { lat, lng } => Coordinate::new(*lat, *lng).into(),
            RawLocation::Other(_) => Location::Invalid,
        }
    }
}
