//! Incident records: wire shapes, the canonical record, and the enriched row.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::coordinate::{Location, RawLocation};
use super::timestamp::CapturedAt;

/// Litter log as stored by the backend API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredIncident {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub location: Option<RawLocation>,
    pub image_url: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_deleted: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub timestamp: Option<String>,
    #[serde(rename = "__v", default)]
    pub version: Option<Value>,
}

/// Image entry from the direct-storage listing.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyIncident {
    pub url: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub timestamp: Option<String>,
}

/// Non-string values are kept in their JSON form so they surface as an
/// invalid timestamp rather than failing the record.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Every record shape the listing endpoints have produced.
///
/// The wire carries no tag, so the variant is picked by field set:
/// `_id` + `imageUrl` is structured, `url` is legacy.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IncidentSource {
    Structured(StructuredIncident),
    Legacy(LegacyIncident),
}

/// Canonical incident, independent of which listing produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentRecord {
    pub id: String,
    /// `None` when the source carried no location at all.
    pub location: Option<Location>,
    pub image_url: String,
    pub captured_at: CapturedAt,
}

impl IncidentRecord {
    /// Normalize a wire record. Soft-deleted logs yield `None`.
    pub fn from_source(source: IncidentSource) -> Option<Self> {
        match source {
            IncidentSource::Structured(s) => {
                if s.is_deleted {
                    return None;
                }
                Some(Self {
                    id: s.id,
                    location: s.location.as_ref().map(RawLocation::normalize),
                    image_url: s.image_url,
                    captured_at: CapturedAt::from_raw(s.timestamp.as_deref()),
                })
            }
            IncidentSource::Legacy(l) => Some(Self {
                // The storage listing has no ids; the object key or URL is stable.
                id: l.key.unwrap_or_else(|| l.url.clone()),
                location: l.location.as_ref().map(RawLocation::normalize),
                image_url: l.url,
                captured_at: CapturedAt::from_raw(l.timestamp.as_deref()),
            }),
        }
    }
}

/// A record ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: IncidentRecord,
    pub address: Option<String>,
    pub display_timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(value: serde_json::Value) -> IncidentSource {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_structured_record() {
        let src = source(json!({
            "_id": "66eea1f0c2",
            "location": {"type": "Point", "coordinates": [77.5946, 12.9716]},
            "imageUrl": "https://cdn.example.com/a.jpg",
            "isDeleted": false,
            "timestamp": "2024-09-21T11:23:04.000Z",
            "__v": 0
        }));
        assert!(matches!(src, IncidentSource::Structured(_)));

        let record = IncidentRecord::from_source(src).unwrap();
        assert_eq!(record.id, "66eea1f0c2");
        let c = record.location.unwrap().coordinate().unwrap();
        assert_eq!(c.latitude(), 12.9716);
        assert_eq!(record.image_url, "https://cdn.example.com/a.jpg");
        assert!(record.captured_at.datetime().is_some());
    }

    #[test]
    fn test_deleted_structured_record_is_dropped() {
        let src = source(json!({
            "_id": "gone",
            "location": {"coordinates": [0.0, 0.0]},
            "imageUrl": "https://cdn.example.com/b.jpg",
            "isDeleted": true,
            "timestamp": "2024-09-21T11:23:04Z",
            "__v": 0
        }));
        assert!(IncidentRecord::from_source(src).is_none());
    }

    #[test]
    fn test_legacy_record() {
        let src = source(json!({
            "url": "https://bucket.example.com/IMG_20240921_112304.jpg",
            "location": "12.9716, 77.5946",
            "timestamp": "20240921_112304"
        }));
        assert!(matches!(src, IncidentSource::Legacy(_)));

        let record = IncidentRecord::from_source(src).unwrap();
        assert_eq!(record.id, "https://bucket.example.com/IMG_20240921_112304.jpg");
        assert!(record.location.unwrap().is_valid());
        assert_eq!(
            record.captured_at.display(),
            "September 21, 2024 at 11:23:04 AM"
        );
    }

    #[test]
    fn test_bad_location_becomes_sentinel() {
        let src = source(json!({
            "url": "https://bucket.example.com/x.jpg",
            "location": "999,999",
            "timestamp": "garbage"
        }));
        let record = IncidentRecord::from_source(src).unwrap();
        assert_eq!(record.location, Some(Location::Invalid));
        assert!(matches!(record.captured_at, CapturedAt::Invalid(_)));
    }

    #[test]
    fn test_missing_location_and_timestamp() {
        let src = source(json!({"url": "https://bucket.example.com/y.jpg"}));
        let record = IncidentRecord::from_source(src).unwrap();
        assert!(record.location.is_none());
        assert_eq!(record.captured_at, CapturedAt::Missing);
    }

    #[test]
    fn test_odd_field_types_keep_the_record() {
        let src = source(json!({
            "_id": "66eea1f0c3",
            "location": {"type": "Point", "coordinates": [null, null]},
            "imageUrl": "https://cdn.example.com/c.jpg",
            "isDeleted": "false",
            "timestamp": 1726917784,
            "__v": "0"
        }));
        assert!(matches!(src, IncidentSource::Structured(_)));

        let record = IncidentRecord::from_source(src).unwrap();
        assert_eq!(record.location, Some(Location::Invalid));
        assert_eq!(
            record.captured_at,
            CapturedAt::Invalid("1726917784".to_string())
        );
        assert_eq!(record.captured_at.display(), "Invalid Date");
    }

    #[test]
    fn test_null_timestamp_is_missing() {
        let src = source(json!({"url": "https://bucket.example.com/z.jpg", "timestamp": null}));
        let record = IncidentRecord::from_source(src).unwrap();
        assert_eq!(record.captured_at, CapturedAt::Missing);
    }

    #[test]
    fn test_record_without_identity_is_rejected() {
        let result = serde_json::from_value::<IncidentSource>(json!({
            "location": "12.9716,77.5946",
            "timestamp": "20240921_112304"
        }));
        assert!(result.is_err());
    }
}
