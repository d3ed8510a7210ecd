/*!
 * Hazard reports as delivered by the backend reports endpoint.
 *
 * The endpoint responds with `{ "reports": [ ... ] }` where every report carries a GeoJSON point
 * location, `{ "type": "Point", "coordinates": [lon, lat] }`. Only the location matters for
 * clustering; the rest is carried along for the dashboard and the archive.
 *
 * Records are decoded one at a time. A record that can't be decoded or that doesn't have a usable
 * location is skipped with a warning instead of failing the whole document, so a single bad
 * submission can't take down the map.
 */
use crate::{
    geo::{BoundingBox, Coord, Geo},
    HotspotResult, ReportError,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::{fs::File, io::BufReader, io::Read, path::Path};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Where a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
pub enum ReportSource {
    /// Submitted by a person through the app.
    #[strum(serialize = "user")]
    User,
    /// Harvested from social media.
    #[strum(serialize = "social_media")]
    SocialMedia,
    /// Anything else, including a missing source.
    #[strum(serialize = "other")]
    Other,
}

impl ReportSource {
    /// Get the name used by the backend for this source.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Interpret a backend source value, unknown values map to `Other`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(ReportSource::Other)
    }
}

/// A single geotagged hazard report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Backend identifier, unique per report.
    pub id: String,
    pub location: Coord,
    /// Backend hazard value, e.g. "oil_spill".
    pub hazard_type: String,
    pub description: String,
    pub media_url: Option<String>,
    pub is_verified: bool,
    pub source: ReportSource,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Create a report with just an identity and a location.
    ///
    /// The other fields take the same values a backend record without them decodes to.
    pub fn new<S: Into<String>>(id: S, location: Coord) -> Self {
        Report {
            id: id.into(),
            location,
            hazard_type: String::new(),
            description: String::new(),
            media_url: None,
            is_verified: false,
            source: ReportSource::Other,
            created_at: DateTime::<Utc>::default(),
        }
    }
}

impl Geo for Report {
    fn centroid(&self) -> Coord {
        self.location
    }
}

/// Format a backend hazard value for people, "oil_spill" becomes "Oil Spill".
pub fn display_hazard_type(hazard_type: &str) -> String {
    if hazard_type.trim().is_empty() {
        return "Unknown Hazard".to_owned();
    }

    let mut formatted = String::with_capacity(hazard_type.len());
    let mut start_of_word = true;
    for c in hazard_type.chars() {
        let c = if c == '_' { ' ' } else { c };

        if start_of_word && c.is_alphanumeric() {
            formatted.extend(c.to_uppercase());
        } else {
            formatted.push(c);
        }

        start_of_word = !(c.is_alphanumeric() || c == '\'');
    }

    formatted
}

/// A list of reports and how many records were dropped while loading them.
#[derive(Debug, Clone, Default)]
pub struct ReportList {
    reports: Vec<Report>,
    skipped: usize,
}

impl ReportList {
    /// Parse the reports endpoint response.
    ///
    /// Both the `{ "reports": [...] }` envelope and a bare array are accepted. Malformed records
    /// are skipped with a warning and counted, see [ReportList::skipped].
    pub fn from_json_str(json: &str) -> HotspotResult<Self> {
        let doc: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(doc)
    }

    /// Parse the reports endpoint response from a reader.
    pub fn from_json_reader<R: Read>(reader: R) -> HotspotResult<Self> {
        let doc: serde_json::Value = serde_json::from_reader(reader)?;
        Self::from_json_value(doc)
    }

    /// Parse a file saved from the reports endpoint.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> HotspotResult<Self> {
        let f = BufReader::new(File::open(path)?);
        Self::from_json_reader(f)
    }

    fn from_json_value(doc: serde_json::Value) -> HotspotResult<Self> {
        use serde_json::Value;

        let records = match doc {
            Value::Array(records) => records,
            Value::Object(mut map) => match map.remove("reports") {
                Some(Value::Array(records)) => records,
                _ => {
                    return Err(ReportError {
                        msg: "response object has no 'reports' array",
                    }
                    .into())
                }
            },
            _ => {
                return Err(ReportError {
                    msg: "expected a reports object or an array of reports",
                }
                .into())
            }
        };

        let mut list = ReportList {
            reports: Vec::with_capacity(records.len()),
            skipped: 0,
        };

        for (index, record) in records.into_iter().enumerate() {
            match RawReport::decode(record) {
                Ok(report) => list.reports.push(report),
                Err(reason) => {
                    log::warn!("skipping report at index {}: {}", index, reason);
                    list.skipped += 1;
                }
            }
        }

        Ok(list)
    }

    pub(crate) fn with_skipped(reports: Vec<Report>, skipped: usize) -> Self {
        ReportList { reports, skipped }
    }

    /// The number of records that could not be used.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn into_vec(self) -> Vec<Report> {
        self.reports
    }

    /// Keep only the reports inside the box and created in `[start, end)`.
    pub fn retain_within(&mut self, start: DateTime<Utc>, end: DateTime<Utc>, area: BoundingBox) {
        self.reports.retain(|report| {
            report.created_at >= start && report.created_at < end && area.contains(report.location)
        });
    }

    /// Drop reports that aren't newer than `cutoff`.
    pub fn retain_newer_than(&mut self, cutoff: DateTime<Utc>) {
        self.reports.retain(|report| report.created_at > cutoff);
    }
}

impl From<Vec<Report>> for ReportList {
    fn from(reports: Vec<Report>) -> Self {
        ReportList {
            reports,
            skipped: 0,
        }
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                   Backend record decoding
 *-----------------------------------------------------------------------------------------------*/
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReport {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default)]
    location: Option<RawLocation>,
    #[serde(default)]
    hazard_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    media_url: Option<String>,
    #[serde(default)]
    is_verified: Option<bool>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    coordinates: Vec<f64>,
}

impl RawReport {
    fn decode(record: serde_json::Value) -> Result<Report, String> {
        let raw: RawReport = serde_json::from_value(record).map_err(|err| err.to_string())?;

        let location = match raw.location {
            Some(loc) => loc,
            None => return Err(format!("report {} has no location", raw.id)),
        };

        if let Some(kind) = location.kind.as_deref() {
            if kind != "Point" {
                return Err(format!(
                    "report {} has a {} location, expected Point",
                    raw.id, kind
                ));
            }
        }

        let location = match location.coordinates[..] {
            [lon, lat] => Coord::from_lon_lat(lon, lat),
            _ => {
                return Err(format!(
                    "report {} has {} coordinates, expected [lon, lat]",
                    raw.id,
                    location.coordinates.len()
                ))
            }
        };

        if !location.is_valid() {
            return Err(format!(
                "report {} is off the map at lat={} lon={}",
                raw.id, location.lat, location.lon
            ));
        }

        Ok(Report {
            id: raw.id,
            location,
            hazard_type: raw.hazard_type.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            media_url: raw.media_url.filter(|url| !url.is_empty()),
            is_verified: raw.is_verified.unwrap_or(false),
            source: raw
                .source
                .as_deref()
                .map(ReportSource::from_name)
                .unwrap_or(ReportSource::Other),
            created_at: raw.created_at.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    const RESPONSE: &str = r#"{
        "reports": [
            {
                "_id": "a1",
                "hazardType": "oil_spill",
                "description": "Sheen near the harbor mouth",
                "mediaUrl": "https://media.example/a1.jpg",
                "isVerified": true,
                "source": "user",
                "createdAt": "2025-09-20T10:15:00.000Z",
                "location": { "type": "Point", "coordinates": [80.29, 13.08] }
            },
            {
                "_id": "a2",
                "hazardType": "storm_surge",
                "source": "social_media",
                "createdAt": "2025-09-21T06:00:00Z",
                "location": { "type": "Point", "coordinates": [72.87, 19.07] }
            },
            {
                "_id": "no-location",
                "hazardType": "shipwreck"
            },
            {
                "_id": "short",
                "location": { "type": "Point", "coordinates": [72.87] }
            },
            {
                "_id": "off-map",
                "location": { "type": "Point", "coordinates": [13.08, 95.0] }
            },
            {
                "_id": "polygon",
                "location": { "type": "Polygon", "coordinates": [1.0, 2.0] }
            },
            {
                "_id": "bad-coord",
                "location": { "type": "Point", "coordinates": ["east", 2.0] }
            },
            "not even an object"
        ]
    }"#;

    #[test]
    fn test_parse_filters_malformed_records() {
        let list = ReportList::from_json_str(RESPONSE).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.skipped(), 6);

        let first = &list.reports()[0];
        assert_eq!(first.id, "a1");
        assert!(first.location.is_close(Coord { lat: 13.08, lon: 80.29 }, 1.0e-12));
        assert_eq!(first.hazard_type, "oil_spill");
        assert_eq!(first.media_url.as_deref(), Some("https://media.example/a1.jpg"));
        assert!(first.is_verified);
        assert_eq!(first.source, ReportSource::User);
        assert_eq!(
            first.created_at,
            Utc.with_ymd_and_hms(2025, 9, 20, 10, 15, 0).unwrap()
        );

        let second = &list.reports()[1];
        assert_eq!(second.id, "a2");
        assert_eq!(second.source, ReportSource::SocialMedia);
        assert!(!second.is_verified);
        assert_eq!(second.description, "");
        assert_eq!(second.media_url, None);
    }

    #[test]
    fn test_parse_bare_array_and_defaults() {
        let json = r#"[{"id": "x", "location": {"coordinates": [0.5, -0.25]}}]"#;
        let list = ReportList::from_json_str(json).unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list.skipped(), 0);

        let report = &list.reports()[0];
        assert_eq!(report.id, "x");
        assert_eq!(report.location, Coord { lat: -0.25, lon: 0.5 });
        assert_eq!(report.source, ReportSource::Other);
        assert_eq!(report.created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_new_matches_decoded_defaults() {
        let json = r#"[{"id": "x", "location": {"coordinates": [0.5, -0.25]}}]"#;
        let list = ReportList::from_json_str(json).unwrap();
        let decoded = &list.reports()[0];

        let built = Report::new("x", Coord { lat: -0.25, lon: 0.5 });
        assert_eq!(built.source, decoded.source);
        assert_eq!(built.is_verified, decoded.is_verified);
        assert_eq!(built.media_url, decoded.media_url);
        assert_eq!(built.created_at, decoded.created_at);
    }

    #[test]
    fn test_parse_rejects_unusable_documents() {
        assert!(ReportList::from_json_str("not json").is_err());
        assert!(ReportList::from_json_str(r#"{"data": []}"#).is_err());
        assert!(ReportList::from_json_str("42").is_err());

        let empty = ReportList::from_json_str(r#"{"reports": []}"#).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_report_source_names() {
        assert_eq!(ReportSource::from_name("user"), ReportSource::User);
        assert_eq!(ReportSource::from_name("social_media"), ReportSource::SocialMedia);
        assert_eq!(ReportSource::from_name("satellite"), ReportSource::Other);
        assert_eq!(ReportSource::SocialMedia.name(), "social_media");
    }

    #[test]
    fn test_display_hazard_type() {
        assert_eq!(display_hazard_type("oil_spill"), "Oil Spill");
        assert_eq!(
            display_hazard_type("harmful_algal_bloom_(red_tide)"),
            "Harmful Algal Bloom (Red Tide)"
        );
        assert_eq!(
            display_hazard_type("plastic_/_marine_debris"),
            "Plastic / Marine Debris"
        );
        assert_eq!(display_hazard_type(""), "Unknown Hazard");
    }

    #[test]
    fn test_retain_within() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        let mut inside = Report::new("inside", Coord { lat: 10.0, lon: 75.0 });
        inside.created_at = t0;
        let mut too_late = Report::new("late", Coord { lat: 10.0, lon: 75.0 });
        too_late.created_at = t1;
        let mut outside = Report::new("outside", Coord { lat: 30.0, lon: 75.0 });
        outside.created_at = t0;

        let mut list = ReportList::from(vec![inside, too_late, outside]);
        let area: BoundingBox = "5,70,20,90".parse().unwrap();
        list.retain_within(t0, t1, area);

        assert_eq!(list.len(), 1);
        assert_eq!(list.reports()[0].id, "inside");
    }
}
