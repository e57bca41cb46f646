//! Persisted incident and media models.
//!
//! These models represent rows as stored by the persistence backend.
//! Raw coordinates never appear here; only rounded ones.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::RoundedCoordinates;

/// Incident category, fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentCategory {
    Propaganda,
    Threat,
    Violence,
    Online,
    Event,
    Other,
}

impl IncidentCategory {
    pub const ALL: [IncidentCategory; 6] = [
        IncidentCategory::Propaganda,
        IncidentCategory::Threat,
        IncidentCategory::Violence,
        IncidentCategory::Online,
        IncidentCategory::Event,
        IncidentCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentCategory::Propaganda => "propaganda",
            IncidentCategory::Threat => "threat",
            IncidentCategory::Violence => "violence",
            IncidentCategory::Online => "online",
            IncidentCategory::Event => "event",
            IncidentCategory::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IncidentCategory::Propaganda => "Propaganda Symbolik",
            IncidentCategory::Threat => "Bedrohung Belästigung",
            IncidentCategory::Violence => "Gewalt Sachbeschädigung",
            IncidentCategory::Online => "Online Hetze",
            IncidentCategory::Event => "Veranstaltung Aufmarsch",
            IncidentCategory::Other => "Sonstiges",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            IncidentCategory::Propaganda => "Propaganda",
            IncidentCategory::Threat => "Bedrohung",
            IncidentCategory::Violence => "Gewalt",
            IncidentCategory::Online => "Online",
            IncidentCategory::Event => "Veranstaltung",
            IncidentCategory::Other => "Sonstiges",
        }
    }
}

impl FromStr for IncidentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Moderation status of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Pending,
    Approved,
    Rejected,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::Approved => "approved",
            IncidentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(IncidentStatus::Pending),
            "approved" => Ok(IncidentStatus::Approved),
            "rejected" => Ok(IncidentStatus::Rejected),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Kind of attached media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaKind::Image => "image/jpeg",
            MediaKind::Video => "video/mp4",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(MediaKind::Image),
            "video/mp4" => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// User-facing noun.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "Foto",
            MediaKind::Video => "Video",
        }
    }
}

/// Storage path for a new media object: `<incident_id>/<uuid>.<ext>`.
pub fn media_storage_path(incident_id: &str, kind: MediaKind) -> String {
    format!("{}/{}.{}", incident_id, Uuid::new_v4(), kind.extension())
}

/// Creation request for an incident row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncident {
    pub category: IncidentCategory,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub precision_m: u32,
    pub region_text: Option<String>,
    pub status: IncidentStatus,
}

impl NewIncident {
    /// A pending incident at rounded coordinates. The description is trimmed.
    pub fn pending(
        category: IncidentCategory,
        description: &str,
        occurred_at: DateTime<Utc>,
        rounded: RoundedCoordinates,
        precision_m: u32,
    ) -> Self {
        Self {
            category,
            description: description.trim().to_string(),
            occurred_at,
            lat: rounded.lat,
            lon: rounded.lon,
            precision_m,
            region_text: None,
            status: IncidentStatus::Pending,
        }
    }
}

/// Persisted incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub category: IncidentCategory,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub precision_m: u32,
    pub region_text: Option<String>,
    pub status: IncidentStatus,
}

/// Persisted media row. Owned by exactly one incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub incident_id: String,
    pub kind: MediaKind,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

/// Approved incident with its media, for detail views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentWithMedia {
    #[serde(flatten)]
    pub incident: Incident,
    pub media: Vec<Media>,
}

/// Geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub sw_lat: f64,
    pub sw_lon: f64,
    pub ne_lat: f64,
    pub ne_lon: f64,
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.sw_lat && lat <= self.ne_lat && lon >= self.sw_lon && lon <= self.ne_lon
    }
}

/// Filters for the approved-incident listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentFilters {
    pub category: Option<IncidentCategory>,
    pub occurred_after: Option<DateTime<Utc>>,
    pub bbox: Option<BoundingBox>,
}

impl IncidentFilters {
    pub fn matches(&self, incident: &Incident) -> bool {
        if let Some(category) = self.category {
            if incident.category != category {
                return false;
            }
        }
        if let Some(after) = self.occurred_after {
            if incident.occurred_at < after {
                return false;
            }
        }
        if let Some(bbox) = &self.bbox {
            if !bbox.contains(incident.lat, incident.lon) {
                return false;
            }
        }
        true
    }
}

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Zero-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size: page_size.max(1),
        }
    }

    /// Rows to skip. Saturates for page numbers past the addressable range.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}
