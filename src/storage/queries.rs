//! SQL query builders.
//!
//! Generates parameterised SQL for a relational backend adapter.
//! Actual execution is handled by the host (e.g. a Python or server-side
//! executor); parameters are returned as JSON values in placeholder order.

use serde_json::{json, Value};

use super::models::{IncidentFilters, IncidentStatus, MediaKind, NewIncident, Pagination};

/// Schema-qualified table names.
pub const INCIDENTS_TABLE: &str = "public.incidents";
pub const MEDIA_TABLE: &str = "public.media";

/// A query plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltQuery {
    fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Append a parameter and return its placeholder.
    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }
}

/// Columns written when creating an incident, in placeholder order.
pub fn get_incident_columns() -> Vec<(&'static str, &'static str)> {
    vec![
        ("category", "$1"),
        ("description", "$2"),
        ("occurred_at", "$3"),
        ("lat", "$4"),
        ("lon", "$5"),
        ("precision_m", "$6"),
        ("region_text", "$7"),
        ("status", "$8"),
    ]
}

/// Build INSERT for incidents, returning the assigned id.
pub fn build_incident_insert(incident: &NewIncident) -> BuiltQuery {
    let columns = get_incident_columns();
    let col_names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    let placeholders: Vec<&str> = columns.iter().map(|(_, ph)| *ph).collect();

    BuiltQuery::new(
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
            INCIDENTS_TABLE,
            col_names.join(", "),
            placeholders.join(", ")
        ),
        vec![
            json!(incident.category.as_str()),
            json!(incident.description),
            json!(incident.occurred_at.to_rfc3339()),
            json!(incident.lat),
            json!(incident.lon),
            json!(incident.precision_m),
            json!(incident.region_text),
            json!(incident.status.as_str()),
        ],
    )
}

/// Build INSERT for a media row.
pub fn build_media_insert(incident_id: &str, kind: MediaKind, storage_path: &str) -> BuiltQuery {
    BuiltQuery::new(
        format!(
            "INSERT INTO {} (incident_id, type, url) VALUES ($1, $2, $3)",
            MEDIA_TABLE
        ),
        vec![json!(incident_id), json!(kind.as_str()), json!(storage_path)],
    )
}

/// Build the public listing: approved only, filtered, newest occurrence first.
pub fn build_approved_list(filters: &IncidentFilters, pagination: Pagination) -> BuiltQuery {
    let mut query = BuiltQuery::new(String::new(), Vec::new());
    let mut conditions = vec![format!(
        "status = {}",
        query.bind(json!(IncidentStatus::Approved.as_str()))
    )];

    if let Some(category) = filters.category {
        conditions.push(format!("category = {}", query.bind(json!(category.as_str()))));
    }
    if let Some(after) = filters.occurred_after {
        conditions.push(format!(
            "occurred_at >= {}",
            query.bind(json!(after.to_rfc3339()))
        ));
    }
    if let Some(bbox) = &filters.bbox {
        conditions.push(format!("lat >= {}", query.bind(json!(bbox.sw_lat))));
        conditions.push(format!("lat <= {}", query.bind(json!(bbox.ne_lat))));
        conditions.push(format!("lon >= {}", query.bind(json!(bbox.sw_lon))));
        conditions.push(format!("lon <= {}", query.bind(json!(bbox.ne_lon))));
    }

    let limit = query.bind(json!(pagination.page_size));
    let offset = query.bind(json!(pagination.offset()));

    query.sql = format!(
        "SELECT * FROM {} WHERE {} ORDER BY occurred_at DESC LIMIT {} OFFSET {}",
        INCIDENTS_TABLE,
        conditions.join(" AND "),
        limit,
        offset
    );
    query
}

/// Build the approved-by-id lookup.
pub fn build_approved_by_id(id: &str) -> BuiltQuery {
    BuiltQuery::new(
        format!(
            "SELECT * FROM {} WHERE id = $1 AND status = $2",
            INCIDENTS_TABLE
        ),
        vec![json!(id), json!(IncidentStatus::Approved.as_str())],
    )
}

/// Build the moderation queue: pending only, newest creation first.
pub fn build_pending_list() -> BuiltQuery {
    BuiltQuery::new(
        format!(
            "SELECT * FROM {} WHERE status = $1 ORDER BY created_at DESC",
            INCIDENTS_TABLE
        ),
        vec![json!(IncidentStatus::Pending.as_str())],
    )
}

/// Build the status update. Only pending rows can move.
pub fn build_status_update(id: &str, status: IncidentStatus) -> BuiltQuery {
    BuiltQuery::new(
        format!(
            "UPDATE {} SET status = $1 WHERE id = $2 AND status = $3",
            INCIDENTS_TABLE
        ),
        vec![
            json!(status.as_str()),
            json!(id),
            json!(IncidentStatus::Pending.as_str()),
        ],
    )
}
