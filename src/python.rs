//! PyO3 host module.
//!
//! Exposes the pure parts of the core (rounding, PII screen, cooldown,
//! query building) to a host runtime that owns UI and network calls.

use std::path::PathBuf;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::cooldown::{FileSecureStore, SubmissionCooldownGuard};
use crate::feed::{FeedFilters, TimeRange};
use crate::geo::round_coordinates as round_coords;
use crate::logging::init_logger;
use crate::security::validate_description as validate_text;
use crate::storage::models::{IncidentCategory, Pagination};
use crate::storage::queries::build_approved_list;

/// Round a coordinate to the privacy grid.
///
/// Returns (lat, lon). Raises ValueError for non-finite or out-of-range
/// input.
#[pyfunction]
fn round_coordinates(lat: f64, lon: f64, precision_m: f64) -> PyResult<(f64, f64)> {
    round_coords(lat, lon, precision_m)
        .map(|r| (r.lat, r.lon))
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Screen a description.
///
/// Returns (valid, reason_code, user_message).
#[pyfunction]
fn validate_description(text: &str) -> (bool, Option<String>, Option<String>) {
    let check = validate_text(text);
    (
        check.valid,
        check.reason.map(|r| r.code().to_string()),
        check.reason.map(|r| r.user_message().to_string()),
    )
}

/// Check the device cooldown stored under `storage_dir`.
///
/// Returns (allowed, retry_after_secs).
#[pyfunction]
fn can_submit(storage_dir: String) -> (bool, Option<u64>) {
    init_logger();
    let guard = SubmissionCooldownGuard::new(FileSecureStore::new(PathBuf::from(storage_dir)));
    let decision = guard.can_submit();
    (decision.allowed, decision.retry_after_secs)
}

/// Record a successful submission in the device cooldown history.
#[pyfunction]
fn record_submission(storage_dir: String) {
    init_logger();
    SubmissionCooldownGuard::new(FileSecureStore::new(PathBuf::from(storage_dir)))
        .record_submission();
}

/// Build the approved-incident listing query.
///
/// Returns a dict with `sql` and `params` (JSON-encoded list).
#[pyfunction]
#[pyo3(signature = (category=None, time_range=None, page=0, page_size=20))]
fn approved_incidents_query(
    py: Python<'_>,
    category: Option<String>,
    time_range: Option<String>,
    page: usize,
    page_size: usize,
) -> PyResult<Py<PyAny>> {
    let category = category
        .map(|c| c.parse::<IncidentCategory>())
        .transpose()
        .map_err(PyValueError::new_err)?;
    let time_range = time_range
        .map(|t| serde_json::from_value::<TimeRange>(serde_json::Value::String(t)))
        .transpose()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let filters = FeedFilters {
        category,
        time_range,
    };
    let query = build_approved_list(
        &filters.to_query(None, chrono::Utc::now()),
        Pagination::new(page, page_size),
    );

    let params =
        serde_json::to_string(&query.params).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let result = PyDict::new(py);
    result.set_item("sql", query.sql)?;
    result.set_item("params", params)?;
    Ok(result.into())
}

/// Python module definition
#[pymodule]
fn reportguard_core(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(round_coordinates, m)?)?;
    m.add_function(wrap_pyfunction!(validate_description, m)?)?;
    m.add_function(wrap_pyfunction!(can_submit, m)?)?;
    m.add_function(wrap_pyfunction!(record_submission, m)?)?;
    m.add_function(wrap_pyfunction!(approved_incidents_query, m)?)?;
    Ok(())
}
