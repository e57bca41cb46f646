//! Public incident feed.
//!
//! Read path for end users: approved incidents only, filtered by a
//! session-scoped [`FeedFilters`] value, paged, plus signed URLs for the
//! private media bucket.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::BackendError;
use crate::storage::backend::IncidentBackend;
use crate::storage::models::{
    BoundingBox, Incident, IncidentCategory, IncidentFilters, IncidentWithMedia, Pagination,
    DEFAULT_PAGE_SIZE,
};

/// Default lifetime of a signed media URL.
pub const DEFAULT_MEDIA_URL_EXPIRY_SECS: u64 = 3600;

/// Relative time window offered in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "30days")]
    Last30Days,
}

impl TimeRange {
    /// Earliest `occurred_at` included. "Today" starts at UTC midnight.
    pub fn occurred_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeRange::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc())
                .unwrap_or(now),
            TimeRange::Last7Days => now - Duration::days(7),
            TimeRange::Last30Days => now - Duration::days(30),
        }
    }
}

/// Filter state owned by one browsing session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedFilters {
    pub category: Option<IncidentCategory>,
    pub time_range: Option<TimeRange>,
}

impl FeedFilters {
    pub fn set_category(&mut self, category: Option<IncidentCategory>) {
        self.category = category;
    }

    pub fn set_time_range(&mut self, time_range: Option<TimeRange>) {
        self.time_range = time_range;
    }

    /// Backend filters as of `now`, optionally limited to a map viewport.
    pub fn to_query(&self, bbox: Option<BoundingBox>, now: DateTime<Utc>) -> IncidentFilters {
        IncidentFilters {
            category: self.category,
            occurred_after: self.time_range.map(|r| r.occurred_after(now)),
            bbox,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

/// End-user read access over a backend.
pub struct IncidentFeed<B> {
    backend: B,
    page_size: usize,
    media_url_expiry_secs: u64,
}

impl<B: IncidentBackend> IncidentFeed<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            page_size: DEFAULT_PAGE_SIZE,
            media_url_expiry_secs: DEFAULT_MEDIA_URL_EXPIRY_SECS,
        }
    }

    pub fn from_config(backend: B, config: &Config) -> Self {
        Self {
            backend,
            page_size: config.page_size.max(1),
            media_url_expiry_secs: config.media_url_expiry_secs,
        }
    }

    /// Approved incidents for `page`, newest first. `has_more` is set when
    /// the page came back full.
    pub fn list(
        &self,
        filters: &FeedFilters,
        bbox: Option<BoundingBox>,
        page: usize,
    ) -> Result<Page<Incident>, BackendError> {
        let pagination = Pagination::new(page, self.page_size);
        let items = self
            .backend
            .list_approved_incidents(&filters.to_query(bbox, Utc::now()), pagination)?;
        let has_more = items.len() == pagination.page_size;
        log::debug!(
            "FEED_PAGE page={} returned={} has_more={}",
            page,
            items.len(),
            has_more
        );
        Ok(Page { items, has_more })
    }

    /// An approved incident with media; `None` for pending, rejected or
    /// unknown ids alike.
    pub fn get(&self, id: &str) -> Result<Option<IncidentWithMedia>, BackendError> {
        self.backend.get_approved_incident_by_id(id)
    }

    /// Signed URL for one media object; `None` if the backend refuses.
    pub fn signed_media_url(&self, storage_path: &str) -> Option<String> {
        match self
            .backend
            .signed_media_url(storage_path, self.media_url_expiry_secs)
        {
            Ok(url) => Some(url),
            Err(e) => {
                log::debug!("MEDIA_URL_UNAVAILABLE error={}", e);
                None
            }
        }
    }

    /// Signed URLs keyed by storage path. Paths that fail are left out.
    pub fn signed_media_urls(&self, storage_paths: &[String]) -> HashMap<String, String> {
        storage_paths
            .iter()
            .filter_map(|path| self.signed_media_url(path).map(|url| (path.clone(), url)))
            .collect()
    }
}
