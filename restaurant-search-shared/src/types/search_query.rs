//! Search query types for the restaurant search.
//!
//! This module defines the query parameters accepted by the geo-search endpoint.

use serde::{Deserialize, Serialize};

/// A query location, kept as the raw strings the caller sent.
///
/// No numeric parsing happens here. The engine is the one that accepts or
/// rejects the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoPoint {
    pub lat: String,
    pub lng: String,
}

impl GeoPoint {
    /// Create a new point from latitude and longitude strings.
    pub fn new(lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lng: lng.into(),
        }
    }
}

/// Geo-search query parameters.
///
/// Deserializes directly from the `?q=&lat=&lng=` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeoSearchQuery {
    /// Free-text search term, matched against `name` and `tags`.
    /// May be empty.
    #[serde(default)]
    pub q: String,

    /// Latitude of the delivery point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,

    /// Longitude of the delivery point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<String>,
}

impl GeoSearchQuery {
    /// Create a new query for the given term and location.
    ///
    /// # Example
    ///
    /// ```
    /// use restaurant_search_shared::GeoSearchQuery;
    ///
    /// let query = GeoSearchQuery::new("pizza", "0.5", "0.5");
    /// assert!(query.location().is_some());
    /// ```
    pub fn new(q: impl Into<String>, lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            lat: Some(lat.into()),
            lng: Some(lng.into()),
        }
    }

    /// The query location, if both coordinates are present and non-empty.
    pub fn location(&self) -> Option<GeoPoint> {
        let lat = self.lat.as_deref().filter(|s| !s.is_empty())?;
        let lng = self.lng.as_deref().filter(|s| !s.is_empty())?;
        Some(GeoPoint::new(lat, lng))
    }
}
