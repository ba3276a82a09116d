//! Restaurant document types for the search index.
//!
//! This module defines the document structure that is stored in and returned
//! from the search engine.

use serde::{Deserialize, Deserializer, Serialize};

/// A single `[longitude, latitude]` pair.
pub type Position = [f64; 2];

/// The geometry a restaurant delivers to.
///
/// Mirrors a GeoJSON polygon: `geometry_type` is the polygon-family discriminator
/// (usually `"Polygon"`) and `coordinates` holds the linear rings, outer ring first.
/// The first and last position of each ring are expected to coincide; that is
/// checked by the engine, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeliveryArea {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub geometry_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub coordinates: Vec<Vec<Position>>,
}

impl DeliveryArea {
    /// Create a single-ring polygon area.
    pub fn polygon(ring: Vec<Position>) -> Self {
        Self {
            geometry_type: "Polygon".to_string(),
            coordinates: vec![ring],
        }
    }
}

/// Document representation for the search index.
///
/// The `id` is supplied by the caller and doubles as the engine document key, so
/// indexing the same `id` twice overwrites the earlier document.
///
/// Every field falls back to its default when missing from the payload or
/// explicitly `null`. Decoding only fails on malformed JSON or on a field of
/// the wrong type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Restaurant {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub open: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub food_tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub price: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub rating: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub delivery_area: DeliveryArea,
}

/// Decode `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Restaurant {
    /// Create a restaurant with only the identifying and searchable fields set.
    ///
    /// # Example
    ///
    /// ```
    /// use restaurant_search_shared::{DeliveryArea, Restaurant};
    ///
    /// let area = DeliveryArea::polygon(vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]]);
    /// let restaurant = Restaurant::new("r1", "Pizza Place", area);
    /// assert_eq!(restaurant.id, "r1");
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>, delivery_area: DeliveryArea) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            delivery_area,
            ..Default::default()
        }
    }

    /// Set the searchable tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}
