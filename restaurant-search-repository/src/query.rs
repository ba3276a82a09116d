//! Structured query DSL for restaurant searches.
//!
//! Queries are built as a typed tree and serialized with serde. Caller-supplied
//! text only ever ends up as a JSON string or number value, never spliced into
//! the query structure itself.
//!
//! A geo-text query serializes to:
//!
//! ```json
//! {"bool": {
//!    "must":   [{"multi_match": {"query": "...", "fields": ["name", "tags"]}}],
//!    "filter": [{"geo_shape": {"delivery_area": {
//!                  "shape": {"type": "point", "coordinates": [<lng>, <lat>]},
//!                  "relation": "intersects"}}}]}}
//! ```
//!
//! An empty term analyzes to no tokens, which the engine matches against
//! nothing, so an empty `q` yields no hits.

use restaurant_search_shared::GeoPoint;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Fields the free-text term is matched against.
pub const TEXT_SEARCH_FIELDS: [&str; 2] = ["name", "tags"];

/// The geo-shape field holding each restaurant's delivery coverage.
pub const DELIVERY_AREA_FIELD: &str = "delivery_area";

/// Top-level compound query: `{"bool": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantQuery {
    #[serde(rename = "bool")]
    pub compound: BoolQuery,
}

/// Boolean query. `must` clauses score, `filter` clauses only include or exclude.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<QueryClause>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<QueryClause>,
}

/// A single leaf clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryClause {
    MultiMatch(MultiMatchQuery),
    GeoShape(GeoShapeQuery),
}

/// Relevance-scoring text match over several fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    pub fields: Vec<String>,
}

/// Spatial relation between the query shape and the stored geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialRelation {
    Intersects,
}

/// A point shape, serialized GeoJSON-style as `[lng, lat]`.
///
/// No validation happens here. A coordinate that parses as a finite number
/// goes out as a JSON number; anything else goes out as the raw string so the
/// engine rejects the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointShape {
    pub point: GeoPoint,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Coordinate<'a> {
    Number(f64),
    Raw(&'a str),
}

impl<'a> Coordinate<'a> {
    fn from_raw(raw: &'a str) -> Self {
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Number(value),
            _ => Self::Raw(raw),
        }
    }
}

impl Serialize for PointShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let coordinates = [
            Coordinate::from_raw(&self.point.lng),
            Coordinate::from_raw(&self.point.lat),
        ];

        let mut state = serializer.serialize_struct("PointShape", 2)?;
        state.serialize_field("type", "point")?;
        state.serialize_field("coordinates", &coordinates)?;
        state.end()
    }
}

/// Non-scoring geo-shape clause against a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoShapeQuery {
    pub field: String,
    pub shape: PointShape,
    pub relation: SpatialRelation,
}

#[derive(Serialize)]
struct GeoShapeBody<'a> {
    shape: &'a PointShape,
    relation: SpatialRelation,
}

impl Serialize for GeoShapeQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &self.field,
            &GeoShapeBody {
                shape: &self.shape,
                relation: self.relation,
            },
        )?;
        map.end()
    }
}

impl RestaurantQuery {
    /// Text match on `name`/`tags` restricted to restaurants delivering to `point`.
    ///
    /// An empty term matches no restaurant.
    pub fn geo_text(term: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            compound: BoolQuery {
                must: vec![QueryClause::MultiMatch(MultiMatchQuery {
                    query: term.into(),
                    fields: TEXT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
                })],
                filter: vec![QueryClause::GeoShape(GeoShapeQuery {
                    field: DELIVERY_AREA_FIELD.to_string(),
                    shape: PointShape { point },
                    relation: SpatialRelation::Intersects,
                })],
            },
        }
    }

    /// The text term of the first `multi_match` clause.
    pub fn text_term(&self) -> Option<&str> {
        self.compound.must.iter().find_map(|clause| match clause {
            QueryClause::MultiMatch(m) => Some(m.query.as_str()),
            _ => None,
        })
    }

    /// The point of the first `geo_shape` filter.
    pub fn intersect_point(&self) -> Option<&GeoPoint> {
        self.compound.filter.iter().find_map(|clause| match clause {
            QueryClause::GeoShape(g) => Some(&g.shape.point),
            _ => None,
        })
    }
}

/// Body of a `_search` request.
#[derive(Debug, Serialize)]
pub struct SearchRequestBody<'a> {
    pub size: usize,
    pub query: &'a RestaurantQuery,
}
