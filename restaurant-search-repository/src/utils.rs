//! Utility functions for the restaurant search repository.

use restaurant_search_shared::Restaurant;
use serde_json::Value;
use tracing::warn;

/// Restaurants recovered from raw hits, plus how many hits could not be decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedHits {
    pub restaurants: Vec<Restaurant>,
    pub skipped: usize,
}

/// Decode raw `_source` payloads into restaurants, preserving their order.
///
/// A hit that does not decode is logged and skipped. A single malformed stored
/// document does not fail the search; the count is reported in `skipped`.
///
/// # Example
///
/// ```
/// use restaurant_search_repository::decode_hits;
/// use serde_json::json;
///
/// let decoded = decode_hits(vec![json!({ "id": "r1" }), json!({ "price": "cheap" })]);
/// assert_eq!(decoded.restaurants.len(), 1);
/// assert_eq!(decoded.skipped, 1);
/// ```
pub fn decode_hits(sources: Vec<Value>) -> DecodedHits {
    let mut decoded = DecodedHits {
        restaurants: Vec::with_capacity(sources.len()),
        skipped: 0,
    };

    for (position, source) in sources.into_iter().enumerate() {
        let id = source
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);

        match serde_json::from_value::<Restaurant>(source) {
            Ok(restaurant) => decoded.restaurants.push(restaurant),
            Err(e) => {
                warn!(
                    position = position,
                    id = ?id,
                    error = %e,
                    "Skipping search hit that failed to decode"
                );
                decoded.skipped += 1;
            }
        }
    }

    decoded
}
