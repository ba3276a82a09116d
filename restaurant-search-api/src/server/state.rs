// App state for Axum server
use std::sync::Arc;

use restaurant_search_repository::RestaurantSearchService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RestaurantSearchService>,
}
