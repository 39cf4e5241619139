use axum::routing::get;
use axum::Router;

use crate::handlers::content;
use crate::state::AppState;

/// Content routes mounted at `/content`.
///
/// ```text
/// GET   /?slug=  -> get_content
/// PATCH /?slug=  -> update_content
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(content::get_content).patch(content::update_content),
    )
}
