//! # CORS
//!
//! Browsers may call the service from any origin, with credentials. The
//! request's `Origin` is mirrored back instead of `*`, since a wildcard
//! cannot be combined with `Access-Control-Allow-Credentials`.
//!
//! The layer answers every `OPTIONS` request itself with an empty `200`,
//! so preflights never reach routing or the auth middleware.

use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build the CORS layer applied to every route.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
