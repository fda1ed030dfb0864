//! CORS layer configuration.

use tower_http::cors::CorsLayer;

use reliefhub_core::config::ServerConfig;

/// Builds the CORS layer: permissive when configured, otherwise a layer that
/// grants no cross-origin access.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.permissive_cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}
