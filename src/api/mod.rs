// SPDX-License-Identifier: AGPL-3.0-or-later

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{identity::TokenRepresentation, state::AppState};

pub mod filter;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new().route("/catalog/filter", post(filter::filter_catalog));

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::live))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(filter::filter_catalog, health::health, health::live),
    components(
        schemas(
            filter::FilterRequest,
            TokenRepresentation,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Catalog", description = "Credential-gated federated catalog filtering"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
