// SPDX-License-Identifier: AGPL-3.0-or-later

use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::ApiError, identity::TokenRepresentation, state::AppState};

/// Body of a catalog filter request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    /// Bearer token carrying the participant's verifiable presentation.
    pub token_representation: Option<TokenRepresentation>,
    /// DID of the requesting participant, used for the self-visibility
    /// override.
    pub participant_did: String,
}

#[utoipa::path(
    post,
    path = "/v1/catalog/filter",
    request_body = FilterRequest,
    tag = "Catalog",
    responses(
        (status = 200, description = "Filtered catalog collection"),
        (status = 204, description = "Nothing visible to this participant"),
        (status = 400, description = "Token representation missing"),
        (status = 401, description = "Token verification failed"),
        (status = 500, description = "Resolution or catalog retrieval failed")
    )
)]
pub async fn filter_catalog(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> Result<Response, ApiError> {
    let Some(token) = request.token_representation else {
        return Err(ApiError::bad_request("token representation is required"));
    };

    let claims = state
        .validator
        .validate(&token)
        .await
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let catalogs = state
        .catalog
        .fetch_and_filter_catalog(&claims, &request.participant_did)
        .await
        .map_err(|e| {
            tracing::error!("catalog filtering failed: {e}");
            ApiError::internal(format!("catalog filtering failed: {e}"))
        })?;

    if catalogs.is_empty() {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok(Json(catalogs).into_response())
    }
}
