//! On-demand stream redirects

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::errors::{AppError, AppResult};
use crate::web::AppState;

/// `GET /channel/{route_name}`: 302 to the channel's current stream URL.
///
/// Unknown routes and pages without a stream are 404; an unreachable
/// intermediary page is 502.
pub async fn redirect_to_stream(
    State(state): State<AppState>,
    Path(route_name): Path<String>,
) -> AppResult<Response> {
    let fetcher = state
        .routes
        .get(&route_name)
        .and_then(|channel| channel.stream_fetcher.as_ref())
        .ok_or_else(|| AppError::not_found("Channel route", route_name.as_str()))?;

    match state.resolver.resolve(fetcher).await {
        Ok(Some(stream_url)) => {
            Ok((StatusCode::FOUND, [(header::LOCATION, stream_url)]).into_response())
        }
        Ok(None) => Err(AppError::StreamUnavailable { route: route_name }),
        Err(e) => Err(AppError::resolution_failure(route_name, e)),
    }
}
