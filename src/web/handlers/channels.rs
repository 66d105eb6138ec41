//! Channel listing endpoints

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use tracing::debug;

use crate::models::{DisplayItem, Region};
use crate::proxy::{OutputFormat, RenderedDocument, ResponseFormatter};
use crate::web::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChannelListQuery {
    pub format: Option<String>,
}

/// `GET /channels`: listing for the default region
pub async fn list_default_channels(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ChannelListQuery>,
) -> RenderedDocument {
    let region = Region::new(&state.config.catalog.default_region);
    render_listing(&state, &headers, &region, query.format.as_deref())
}

/// `GET /channels/{region}`
pub async fn list_region_channels(
    State(state): State<AppState>,
    Path(region): Path<String>,
    headers: HeaderMap,
    Query(query): Query<ChannelListQuery>,
) -> RenderedDocument {
    render_listing(&state, &headers, &Region::new(region), query.format.as_deref())
}

fn render_listing(
    state: &AppState,
    headers: &HeaderMap,
    region: &Region,
    format: Option<&str>,
) -> RenderedDocument {
    let format = OutputFormat::from_query(format);
    let base_url = state.base_url(headers);

    let items: Vec<DisplayItem> = state
        .catalog
        .filter(region)
        .map(|channel| DisplayItem::from_channel(channel, &base_url))
        .collect();

    debug!(region = %region, format = %format, channels = items.len(), "Rendering channel listing");
    ResponseFormatter::render(&items, format)
}
