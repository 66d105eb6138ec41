//! XMLTV guide endpoints

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::models::Region;
use crate::proxy::RenderedDocument;
use crate::web::{AppState, cache::CacheTtl};

pub const XMLTV_CONTENT_TYPE: &str = "text/xml";

/// `GET /epg`: guide for the default region
pub async fn default_guide(State(state): State<AppState>) -> Response {
    let region = Region::new(&state.config.catalog.default_region);
    build_guide(&state, &region).await
}

/// `GET /epg/{region}`
pub async fn region_guide(State(state): State<AppState>, Path(region): Path<String>) -> Response {
    build_guide(&state, &Region::new(region)).await
}

/// A guide with missing programme data is served but cached only for
/// `cache.degraded_epg_ttl`, so it is rebuilt soon after upstream recovers.
async fn build_guide(state: &AppState, region: &Region) -> Response {
    let guide = state.epg.build_guide(state.catalog.filter(region)).await;
    let degraded = guide.is_degraded();

    let document = RenderedDocument {
        content_type: XMLTV_CONTENT_TYPE,
        body: guide.body,
    };

    if degraded {
        warn!(
            region = %region,
            fetched = guide.fetched,
            failed = guide.failed,
            "Serving guide with missing programme data"
        );
        (Extension(CacheTtl(state.config.cache.degraded_epg_ttl)), document).into_response()
    } else {
        document.into_response()
    }
}
