//! Document generation: playlists, listings and XMLTV guides

pub mod epg_generator;
pub mod generator;

pub use epg_generator::{EpgAggregator, GuideDocument};
pub use generator::{OutputFormat, RenderedDocument, ResponseFormatter};
