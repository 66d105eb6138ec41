//! Regional IPTV channel guide
//!
//! Serves channel playlists, XMLTV guides and on-demand stream redirects for
//! a static catalog of channels.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod models;
pub mod proxy;
pub mod sources;
pub mod utils;
pub mod web;
