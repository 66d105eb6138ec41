//! HTTP request handlers

pub mod channels;
pub mod epg;
pub mod health;
pub mod stream;
