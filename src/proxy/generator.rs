//! Playlist and listing rendering
//!
//! Pure formatting of [`DisplayItem`]s into the documents served from
//! `/channels`: an extended M3U playlist, a bare HTML link list, or a plain
//! "Unknown Format" notice for anything else.

use quick_xml::escape::escape;
use strum::{Display, EnumString};

use crate::models::DisplayItem;

pub const M3U_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
pub const HTML_CONTENT_TYPE: &str = "text/html";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

pub const UNKNOWN_FORMAT_BODY: &str = "Unknown Format";

/// Output selected by the `format` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    M3u8,
    Html,
    Unknown,
}

impl OutputFormat {
    /// Missing means m3u8; unrecognised values map to [`OutputFormat::Unknown`]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            None => Self::M3u8,
            Some(value) => value.parse().unwrap_or(Self::Unknown),
        }
    }
}

/// A rendered document and the content type it is served with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub content_type: &'static str,
    pub body: String,
}

pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn render(items: &[DisplayItem], format: OutputFormat) -> RenderedDocument {
        match format {
            OutputFormat::M3u8 => RenderedDocument {
                content_type: M3U_CONTENT_TYPE,
                body: Self::render_m3u8(items),
            },
            OutputFormat::Html => RenderedDocument {
                content_type: HTML_CONTENT_TYPE,
                body: Self::render_html(items),
            },
            OutputFormat::Unknown => RenderedDocument {
                content_type: TEXT_CONTENT_TYPE,
                body: UNKNOWN_FORMAT_BODY.to_string(),
            },
        }
    }

    pub fn render_m3u8(items: &[DisplayItem]) -> String {
        let mut lines = Vec::with_capacity(items.len() + 1);
        lines.push("#EXTM3U".to_string());

        for item in items {
            lines.push(format!(
                "#EXTINF:-1 tvg-id=\"{}\" tvg-logo=\"{}\", {}\n{}",
                item.channel_id, item.logo, item.name, item.url
            ));
        }

        lines.join("\n")
    }

    pub fn render_html(items: &[DisplayItem]) -> String {
        let mut lines = vec![
            "<!DOCTYPE html>".to_string(),
            "<html>".to_string(),
            "<head>".to_string(),
            "<title>Channel List</title>".to_string(),
            "</head>".to_string(),
            "<body>".to_string(),
            "<ul>".to_string(),
        ];

        for item in items {
            lines.push(format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape(item.url.as_str()),
                escape(item.name.as_str())
            ));
        }

        lines.extend(["</ul>", "</body>", "</html>"].map(String::from));
        lines.join("\n")
    }
}
