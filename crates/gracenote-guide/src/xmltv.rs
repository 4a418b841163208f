//! XMLTV document model and writer.
//!
//! Serialized with `quick_xml::se`. Field order is document order, so all
//! `channel` elements are written before any `programme` element.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Generator name written on the root element.
pub const GENERATOR_NAME: &str = "gracenote-xmltv";

/// Generator URL written on the root element.
pub const GENERATOR_URL: &str = "https://github.com/SolidElectronics/gracenote-xmltv.git";

/// XML declaration prepended to every document.
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Root `tv` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "tv")]
pub struct Tv {
    /// `generator-info-name` attribute.
    #[serde(rename = "@generator-info-name")]
    pub generator_info_name: String,
    /// `generator-info-url` attribute.
    #[serde(rename = "@generator-info-url")]
    pub generator_info_url: String,
    /// Channel elements, in first-seen order.
    #[serde(rename = "channel")]
    pub channels: Vec<XmltvChannel>,
    /// Programme elements, in grid order.
    #[serde(rename = "programme")]
    pub programmes: Vec<Programme>,
}

impl Default for Tv {
    fn default() -> Self {
        Self {
            generator_info_name: String::from(GENERATOR_NAME),
            generator_info_url: String::from(GENERATOR_URL),
            channels: Vec::new(),
            programmes: Vec::new(),
        }
    }
}

/// `channel` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct XmltvChannel {
    /// `id` attribute, referenced by `programme/@channel`.
    #[serde(rename = "@id")]
    pub id: String,
    /// `display-name` child.
    #[serde(rename = "display-name")]
    pub display_name: String,
    /// Optional `icon` child.
    #[serde(rename = "icon", skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

/// `icon` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Icon {
    /// `src` attribute.
    #[serde(rename = "@src")]
    pub src: String,
}

/// `programme` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Programme {
    /// `start` attribute (`YYYYMMDDHHMMSS`, UTC).
    #[serde(rename = "@start")]
    pub start: String,
    /// `stop` attribute (`YYYYMMDDHHMMSS`, UTC).
    #[serde(rename = "@stop")]
    pub stop: String,
    /// `channel` attribute.
    #[serde(rename = "@channel")]
    pub channel: String,
    /// `title` child.
    pub title: String,
    /// Optional `sub-title` child.
    #[serde(rename = "sub-title", skip_serializing_if = "Option::is_none")]
    pub sub_title: Option<String>,
    /// Optional `desc` child.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Optional `episode-num` child.
    #[serde(rename = "episode-num", skip_serializing_if = "Option::is_none")]
    pub episode_num: Option<EpisodeNum>,
}

/// `episode-num` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeNum {
    /// `system` attribute (`xmltv_ns` or `dd_progid`).
    #[serde(rename = "@system")]
    pub system: String,
    /// Episode number text.
    #[serde(rename = "$text")]
    pub value: String,
}

impl EpisodeNum {
    /// Creates an `episode-num` element.
    #[must_use]
    pub fn new(system: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            value: value.into(),
        }
    }
}

impl Tv {
    /// Serializes the document, XML declaration included.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 2);
        self.serialize(serializer)
            .context("failed to serialize XMLTV document")?;

        let mut xml = String::with_capacity(
            XML_DECLARATION
                .len()
                .saturating_add(body.len())
                .saturating_add(2),
        );
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        xml.push_str(&body);
        xml.push('\n');
        Ok(xml)
    }

    /// Writes the document to `path`, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, directory creation or the write fails.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let xml = self.to_xml_string()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        std::fs::write(path, xml).with_context(|| format!("failed to write {}", path.display()))
    }
}
