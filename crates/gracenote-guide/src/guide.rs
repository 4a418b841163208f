//! Channel and programme mapping from grid blocks to XMLTV elements.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;

use anyhow::Result;
use chrono::{Local, TimeZone};
use gracenote_api::grid::{ChannelBlock, Event};

use crate::series::SeriesMatcher;
use crate::time::{EpisodeEncoding, synthetic_episode_number_in, to_compact_utc, to_display_in};
use crate::xmltv::{EpisodeNum, Icon, Programme, Tv, XmltvChannel};

/// Title used when the grid program has none.
pub const NO_TITLE: &str = "No Title";

/// Display name used when a channel has no call sign.
const UNKNOWN_CALL_SIGN: &str = "Unknown";

/// Mapping rules, normally loaded from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuideOptions {
    /// Call signs to include.
    pub allowed_channels: Vec<String>,
    /// Glob patterns of titles to force into a series.
    pub force_series: Vec<String>,
    /// Encoding of synthesized episode numbers.
    pub encoding: EpisodeEncoding,
}

/// Builds XMLTV channels and programmes from grid blocks.
///
/// Channels are deduplicated by grid channel identifier; the first block
/// seen for an identifier decides its XMLTV id, name and icon.
#[derive(Debug)]
pub struct GuideMapper<Tz: TimeZone = Local> {
    allowed: HashSet<String>,
    series: SeriesMatcher,
    encoding: EpisodeEncoding,
    tz: Tz,
    /// Grid channel identifier -> emitted XMLTV channel id.
    seen_channels: HashMap<String, String>,
    channels: Vec<XmltvChannel>,
    programmes: Vec<Programme>,
}

impl GuideMapper<Local> {
    /// Creates a mapper that derives synthetic episode numbers in the host timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if a force-series pattern is invalid.
    pub fn new(options: &GuideOptions) -> Result<Self> {
        Self::with_timezone(options, Local)
    }
}

impl<Tz: TimeZone> GuideMapper<Tz>
where
    Tz::Offset: Display,
{
    /// Creates a mapper using `tz` for local calendar calculations.
    ///
    /// # Errors
    ///
    /// Returns an error if a force-series pattern is invalid.
    pub fn with_timezone(options: &GuideOptions, tz: Tz) -> Result<Self> {
        let series = SeriesMatcher::new(options.force_series.as_slice())?;
        if series.is_empty() {
            tracing::debug!("No force-series patterns configured");
        } else {
            tracing::debug!(patterns = series.len(), "Force-series patterns compiled");
        }

        Ok(Self {
            allowed: options.allowed_channels.iter().cloned().collect(),
            series,
            encoding: options.encoding,
            tz,
            seen_channels: HashMap::new(),
            channels: Vec::new(),
            programmes: Vec::new(),
        })
    }

    /// Returns `true` if the block's call sign is on the allow-list.
    #[must_use]
    pub fn is_allowed(&self, block: &ChannelBlock) -> bool {
        block
            .call_sign
            .as_deref()
            .is_some_and(|cs| self.allowed.contains(cs))
    }

    /// Emits a channel for `block` unless its identifier was already seen.
    ///
    /// Returns `true` if a new channel element was added.
    pub fn add_channel(&mut self, block: &ChannelBlock) -> bool {
        if self.seen_channels.contains_key(&block.channel_id) {
            return false;
        }

        let id = block
            .call_sign
            .clone()
            .unwrap_or_else(|| block.channel_id.clone());

        // Another identifier already produced this XMLTV id; share it.
        if self.channels.iter().any(|c| c.id == id) {
            tracing::debug!(
                channel_id = %block.channel_id,
                %id,
                "Channel id already emitted by another block"
            );
            self.seen_channels.insert(block.channel_id.clone(), id);
            return false;
        }

        let channel = XmltvChannel {
            id: id.clone(),
            display_name: block
                .call_sign
                .clone()
                .unwrap_or_else(|| String::from(UNKNOWN_CALL_SIGN)),
            icon: block
                .thumbnail
                .as_ref()
                .filter(|t| !t.is_empty())
                .map(|src| Icon { src: src.clone() }),
        };
        tracing::debug!(channel_id = %block.channel_id, %id, "Channel added");

        self.channels.push(channel);
        self.seen_channels.insert(block.channel_id.clone(), id);
        true
    }

    /// Emits one programme per event in `block`.
    ///
    /// The programme references the XMLTV id recorded for the block's
    /// channel identifier, falling back to the block's own call sign.
    pub fn add_programs(&mut self, block: &ChannelBlock) {
        let channel_ref = self
            .seen_channels
            .get(&block.channel_id)
            .cloned()
            .or_else(|| block.call_sign.clone())
            .unwrap_or_else(|| block.channel_id.clone());

        for event in &block.events {
            self.add_program(event, &channel_ref);
        }
    }

    /// Emits one programme for `event` on channel `channel_ref`.
    pub fn add_program(&mut self, event: &Event, channel_ref: &str) {
        let program = &event.program;
        let title = program
            .title
            .clone()
            .unwrap_or_else(|| String::from(NO_TITLE));
        let episode_num = self.episode_num(event, &title);

        tracing::debug!(
            channel = channel_ref,
            start = %to_display_in(&event.start_time, &self.tz),
            %title,
            episode = ?episode_num.as_ref().map(|e| e.value.as_str()),
            "Programme added"
        );

        self.programmes.push(Programme {
            start: to_compact_utc(&event.start_time),
            stop: to_compact_utc(&event.end_time),
            channel: String::from(channel_ref),
            title,
            sub_title: program.episode_title.clone(),
            desc: program.short_desc.clone(),
            episode_num,
        });
    }

    /// Chooses the episode number: real season/episode first, then a
    /// synthesized one for force-series titles, otherwise none.
    fn episode_num(&self, event: &Event, title: &str) -> Option<EpisodeNum> {
        let program = &event.program;
        if let (Some(season), Some(episode)) = (&program.season, &program.episode) {
            return Some(EpisodeNum::new("xmltv_ns", format!("{season}.{episode}.0")));
        }

        if !self.series.matches(title) {
            return None;
        }

        let (encoding, prefix) = match (self.encoding, program.tms_id.as_deref()) {
            (EpisodeEncoding::DdProgid, Some(tms_id)) => (EpisodeEncoding::DdProgid, tms_id),
            (EpisodeEncoding::DdProgid, None) => (EpisodeEncoding::XmltvNs, ""),
            (other, _) => (other, ""),
        };

        match synthetic_episode_number_in(&event.start_time, encoding, &self.tz) {
            Ok(value) => Some(EpisodeNum::new(encoding.system(), format!("{prefix}{value}"))),
            Err(e) => {
                tracing::warn!(%title, error = %e, "Cannot synthesize episode number");
                None
            }
        }
    }

    /// Number of channel elements emitted so far.
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of programme elements emitted so far.
    #[must_use]
    pub const fn programme_count(&self) -> usize {
        self.programmes.len()
    }

    /// Consumes the mapper and returns the document.
    #[must_use]
    pub fn into_document(self) -> Tv {
        Tv {
            channels: self.channels,
            programmes: self.programmes,
            ..Tv::default()
        }
    }
}

/// Builds the XMLTV document from all fetched blocks.
///
/// Runs two passes over the allowed blocks: channels first, then
/// programmes, so every programme refers to an already emitted channel.
pub fn assemble<Tz: TimeZone>(blocks: &[ChannelBlock], mut mapper: GuideMapper<Tz>) -> Tv
where
    Tz::Offset: Display,
{
    let allowed: Vec<&ChannelBlock> = blocks.iter().filter(|b| mapper.is_allowed(b)).collect();
    tracing::debug!(
        blocks = blocks.len(),
        allowed = allowed.len(),
        "Filtered channel blocks"
    );

    for block in &allowed {
        mapper.add_channel(block);
    }
    tracing::info!("Found {} channels", mapper.channel_count());

    for block in &allowed {
        mapper.add_programs(block);
    }
    tracing::info!("Mapped {} programmes", mapper.programme_count());

    mapper.into_document()
}
