//! Last.fm API response models

use serde::Deserialize;

use crate::types::{TopTracksReport, TrackSummary};

#[derive(Debug, Deserialize)]
pub(crate) struct TopTracksResponse {
    pub toptracks: TopTracksWrapper,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopTracksWrapper {
    #[serde(default)]
    pub track: OneOrMany<RawTrack>,
    #[serde(rename = "@attr")]
    pub attr: Option<TopTracksAttr>,
}

/// Last.fm collapses single-element lists into a bare object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopTracksAttr {
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTrack {
    pub name: String,
    #[serde(default)]
    pub playcount: String,
    pub artist: RawArtist,
    #[serde(rename = "@attr")]
    pub attr: Option<RawRank>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawArtist {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRank {
    pub rank: String,
}

impl From<RawTrack> for TrackSummary {
    fn from(raw: RawTrack) -> Self {
        let playcount = raw.playcount.parse().unwrap_or_else(|e| {
            tracing::warn!(
                track = %raw.name,
                raw_playcount = %raw.playcount,
                error = %e,
                "Failed to parse playcount, defaulting to 0"
            );
            0
        });
        let rank = raw
            .attr
            .as_ref()
            .and_then(|attr| attr.rank.parse().ok())
            .unwrap_or(0);

        Self {
            name: raw.name,
            artist_name: raw.artist.name,
            playcount,
            rank,
        }
    }
}

impl From<TopTracksResponse> for TopTracksReport {
    fn from(response: TopTracksResponse) -> Self {
        let user = response
            .toptracks
            .attr
            .map(|attr| attr.user)
            .unwrap_or_default();

        Self {
            user,
            tracks: response
                .toptracks
                .track
                .into_vec()
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Last.fm API error response
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: i32,
    pub message: String,
}
