#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use lastsync::{
    clock::Clock,
    error::ConfigError,
    lastfm::LastfmError,
    scheduler::PeriodJob,
    spotify::SpotifyError,
    sync::{PeriodConfigSource, PlaylistService, Syncer, TopTracksSource},
    types::{Period, PeriodConfig, SpotifyUser, TopTracksReport, TrackSummary},
};

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn track(rank: u32, artist: &str, name: &str) -> TrackSummary {
    TrackSummary {
        name: name.to_string(),
        artist_name: artist.to_string(),
        playcount: u64::from(100 - rank),
        rank,
    }
}

pub fn tracks(n: u32) -> Vec<TrackSummary> {
    (1..=n)
        .map(|i| track(i, &format!("Artist {}", i), &format!("Song {}", i)))
        .collect()
}

/// Track id the fake search hands out for `title`
pub fn id_for(title: &str) -> String {
    format!("id-{}", title.to_lowercase().replace(' ', "-"))
}

pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

pub struct FakeSource {
    pub report: TopTracksReport,
    pub fail: bool,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<(Period, u32, String)>>,
}

impl FakeSource {
    pub fn with_tracks(tracks: Vec<TrackSummary>) -> Self {
        Self {
            report: TopTracksReport {
                user: "fuzzycut1".to_string(),
                tracks,
            },
            fail: false,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_tracks(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopTracksSource for FakeSource {
    async fn top_tracks(
        &self,
        period: Period,
        limit: u32,
        username: &str,
    ) -> Result<TopTracksReport, LastfmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((period, limit, username.to_string()));
        if self.fail {
            return Err(LastfmError::Api {
                code: 6,
                message: "User not found".to_string(),
            });
        }
        Ok(self.report.clone())
    }
}

#[derive(Debug, Clone)]
pub enum SearchBehavior {
    Fail,
    Empty,
    Found(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlaylist {
    pub user_id: String,
    pub name: String,
    pub description: String,
}

/// In-memory Spotify that records every call.
///
/// Searches succeed with [`id_for`] of the title unless a title has a
/// different [`SearchBehavior`].
#[derive(Default)]
pub struct FakeSpotify {
    pub fail_user: bool,
    pub fail_create: bool,
    pub fail_add: bool,
    pub behaviors: HashMap<String, SearchBehavior>,
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
    pub created: Mutex<Vec<CreatedPlaylist>>,
    pub added: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeSpotify {
    pub fn with_behavior(mut self, title: &str, behavior: SearchBehavior) -> Self {
        self.behaviors.insert(title.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn api_error(message: &str) -> SpotifyError {
        SpotifyError::Api {
            status: 500,
            message: message.to_string(),
        }
    }
}

fn title_of(query: &str) -> &str {
    query
        .split("track: \"")
        .nth(1)
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(query)
}

#[async_trait]
impl PlaylistService for FakeSpotify {
    async fn current_user(&self) -> Result<SpotifyUser, SpotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_user {
            return Err(SpotifyError::Unauthorized);
        }
        Ok(SpotifyUser {
            id: "spotify-user".to_string(),
            display_name: Some("Spotify User".to_string()),
        })
    }

    async fn search_track(&self, query: &str, limit: u32) -> Result<Vec<String>, SpotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(limit, 1, "searches are capped to one result");
        self.queries.lock().unwrap().push(query.to_string());

        let title = title_of(query);
        match self.behaviors.get(title) {
            Some(SearchBehavior::Fail) => Err(Self::api_error("search exploded")),
            Some(SearchBehavior::Empty) => Ok(Vec::new()),
            Some(SearchBehavior::Found(id)) => Ok(vec![id.clone()]),
            None => Ok(vec![id_for(title)]),
        }
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String, SpotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(Self::api_error("cannot create"));
        }
        self.created.lock().unwrap().push(CreatedPlaylist {
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        });
        Ok("playlist-1".to_string())
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), SpotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_add {
            return Err(Self::api_error("cannot add"));
        }
        self.added
            .lock()
            .unwrap()
            .push((playlist_id.to_string(), uris.to_vec()));
        Ok(())
    }
}

pub struct FakeConfig {
    pub config: Option<PeriodConfig>,
    pub calls: AtomicUsize,
}

impl FakeConfig {
    pub fn new(max_tracks: u32) -> Self {
        Self {
            config: Some(PeriodConfig {
                max_tracks,
                source_username: "fuzzycut1".to_string(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            config: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeriodConfigSource for FakeConfig {
    async fn period_config(&self, _period: Period) -> Result<PeriodConfig, ConfigError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.config
            .clone()
            .ok_or(ConfigError::Missing("LASTFM_USERNAME"))
    }
}

pub struct Harness {
    pub source: Arc<FakeSource>,
    pub spotify: Arc<FakeSpotify>,
    pub config: Arc<FakeConfig>,
    pub clock: Arc<ManualClock>,
    pub syncer: Syncer,
}

impl Harness {
    pub fn new(source: FakeSource, spotify: FakeSpotify, config: FakeConfig) -> Self {
        let source = Arc::new(source);
        let spotify = Arc::new(spotify);
        let config = Arc::new(config);
        let clock = Arc::new(ManualClock::new(at(2024, 3, 15, 9, 30)));
        let syncer = Syncer::new(
            source.clone(),
            spotify.clone(),
            config.clone(),
            clock.clone(),
        );
        Self {
            source,
            spotify,
            config,
            clock,
            syncer,
        }
    }

    pub fn external_calls(&self) -> usize {
        self.source.calls() + self.spotify.calls() + self.config.calls()
    }

    pub fn added_uris(&self) -> Vec<String> {
        self.spotify
            .added
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, uris)| uris.clone())
            .collect()
    }
}

/// Job that records the periods it ran
#[derive(Default)]
pub struct CountingJob {
    pub runs: Mutex<Vec<Period>>,
}

impl CountingJob {
    pub fn runs(&self) -> Vec<Period> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl PeriodJob for CountingJob {
    async fn run(&self, period: Period) {
        self.runs.lock().unwrap().push(period);
    }
}
