mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{FakeConfig, ManualClock, at};
use lastsync::{
    lastfm::LastfmClient,
    spotify::{SpotifyClient, SpotifyError, TokenSource},
    sync::{PlaylistService, Syncer},
    types::Period,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct StaticToken(Option<&'static str>);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, SpotifyError> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| SpotifyError::Token("no token cached".to_string()))
    }
}

fn client_for(server: &MockServer) -> SpotifyClient {
    SpotifyClient::new(server.uri(), Arc::new(StaticToken(Some("test-token")))).unwrap()
}

#[tokio::test]
async fn test_current_user_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "u1", "display_name": "Someone"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let user = client_for(&server).current_user().await.unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.display_name.as_deref(), Some("Someone"));
}

#[tokio::test]
async fn test_search_returns_track_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", r#"artist: "Air" track: "La Femme d'Argent""#))
        .and(query_param("type", "track"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {"items": [
                {"id": "t1", "name": "La Femme d'Argent", "uri": "spotify:track:t1"}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ids = client_for(&server)
        .search_track(r#"artist: "Air" track: "La Femme d'Argent""#, 1)
        .await
        .unwrap();
    assert_eq!(ids, vec!["t1".to_string()]);
}

#[tokio::test]
async fn test_error_status_carries_spotify_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"status": 500, "message": "Server error"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).search_track("q", 1).await.unwrap_err();
    assert!(matches!(
        err,
        SpotifyError::Api { status: 500, ref message } if message == "Server error"
    ));
}

#[tokio::test]
async fn test_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).current_user().await.unwrap_err();
    assert!(matches!(err, SpotifyError::Unauthorized));
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = SpotifyClient::new(server.uri(), Arc::new(StaticToken(None))).unwrap();
    let err = client.current_user().await.unwrap_err();
    assert!(matches!(err, SpotifyError::Token(_)));
}

#[tokio::test]
async fn test_create_playlist_is_private() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/u1/playlists"))
        .and(body_json(json!({
            "name": "LastFM Top Tracks: February 2024",
            "description": "Top tracks from Last.fm (monthly) for fuzzycut1",
            "public": false,
            "collaborative": false
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": "p1", "name": "LastFM Top Tracks: February 2024"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let id = PlaylistService::create_playlist(
        &client_for(&server),
        "u1",
        "LastFM Top Tracks: February 2024",
        "Top tracks from Last.fm (monthly) for fuzzycut1",
    )
    .await
    .unwrap();
    assert_eq!(id, "p1");
}

#[tokio::test]
async fn test_add_tracks_sends_one_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/playlists/p1/tracks"))
        .and(body_json(json!({"uris": ["spotify:track:a", "spotify:track:b"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"snapshot_id": "s1"})))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client_for(&server)
        .add_tracks_to_playlist(
            "p1",
            &["spotify:track:a".to_string(), "spotify:track:b".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(snapshot.as_deref(), Some("s1"));
}

#[tokio::test]
async fn test_empty_add_is_acknowledged_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;

    let snapshot = client_for(&server)
        .add_tracks_to_playlist("p1", &[])
        .await
        .unwrap();
    assert_eq!(snapshot, None);
}

#[tokio::test]
async fn test_sync_against_http_services() {
    let lastfm_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("method", "user.gettoptracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "toptracks": {
                "track": [
                    {"name": "Teardrop", "playcount": "9", "artist": {"name": "Massive Attack"}, "@attr": {"rank": "1"}},
                    {"name": "Unfindable", "playcount": "5", "artist": {"name": "Nobody"}, "@attr": {"rank": "2"}},
                    {"name": "Glory Box", "playcount": "4", "artist": {"name": "Portishead"}, "@attr": {"rank": "3"}}
                ],
                "@attr": {"user": "fuzzycut1"}
            }
        })))
        .mount(&lastfm_server)
        .await;

    let spotify_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1"})))
        .mount(&spotify_server)
        .await;
    for (query, items) in [
        (
            r#"artist: "Massive Attack" track: "Teardrop""#,
            json!([{"id": "t1", "name": "Teardrop", "uri": "spotify:track:t1"}]),
        ),
        (r#"artist: "Nobody" track: "Unfindable""#, json!([])),
        (
            r#"artist: "Portishead" track: "Glory Box""#,
            json!([{"id": "t3", "name": "Glory Box", "uri": "spotify:track:t3"}]),
        ),
    ] {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", query))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"tracks": {"items": items}})),
            )
            .expect(1)
            .mount(&spotify_server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/users/u1/playlists"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "p1", "name": "x"})))
        .expect(1)
        .mount(&spotify_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/playlists/p1/tracks"))
        .and(body_json(json!({"uris": ["spotify:track:t1", "spotify:track:t3"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"snapshot_id": "s1"})))
        .expect(1)
        .mount(&spotify_server)
        .await;

    let syncer = Syncer::new(
        Arc::new(LastfmClient::new("key", lastfm_server.uri()).unwrap()),
        Arc::new(client_for(&spotify_server)),
        Arc::new(FakeConfig::new(3)),
        Arc::new(ManualClock::new(at(2024, 3, 15, 9, 30))),
    );

    let report = syncer.sync(Period::Weekly).await.unwrap();

    assert_eq!(report.playlist_id, "p1");
    assert_eq!(report.target.track_ids, vec!["t1".to_string(), "t3".to_string()]);
    assert_eq!(report.skipped_count(), 1);
}
