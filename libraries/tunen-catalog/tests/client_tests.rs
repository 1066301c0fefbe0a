//! Tests for the catalog client library.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real catalog connection.

use tunen_catalog::{CatalogClient, CatalogConfig, CatalogError, TokenEndpoint};
use tunen_core::types::{SearchKind, TrackId};
use tunen_core::{CatalogGateway, Credential, CredentialRefresher, Session, TuneError, UserId};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(token: &str) -> Session {
    Session::new(UserId::new("alice"), Credential::bearer(token))
}

async fn client_for(server: &MockServer) -> CatalogClient {
    CatalogClient::new(CatalogConfig::new(server.uri())).unwrap()
}

fn track_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "artists": [{ "name": "Daft Punk" }],
        "album": { "images": [{ "url": format!("https://img.example/{}.jpg", id) }] },
        "preview_url": format!("https://preview.example/{}.mp3", id)
    })
}

// =============================================================================
// Search Tests
// =============================================================================

mod search {
    use super::*;

    #[tokio::test]
    async fn test_track_search_sends_bearer_and_params() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tok-1"))
            .and(query_param("q", "one more time"))
            .and(query_param("type", "track"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tracks": {
                    "items": [track_json("t1", "One More Time"), track_json("t2", "Aerodynamic")],
                    "total": 2,
                    "next": null
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let results = client
            .tracks()
            .search(&session("tok-1"), "one more time", SearchKind::Track, 10)
            .await
            .unwrap();

        assert_eq!(results.tracks.len(), 2);
        assert!(results.playlists.is_empty());

        let first = &results.tracks[0];
        assert_eq!(first.id.as_str(), "t1");
        assert_eq!(first.name, "One More Time");
        assert_eq!(first.artist_line(), "Daft Punk");
        assert_eq!(first.artwork_url.as_deref(), Some("https://img.example/t1.jpg"));
        assert_eq!(first.preview_url.as_deref(), Some("https://preview.example/t1.mp3"));
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("limit", "50"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "tracks": { "items": [] } })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let results = client
            .tracks()
            .search(&session("tok"), "x", SearchKind::Track, 500)
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_playlist_search_skips_null_items() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("type", "playlist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "playlists": {
                    "items": [
                        null,
                        { "id": "p1", "name": "Road Trip", "images": [], "tracks": { "total": 30 } }
                    ]
                }
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let results = client
            .tracks()
            .search(&session("tok"), "road", SearchKind::Playlist, 5)
            .await
            .unwrap();

        assert_eq!(results.playlists.len(), 1);
        assert_eq!(results.playlists[0].name, "Road Trip");
        assert_eq!(results.playlists[0].track_total, Some(30));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "status": 401, "message": "The access token expired" }
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let result = client
            .tracks()
            .search(&session("old"), "x", SearchKind::Track, 10)
            .await;

        match result.unwrap_err() {
            CatalogError::Unauthorized(msg) => assert_eq!(msg, "The access token expired"),
            e => panic!("Expected Unauthorized error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let result = client
            .tracks()
            .search(&session("tok"), "x", SearchKind::Track, 10)
            .await;

        match result.unwrap_err() {
            CatalogError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 7),
            e => panic!("Expected RateLimited error, got: {:?}", e),
        }
    }
}

// =============================================================================
// Track Tests
// =============================================================================

mod tracks {
    use super::*;

    #[tokio::test]
    async fn test_get_track() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tracks/t42"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(track_json("t42", "Digital Love")))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let track = client
            .tracks()
            .get_track(&session("tok"), &TrackId::new("t42"))
            .await
            .unwrap();

        assert_eq!(track.name, "Digital Love");
    }

    #[tokio::test]
    async fn test_get_missing_track() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tracks/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": { "status": 404, "message": "Non existing id: 'nope'" }
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let result = client
            .tracks()
            .get_track(&session("tok"), &TrackId::new("nope"))
            .await;

        match result.unwrap_err() {
            CatalogError::ServerError { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("Non existing id"));
            }
            e => panic!("Expected ServerError, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_recently_played() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/player/recently-played"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    { "track": track_json("a", "First"), "played_at": "2024-11-02T10:00:00Z" },
                    { "track": track_json("b", "Second"), "played_at": "2024-11-02T09:00:00Z" }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let tracks = client
            .tracks()
            .recently_played(&session("tok"), 2)
            .await
            .unwrap();

        let names: Vec<_> = tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }
}

// =============================================================================
// Playlist Tests
// =============================================================================

mod playlists {
    use super::*;

    #[tokio::test]
    async fn test_list_mine() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    { "id": "p1", "name": "Chill", "images": [{ "url": "c.jpg" }], "tracks": { "total": 3 } },
                    { "id": "p2", "name": "Gym", "images": null }
                ],
                "total": 2
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let playlists = client.playlists().list_mine(&session("tok")).await.unwrap();

        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].image_url.as_deref(), Some("c.jpg"));
        assert!(playlists[1].image_url.is_none());
    }

    #[tokio::test]
    async fn test_create_playlist() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/me/playlists"))
            .and(body_json(serde_json::json!({ "name": "road trip" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "new-1", "name": "road trip", "images": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let playlist = client
            .playlists()
            .create(&session("tok"), "road trip")
            .await
            .unwrap();

        assert_eq!(playlist.id, "new-1");
    }

    #[tokio::test]
    async fn test_append_tracks_chunks_requests() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/playlists/p1/tracks"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({ "snapshot_id": "snap" })),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let uris: Vec<String> = (0..150).map(|i| TrackId::new(format!("t{}", i)).uri()).collect();

        let client = client_for(&mock_server).await;
        let snapshot = client
            .playlists()
            .append_tracks(&session("tok"), "p1", &uris)
            .await
            .unwrap();

        assert_eq!(snapshot, "snap");
    }

    #[tokio::test]
    async fn test_append_sends_track_uris() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/playlists/p1/tracks"))
            .and(body_json(serde_json::json!({
                "uris": ["spotify:track:a", "spotify:track:b"]
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({ "snapshot_id": "s1" })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let uris = vec!["spotify:track:a".to_string(), "spotify:track:b".to_string()];
        client
            .append_tracks(&session("tok"), "p1", &uris)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_append_nothing_is_rejected_locally() {
        let mock_server = MockServer::start().await;
        let client = client_for(&mock_server).await;

        let result = client.playlists().append_tracks(&session("tok"), "p1", &[]).await;
        assert!(matches!(result, Err(CatalogError::InvalidRequest(_))));
    }
}

// =============================================================================
// Gateway Trait Tests
// =============================================================================

mod gateway {
    use super::*;

    #[tokio::test]
    async fn test_server_error_maps_to_remote_service() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let gateway: &dyn CatalogGateway = &client;
        let result = gateway.list_owner_playlists(&session("tok")).await;

        match result.unwrap_err() {
            TuneError::RemoteService { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            e => panic!("Expected RemoteService, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_unreachable_catalog() {
        let client = CatalogClient::new(CatalogConfig::new("http://127.0.0.1:1")).unwrap();
        let gateway: &dyn CatalogGateway = &client;

        let result = gateway.get_track(&session("tok"), &TrackId::new("t")).await;
        assert!(matches!(result, Err(TuneError::RemoteService { .. })));
    }

    #[tokio::test]
    async fn test_current_user() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "alice99",
                "display_name": "Alice",
                "email": "alice@example.com",
                "images": [{ "url": "me.jpg" }]
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let user = client.current_user(&session("tok")).await.unwrap();

        assert_eq!(user.id, "alice99");
        assert_eq!(user.display_name.as_deref(), Some("Alice"));
        assert_eq!(user.image_url.as_deref(), Some("me.jpg"));
    }
}

// =============================================================================
// Token Endpoint Tests
// =============================================================================

mod token_endpoint {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_refresh_keeps_old_refresh_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=r-1"))
            .and(body_string_contains("client_id=cid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let endpoint = TokenEndpoint::new(client.http().clone(), mock_server.uri(), "cid", None);

        let current = Credential {
            access_token: "stale".into(),
            refresh_token: Some("r-1".into()),
            expires_at: None,
        };
        let next = endpoint.refresh(&current).await.unwrap();

        assert_eq!(next.access_token, "fresh");
        assert_eq!(next.refresh_token.as_deref(), Some("r-1"));
        assert!(next.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let mock_server = MockServer::start().await;
        let client = client_for(&mock_server).await;
        let endpoint = TokenEndpoint::new(client.http().clone(), mock_server.uri(), "cid", None);

        let result = endpoint.refresh(&Credential::bearer("only-access")).await;
        assert!(matches!(result, Err(TuneError::AuthRequired)));
    }

    #[tokio::test]
    async fn test_rejected_refresh() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let endpoint = TokenEndpoint::new(client.http().clone(), mock_server.uri(), "cid", None);

        let result = endpoint.refresh_token("revoked").await;
        assert!(matches!(result, Err(CatalogError::TokenRequestFailed(_))));
    }

    #[tokio::test]
    async fn test_session_refreshes_and_retries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "status": 401, "message": "The access token expired" }
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "r-2"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        let endpoint = TokenEndpoint::new(client.http().clone(), mock_server.uri(), "cid", None);
        let session = Session::with_refresher(
            UserId::new("alice"),
            Credential {
                access_token: "stale".into(),
                refresh_token: Some("r-1".into()),
                expires_at: None,
            },
            Arc::new(endpoint),
        );

        let playlists = session
            .with_refresh(|| client.list_owner_playlists(&session))
            .await
            .unwrap();

        assert!(playlists.is_empty());
        assert_eq!(session.access_token().await, "fresh");
        assert_eq!(session.credential().await.refresh_token.as_deref(), Some("r-2"));
    }
}
