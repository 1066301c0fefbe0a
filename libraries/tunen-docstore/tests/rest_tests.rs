//! Tests for the hosted document store client.
//!
//! These tests use mock servers to verify request shapes and error mapping
//! without a real store.

use tunen_core::error::NO_STATUS;
use tunen_core::types::{PlaylistId, PlaylistPatch, PlaylistRecord, UserId};
use tunen_core::{DocumentStore, TuneError};
use tunen_docstore::RestDocumentStore;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> RestDocumentStore {
    RestDocumentStore::new(server.uri(), Some("key-1".to_string())).unwrap()
}

// =============================================================================
// Playlist Collection Tests
// =============================================================================

mod playlists {
    use super::*;

    #[tokio::test]
    async fn test_query_by_owner() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists"))
            .and(query_param("username", "alice"))
            .and(header("x-api-key", "key-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": "p1",
                    "name": "road trip",
                    "songs": ["t1", "t2"],
                    "createdAt": "2024-11-02T10:00:00Z",
                    "image": null,
                    "username": "alice",
                    "upvotes": 2,
                    "downvotes": 1
                },
                {
                    "id": "p2",
                    "name": "legacy",
                    "createdAt": "2023-05-01T08:00:00Z",
                    "username": "alice"
                }
            ])))
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        let playlists = store.query_by_owner(&UserId::new("alice")).await.unwrap();

        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].id, PlaylistId::new("p1"));
        assert_eq!(playlists[0].record.upvotes, 2);
        // Older documents lack songs and counters
        assert!(playlists[1].record.songs.is_empty());
        assert_eq!(playlists[1].record.downvotes, 0);
    }

    #[tokio::test]
    async fn test_insert_returns_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/playlists"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": "new-1" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        let record = PlaylistRecord {
            name: "road trip".into(),
            songs: vec![],
            created_at: chrono::Utc::now(),
            image: None,
            username: "alice".into(),
            upvotes: 0,
            downvotes: 0,
        };

        let id = store.insert(record).await.unwrap();
        assert_eq!(id.as_str(), "new-1");
    }

    #[tokio::test]
    async fn test_update_sends_only_patched_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/playlists/p1"))
            .and(body_json(serde_json::json!({ "upvotes": 3, "downvotes": 0 })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        let patch = PlaylistPatch {
            upvotes: Some(3),
            downvotes: Some(0),
            ..PlaylistPatch::default()
        };

        store.update(&PlaylistId::new("p1"), patch).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_update_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        store
            .update(&PlaylistId::new("p1"), PlaylistPatch::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/playlists/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        store.delete(&PlaylistId::new("gone")).await.unwrap();
    }
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

mod errors {
    use super::*;

    #[tokio::test]
    async fn test_server_error_becomes_storage_service() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        let err = store.query_by_owner(&UserId::new("alice")).await.unwrap_err();

        match err {
            TuneError::StorageService { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "unavailable");
            }
            e => panic!("Expected StorageService, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_failed_delete() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/playlists/p1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        let err = store.delete(&PlaylistId::new("p1")).await.unwrap_err();
        assert!(matches!(err, TuneError::StorageService { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_store() {
        let store = RestDocumentStore::new("http://127.0.0.1:1", None).unwrap();
        let err = store.query_by_owner(&UserId::new("alice")).await.unwrap_err();
        assert!(matches!(err, TuneError::StorageService { status: NO_STATUS, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        let err = store.query_by_owner(&UserId::new("alice")).await.unwrap_err();
        assert!(matches!(err, TuneError::StorageService { .. }));
    }
}

// =============================================================================
// User Collection Tests
// =============================================================================

mod users {
    use super::*;

    #[tokio::test]
    async fn test_find_user() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("email", "alice@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "email": "alice@example.com", "followers": ["bob"], "messages": ["hi"] }
            ])))
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        let profile = store.find_user("alice@example.com").await.unwrap().unwrap();
        assert_eq!(profile.followers, vec!["bob".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let store = store_for(&mock_server);
        assert!(store.find_user("nobody@example.com").await.unwrap().is_none());
    }
}
