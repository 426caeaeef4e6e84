//! REST client behaviour against a mock backend.

use cinetrend::clients::AppwriteClient;
use cinetrend::config::BackendConfig;
use cinetrend::domain::{DocumentId, Identity, MovieId, MovieSummary, SearchEvent};
use cinetrend::services::{CollectionRef, SearchTracker, SessionOutcome, TrackingService};
use cinetrend::store::{DocumentQuery, Permission, RemoteStore, StoreError};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "test-project";
const DOCUMENTS_PATH: &str = "/v1/databases/db/collections/searches/documents";

fn backend_config(server: &MockServer) -> BackendConfig {
    BackendConfig {
        endpoint: format!("{}/v1", server.uri()),
        project_id: PROJECT.to_string(),
        database_id: "db".to_string(),
        collection_id: "searches".to_string(),
        ..BackendConfig::default()
    }
}

fn client(server: &MockServer) -> AppwriteClient {
    AppwriteClient::new(&backend_config(server)).unwrap()
}

fn stored_document(id: &str, movie_id: i64, title: &str, created_at: &str) -> serde_json::Value {
    json!({
        "$id": id,
        "$createdAt": created_at,
        "$updatedAt": created_at,
        "$permissions": ["read(\"any\")"],
        "$databaseId": "db",
        "$collectionId": "searches",
        "searchTerm": title.to_lowercase(),
        "movieId": movie_id,
        "title": title,
        "posterPath": null,
        "voteAverage": 7.0,
        "createdAt": created_at
    })
}

#[tokio::test]
async fn current_identity_sends_project_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .and(header("X-Appwrite-Project", PROJECT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "$id": "user-1",
            "name": "",
            "email": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity = client(&server).current_identity().await.unwrap();

    assert_eq!(identity, Identity::new("user-1"));
    assert!(identity.is_anonymous());
}

#[tokio::test]
async fn guest_lookup_maps_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "User (role: guests) missing scope (account)",
            "code": 401,
            "type": "general_unauthorized_scope"
        })))
        .mount(&server)
        .await;

    let err = client(&server).current_identity().await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Unauthorized("User (role: guests) missing scope (account)".to_string())
    );
}

#[tokio::test]
async fn tracker_bootstraps_anonymous_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "missing scope",
            "code": 401
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/account/sessions/anonymous"))
        .and(header("X-Appwrite-Project", PROJECT))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "$id": "session-1",
            "userId": "anon-user",
            "provider": "anonymous"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tracker = SearchTracker::from_config(&backend_config(&server));
    let outcome = tracker.ensure_session().await;

    assert_eq!(outcome, SessionOutcome::Created(Identity::new("anon-user")));
}

#[tokio::test]
async fn create_document_sends_payload_and_permissions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .and(header("X-Appwrite-Project", PROJECT))
        .and(body_partial_json(json!({
            "documentId": "unique()",
            "data": {
                "searchTerm": "batman",
                "movieId": 5,
                "title": "Batman",
                "posterPath": "/x.jpg",
                "voteAverage": 7.5
            },
            "permissions": [
                "read(\"any\")",
                "create(\"user:u1\")",
                "update(\"user:u1\")",
                "delete(\"user:u1\")"
            ]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(stored_document(
            "doc-1",
            5,
            "Batman",
            "2025-03-01T12:00:00.000+00:00",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let movie = MovieSummary {
        id: MovieId::new(5),
        title: Some("Batman".to_string()),
        poster_path: Some("/x.jpg".to_string()),
        vote_average: Some(7.5),
        release_date: None,
        original_language: None,
    };
    let event = SearchEvent::new("batman", Some(&movie));
    let permissions = Permission::for_owner(Some(&Identity::new("u1")));

    let document = client(&server)
        .create_document("db", "searches", &DocumentId::unique(), &event, &permissions)
        .await
        .unwrap();

    assert_eq!(document.id, "doc-1");
    assert_eq!(document.event.movie_id, Some(MovieId::new(5)));
}

#[tokio::test]
async fn create_document_rejection_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Invalid document structure: Unknown attribute: \"foo\"",
            "code": 400
        })))
        .mount(&server)
        .await;

    let event = SearchEvent::new("batman", None);
    let err = client(&server)
        .create_document("db", "searches", &DocumentId::unique(), &event, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn list_documents_sends_order_and_limit_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "documents": [
                stored_document("b", 2, "Heat", "2025-03-01T12:05:00.000+00:00"),
                stored_document("a", 1, "Alien", "2025-03-01T12:00:00.000+00:00")
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let documents = client(&server)
        .list_documents("db", "searches", &DocumentQuery::recent(200))
        .await
        .unwrap();

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].id, "b");

    let requests = server.received_requests().await.unwrap();
    let queries: Vec<serde_json::Value> = requests[0]
        .url
        .query_pairs()
        .filter(|(k, _)| k == "queries[]")
        .map(|(_, v)| serde_json::from_str(&v).unwrap())
        .collect();

    assert_eq!(
        queries,
        vec![
            json!({ "method": "orderDesc", "attribute": "createdAt" }),
            json!({ "method": "limit", "values": [200] }),
        ]
    );
}

#[tokio::test]
async fn malformed_listing_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .list_documents("db", "searches", &DocumentQuery::recent(200))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Decode(_)));
}

#[tokio::test]
async fn trending_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "documents": [
                stored_document("c", 1, "Alien", "2025-03-01T12:10:00.000+00:00"),
                stored_document("b", 2, "Heat", "2025-03-01T12:05:00.000+00:00"),
                stored_document("a", 1, "Alien", "2025-03-01T12:00:00.000+00:00")
            ]
        })))
        .mount(&server)
        .await;

    let store: Arc<dyn RemoteStore> = Arc::new(client(&server));
    let tracker = SearchTracker::with_store(store, CollectionRef::new("db", "searches"));

    let trending = tracker.trending(10).await.unwrap();
    assert_eq!(trending.len(), 2);
    assert_eq!(trending[0].movie_id, MovieId::new(1));
    assert_eq!(trending[0].count, 2);
    assert_eq!(trending[1].count, 1);
}

#[tokio::test]
async fn unreachable_backend_degrades_to_empty_trending() {
    let config = BackendConfig {
        endpoint: "http://127.0.0.1:9/v1".to_string(),
        project_id: PROJECT.to_string(),
        database_id: "db".to_string(),
        collection_id: "searches".to_string(),
        request_timeout_seconds: 5,
    };

    let tracker = SearchTracker::from_config(&config);
    let result = tracker.trending(10).await;

    assert!(result.is_err());
    assert!(result.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn trending_skips_malformed_documents() {
    let server = MockServer::start().await;
    let mut broken = stored_document("x", 3, "Ran", "2025-03-01T12:07:00.000+00:00");
    broken["searchTerm"] = serde_json::Value::Null;

    Mock::given(method("GET"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 4,
            "documents": [
                stored_document("c", 1, "Alien", "2025-03-01T12:10:00.000+00:00"),
                broken,
                stored_document("b", 2, "Heat", "2025-03-01T12:05:00.000+00:00"),
                stored_document("a", 1, "Alien", "2025-03-01T12:00:00.000+00:00")
            ]
        })))
        .mount(&server)
        .await;

    let store: Arc<dyn RemoteStore> = Arc::new(client(&server));
    let tracker = SearchTracker::with_store(store, CollectionRef::new("db", "searches"));

    let trending = tracker.trending(10).await.unwrap();
    let counts: Vec<(MovieId, u32)> = trending.iter().map(|e| (e.movie_id, e.count)).collect();
    assert_eq!(counts, vec![(MovieId::new(1), 2), (MovieId::new(2), 1)]);
}
