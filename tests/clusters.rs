//! Cluster endpoint tests.
//!
//! Uses wiremock to mock the Xplenty API and test the request/response flow.

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xplenty::{
    Cluster, ClusterCreateParams, Create, Delete, Get, List, ListQuery, XplentyClient,
    XplentyError,
};

fn client(server: &MockServer) -> XplentyClient {
    XplentyClient::with_base_url("foo", "bar", &server.uri()).unwrap()
}

#[tokio::test]
async fn test_list_clusters_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo/api/clusters"))
        .and(header("Authorization", "Basic YmFy"))
        .and(header("Accept", "application/vnd.xplenty+json; version=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "c1"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let clusters = Cluster::list(&client(&mock_server)).await.unwrap();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].id, Some(1));
    assert_eq!(clusters[0].name, "c1");
    // Absent string fields hold the placeholder, absent numbers hold nothing
    assert_eq!(clusters[0].status, "null");
    assert_eq!(clusters[0].nodes, None);
    assert!(clusters[0].client().is_some());
}

#[tokio::test]
async fn test_list_page_sends_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo/api/clusters"))
        .and(query_param("offset", "40"))
        .and(query_param("limit", "2"))
        .and(query_param("status", "available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 41, "name": "a", "status": "available"},
            {"id": 42, "name": "b", "status": "available"}
        ])))
        .mount(&mock_server)
        .await;

    let query = ListQuery {
        status: Some("available".to_string()),
        ..Default::default()
    };
    let page = Cluster::list_page(&client(&mock_server), &query, 40, 2)
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert!(page.has_more);
    assert_eq!(page.next_offset(), 42);
}

#[tokio::test]
async fn test_list_all_follows_offsets() {
    let mock_server = MockServer::start().await;

    let full: Vec<_> = (1..=20).map(|id| json!({"id": id})).collect();
    Mock::given(method("GET"))
        .and(path("/foo/api/clusters"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(full)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/foo/api/clusters"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 21}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let all = Cluster::list_all(&client(&mock_server), &ListQuery::default())
        .await
        .unwrap();

    assert_eq!(all.len(), 21);
    assert_eq!(all.last().and_then(|c| c.id), Some(21));
}

#[tokio::test]
async fn test_get_cluster_coerces_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo/api/clusters/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "5",
            "name": "etl",
            "type": "production",
            "nodes": "3",
            "running_jobs_count": "lots",
            "terminate_on_idle": false,
            "created_at": "2015-03-01T10:00:00Z",
            "idle_since": "not a date"
        })))
        .mount(&mock_server)
        .await;

    let cluster = Cluster::get(&client(&mock_server), 5).await.unwrap();

    assert_eq!(cluster.id, Some(5));
    assert_eq!(cluster.cluster_type, "production");
    assert_eq!(cluster.nodes, Some(3));
    assert_eq!(cluster.running_jobs_count, None);
    assert_eq!(cluster.terminate_on_idle, Some(false));
    assert!(cluster.created_at.is_some());
    assert!(cluster.idle_since.is_none());
    assert_eq!(cluster.to_string(), "<Cluster '5'>");
}

#[tokio::test]
async fn test_get_missing_cluster_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo/api/clusters/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Cluster not found"})),
        )
        .mount(&mock_server)
        .await;

    let err = Cluster::get(&client(&mock_server), 99).await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        XplentyError::Api {
            status_code,
            message,
            body,
        } => {
            assert_eq!(status_code, 404);
            assert_eq!(message, "Cluster not found");
            assert!(body.contains("Cluster not found"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_cluster_posts_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/foo/api/clusters"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("cluster%5Bnodes%5D=2"))
        .and(body_string_contains("cluster%5Btype%5D=sandbox"))
        .and(body_string_contains("cluster%5Bname%5D=nightly"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 8,
            "name": "nightly",
            "type": "sandbox",
            "nodes": 2,
            "status": "pending"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut params = ClusterCreateParams::new("sandbox", 2);
    params.name = Some("nightly".to_string());
    let cluster = Cluster::create(&client(&mock_server), params).await.unwrap();

    assert_eq!(cluster.id, Some(8));
    assert_eq!(cluster.status, "pending");
}

#[tokio::test]
async fn test_terminate_through_attached_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo/api/clusters/3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 3, "status": "available"})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/foo/api/clusters/3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 3, "status": "pending_terminate"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let cluster = Cluster::get(&client(&mock_server), 3).await.unwrap();
    let terminated = cluster.terminate().await.unwrap();

    assert!(terminated.is_terminated());
}

#[tokio::test]
async fn test_delete_cluster_directly() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/foo/api/clusters/4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 4, "status": "terminated"})),
        )
        .mount(&mock_server)
        .await;

    let cluster = Cluster::delete(&client(&mock_server), 4).await.unwrap();
    assert_eq!(cluster.status, "terminated");
}

#[tokio::test]
async fn test_list_rejects_non_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo/api/clusters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&mock_server)
        .await;

    let err = Cluster::list(&client(&mock_server)).await.unwrap_err();
    assert!(matches!(err, XplentyError::UnexpectedPayload { .. }));
}
