//! E2E tests using the mock Xplenty server.
//!
//! These tests exercise full workflows against the mock server,
//! testing realistic scenarios rather than individual endpoints.

#![cfg(feature = "test-server")]

use xplenty::mock_server::{Fixtures, MockServer, MockState};
use xplenty::{
    Cluster, ClusterCreateParams, Create, Get, Job, JobCreateParams, List, ListQuery, Package,
    Schedule, XplentyClient,
};

fn client(server: &MockServer) -> XplentyClient {
    XplentyClient::with_base_url("acme", "test-key", server.url()).unwrap()
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await;
    let server2 = MockServer::start().await;

    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

// =============================================================================
// Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_cluster_job_lifecycle() {
    let server = MockServer::start().await;
    let client = client(&server);

    // Start a cluster
    let mut params = ClusterCreateParams::new("sandbox", 2);
    params.name = Some("adhoc".to_string());
    let cluster = Cluster::create(&client, params).await.unwrap();
    assert_eq!(cluster.status, "pending");
    assert_eq!(cluster.nodes, Some(2));
    let cluster_id = cluster.id.unwrap();

    // It shows up in the listing
    let clusters = Cluster::list(&client).await.unwrap();
    assert!(clusters.iter().any(|c| c.id == Some(cluster_id)));

    // Run a package on it
    let params = JobCreateParams::new(cluster_id, 10).variable("DAY", "'2015-03-02'");
    let job = Job::create(&client, params).await.unwrap();
    assert_eq!(job.status, "pending");
    assert_eq!(job.cluster.as_ref().map(|c| c.name.as_str()), Some("adhoc"));

    // Stop the job, then terminate the cluster
    let stopped = job.stop().await.unwrap();
    assert_eq!(stopped.status, "stopping");

    let terminated = cluster.terminate().await.unwrap();
    assert!(terminated.is_terminated());
    assert_eq!(cluster.refresh().await.unwrap().status, "pending_terminate");

    server.shutdown().await;
}

#[tokio::test]
async fn test_job_for_unknown_package_is_rejected() {
    let server = MockServer::start().await;

    let err = Job::create(&client(&server), JobCreateParams::new(1, 999))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(422));

    server.shutdown().await;
}

#[tokio::test]
async fn test_default_jobs_round_trip_through_server() {
    let server = MockServer::start().await;
    let client = client(&server);

    let job = Job::get(&client, 20).await.unwrap();
    let expected = server.state().read().await.jobs[&20].clone();

    // Contexts never affect equality
    assert_eq!(job, expected);
    assert_eq!(job.outputs().len(), 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_list_all_pages_through_jobs() {
    let cluster = Fixtures::cluster(1, "alpha", "available");
    let mut state = MockState::new()
        .with_cluster(cluster.clone())
        .with_package(Fixtures::package(2, "rollup"));
    for id in 100..125 {
        state = state.with_job(Fixtures::job(id, &cluster, 2, "running"));
    }
    let server = MockServer::with_state(state).await;
    let client = client(&server);

    let first = Job::list(&client).await.unwrap();
    assert_eq!(first.len(), 20);

    let all = Job::list_all(&client, &ListQuery::default()).await.unwrap();
    assert_eq!(all.len(), 25);
    assert_eq!(all[24].id, Some(124));

    server.shutdown().await;
}

#[tokio::test]
async fn test_packages_and_schedules() {
    let server = MockServer::start().await;
    let client = client(&server);

    let packages = Package::list(&client).await.unwrap();
    assert_eq!(packages.len(), 2);
    assert_eq!(Package::get(&client, 11).await.unwrap().name, "backfill");

    let schedule = Schedule::get(&client, 30).await.unwrap();
    assert!(schedule.is_enabled());

    let err = Schedule::get(&client, 31).await.unwrap_err();
    assert!(err.is_not_found());

    server.shutdown().await;
}
