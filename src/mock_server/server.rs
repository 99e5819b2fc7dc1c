//! Mock Xplenty API server.
//!
//! Provides an axum-based HTTP server that simulates the Xplenty API.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::{MockState, SharedState};
use crate::client::basic_auth;

/// A mock Xplenty API server for testing.
///
/// The server runs in the background and serves every account id under
/// `/{account}/api/`. Point an [`XplentyClient`](crate::XplentyClient) at
/// [`MockServer::url`] with [`with_base_url`](crate::XplentyClient::with_base_url).
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: SharedState,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "mock server stopped");
            }
        });
        tracing::debug!(%addr, "mock server listening");

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server, without an account segment.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    fn default_state() -> MockState {
        Self::state_from_scenario(Fixtures::default_scenario())
    }

    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new().with_limits(scenario.limits);

        for cluster in scenario.clusters {
            state = state.with_cluster(cluster);
        }
        for package in scenario.packages {
            state = state.with_package(package);
        }
        for job in scenario.jobs {
            state = state.with_job(job);
        }
        for schedule in scenario.schedules {
            state = state.with_schedule(schedule);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: SharedState) -> Router {
        let api = Router::new()
            // Cluster routes
            .route(
                "/:account/api/clusters",
                get(handlers::list_clusters).post(handlers::create_cluster),
            )
            .route(
                "/:account/api/clusters/:id",
                get(handlers::get_cluster).delete(handlers::terminate_cluster),
            )
            // Job routes
            .route(
                "/:account/api/jobs",
                get(handlers::list_jobs).post(handlers::create_job),
            )
            .route(
                "/:account/api/jobs/:id",
                get(handlers::get_job).delete(handlers::stop_job),
            )
            // Package and schedule routes
            .route("/:account/api/packages", get(handlers::list_packages))
            .route("/:account/api/packages/:id", get(handlers::get_package))
            .route("/:account/api/schedules", get(handlers::list_schedules))
            .route("/:account/api/schedules/:id", get(handlers::get_schedule))
            // Account routes
            .route(
                "/:account/api/rate_limit_status",
                get(handlers::rate_limit_status),
            )
            .layer(middleware::from_fn_with_state(state.clone(), require_key));

        Router::new()
            .merge(api)
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Reject requests whose Basic credentials do not match the required key.
async fn require_key(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let expected = state.read().await.required_key.as_deref().map(basic_auth);
    if let Some(expected) = expected {
        let given = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if given != Some(expected.as_str()) {
            return handlers::error(StatusCode::UNAUTHORIZED, "Invalid API key");
        }
    }
    next.run(request).await
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountLimits, Cluster, Get, List, ListQuery, XplentyClient, XplentyError};

    fn client(server: &MockServer) -> XplentyClient {
        XplentyClient::with_base_url("acme", "test-key", server.url()).unwrap()
    }

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        let response = reqwest::Client::new()
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_cluster_with_client() {
        let server = MockServer::start().await;
        let client = client(&server);

        let cluster = Cluster::get(&client, 1).await.expect("Failed to get cluster");

        assert_eq!(cluster.name, "etl-production");
        assert_eq!(cluster.cluster_type, "production");
        assert!(cluster.client().is_some());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_list_clusters_with_status_filter() {
        let server = MockServer::start().await;
        let client = client(&server);

        let query = ListQuery {
            status: Some("terminated".to_string()),
            ..Default::default()
        };
        let page = Cluster::list_page(&client, &query, 0, 20)
            .await
            .expect("Failed to list clusters");

        assert_eq!(page.len(), 1);
        assert_eq!(page.items[0].name, "scratch");
        assert!(!page.has_more);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_rate_limit_status() {
        let server = MockServer::start().await;

        let limits = AccountLimits::fetch(&client(&server)).await.unwrap();
        assert_eq!(limits.limit, Some(5000));
        assert_eq!(limits.remaining, Some(4990));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;

        let err = Cluster::get(&client(&server), 1).await.unwrap_err();
        assert!(err.is_not_found());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_required_key() {
        let state = MockState::new()
            .with_cluster(Fixtures::cluster(1, "alpha", "available"))
            .with_required_key("right-key");
        let server = MockServer::with_state(state).await;

        let wrong = XplentyClient::with_base_url("acme", "wrong-key", server.url()).unwrap();
        let err = Cluster::get(&wrong, 1).await.unwrap_err();
        assert!(matches!(err, XplentyError::Api { status_code: 401, .. }));

        let right = XplentyClient::with_base_url("acme", "right-key", server.url()).unwrap();
        assert_eq!(Cluster::get(&right, 1).await.unwrap().name, "alpha");

        server.shutdown().await;
    }
}
