//! # Optional HTTP/WebSocket boundary (`ui` feature).
//!
//! [`UiServer`] exposes a read-only view of one [`Scheduler`] for dashboard
//! frontends:
//!
//! - `GET /api/status` — instance title and job count
//! - `GET /api/jobs` — active jobs (id, name, tags, next run, runs completed)
//! - `GET /ws` — live event stream, one JSON object per event
//!
//! When credentials are configured every route requires HTTP Basic
//! authentication; failed checks get `401` with a `WWW-Authenticate`
//! challenge and no route ever mutates scheduler state.

mod auth;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::core::Scheduler;
use routes::AppState;

pub use auth::{BasicAuth, UiError, PASSWORD_ENV, USERNAME_ENV};

/// Read-only HTTP boundary over a scheduler.
pub struct UiServer {
    scheduler: Scheduler,
    title: Arc<str>,
    auth: Option<BasicAuth>,
}

impl UiServer {
    /// Creates a server for the given scheduler with no authentication and
    /// a default title.
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            title: Arc::from("cronvisor"),
            auth: None,
        }
    }

    /// Sets the instance title shown by `/api/status`.
    pub fn with_title(mut self, title: impl Into<Arc<str>>) -> Self {
        self.title = title.into();
        self
    }

    /// Requires HTTP Basic authentication on every route.
    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Builds the axum router (useful for embedding or testing).
    pub fn router(&self) -> Router {
        routes::router(AppState {
            scheduler: self.scheduler.clone(),
            title: self.title.clone(),
            auth: self.auth.clone(),
        })
    }

    /// Binds `addr` and serves until the server task is dropped or fails.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), UiError> {
        let router = self.router();
        let listener = TcpListener::bind(addr).await.map_err(|source| UiError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        tracing::info!(%addr, "ui server listening");
        axum::serve(listener, router).await.map_err(UiError::Serve)
    }
}
