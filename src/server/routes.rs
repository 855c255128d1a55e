//! HTTP routes and the WebSocket event stream.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::core::Scheduler;
use crate::events::{Event, EventKind};
use crate::jobs::JobHandle;
use crate::server::auth::BasicAuth;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) scheduler: Scheduler,
    pub(crate) title: Arc<str>,
    pub(crate) auth: Option<BasicAuth>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/jobs", get(jobs))
        .route("/ws", get(events_ws))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ))
        .with_state(state)
}

/// Rejects the request unless the configured credentials match.
///
/// Applied to every route, the WebSocket upgrade included (browsers send the
/// `Authorization` header on the upgrade request).
async fn require_basic_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(auth) = &state.auth else {
        return next.run(req).await;
    };
    let supplied = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if auth.authorize(supplied) {
        next.run(req).await
    } else {
        unauthorized()
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            "Basic realm=\"restricted\", charset=\"UTF-8\"",
        )],
        "Unauthorized",
    )
        .into_response()
}

#[derive(Serialize)]
struct StatusView {
    title: String,
    jobs: usize,
}

async fn status(State(state): State<AppState>) -> Json<StatusView> {
    Json(StatusView {
        title: state.title.to_string(),
        jobs: state.scheduler.jobs().len(),
    })
}

#[derive(Serialize)]
struct JobView {
    id: Uuid,
    name: Option<String>,
    tags: Vec<String>,
    next_run_at: Option<DateTime<Utc>>,
    runs_completed: u64,
}

impl From<JobHandle> for JobView {
    fn from(h: JobHandle) -> Self {
        Self {
            id: h.id(),
            name: h.name().map(str::to_string),
            tags: h.tags().iter().cloned().collect(),
            next_run_at: h.next_run_at(),
            runs_completed: h.runs_completed(),
        }
    }
}

async fn jobs(State(state): State<AppState>) -> Json<Vec<JobView>> {
    Json(state.scheduler.jobs().into_iter().map(Into::into).collect())
}

#[derive(Serialize)]
struct EventView {
    seq: u64,
    at: DateTime<Utc>,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    job: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_run: Option<DateTime<Utc>>,
}

fn kind_label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::JobAdded => "job_added",
        EventKind::JobRemoved => "job_removed",
        EventKind::JobFinished => "job_finished",
        EventKind::JobStarting => "job_starting",
        EventKind::JobCompleted => "job_completed",
        EventKind::JobFailed => "job_failed",
        EventKind::JobSkipped => "job_skipped",
        EventKind::JobDeferred => "job_deferred",
        EventKind::ShutdownRequested => "shutdown_requested",
        EventKind::AllStoppedWithin => "all_stopped",
        EventKind::GraceExceeded => "grace_exceeded",
        EventKind::SubscriberOverflow => "subscriber_overflow",
        EventKind::SubscriberPanicked => "subscriber_panicked",
    }
}

impl From<&Event> for EventView {
    fn from(ev: &Event) -> Self {
        Self {
            seq: ev.seq,
            at: ev.at,
            kind: kind_label(ev.kind),
            job: ev.job.as_deref().map(str::to_string),
            id: ev.id,
            run: ev.run,
            reason: ev.reason.as_deref().map(str::to_string),
            next_run: ev.next_run,
        }
    }
}

async fn events_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| stream_events(socket, state.scheduler))
}

/// Forwards bus events to one WebSocket client as JSON lines.
///
/// A lagging client skips the overwritten events and keeps streaming; a
/// closed socket ends the task.
async fn stream_events(mut socket: WebSocket, scheduler: Scheduler) {
    let mut rx = scheduler.subscribe();
    loop {
        match rx.recv().await {
            Ok(ev) => {
                let view = EventView::from(&ev);
                let text = match serde_json::to_string(&view) {
                    Ok(text) => text,
                    Err(_) => continue,
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(n)) => {
                tracing::debug!(skipped = n, "ws client lagged behind the event bus");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::jobs::{JobSpec, TaskFn};
    use crate::triggers::Trigger;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn state(auth: Option<BasicAuth>) -> AppState {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        scheduler
            .new_job(
                JobSpec::new(
                    Trigger::interval(Duration::from_secs(60)),
                    TaskFn::arc(|_ctx: CancellationToken| async { Ok(()) }),
                )
                .with_name("reporter")
                .with_tags(["nightly"]),
            )
            .unwrap();
        AppState {
            scheduler,
            title: Arc::from("test-ui"),
            auth,
        }
    }

    fn get_request(uri: &str, auth_header: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(value) = auth_header {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn credentials(user: &str, pass: &str) -> String {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    #[tokio::test]
    async fn jobs_listing_without_auth_configured() {
        let app = router(state(None));
        let res = app.oneshot(get_request("/api/jobs", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed[0]["name"], "reporter");
        assert_eq!(parsed[0]["tags"][0], "nightly");
        assert_eq!(parsed[0]["runs_completed"], 0);
    }

    #[tokio::test]
    async fn missing_credentials_get_401_with_challenge() {
        let app = router(state(Some(BasicAuth::new("admin", "admin"))));
        let res = app.oneshot(get_request("/api/jobs", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"restricted\", charset=\"UTF-8\""
        );
    }

    #[tokio::test]
    async fn wrong_credentials_get_401() {
        let app = router(state(Some(BasicAuth::new("admin", "admin"))));
        let res = app
            .oneshot(get_request(
                "/api/jobs",
                Some(&credentials("admin", "nope")),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn correct_credentials_pass_through() {
        let app = router(state(Some(BasicAuth::new("admin", "admin"))));
        let res = app
            .oneshot(get_request(
                "/api/status",
                Some(&credentials("admin", "admin")),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["title"], "test-ui");
        assert_eq!(parsed["jobs"], 1);
    }

    #[test]
    fn event_views_serialize_compactly() {
        let ev = Event::new(EventKind::JobStarting).with_job("reporter").with_run(2);
        let view = EventView::from(&ev);
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&view).unwrap()).unwrap();
        assert_eq!(json["kind"], "job_starting");
        assert_eq!(json["job"], "reporter");
        assert_eq!(json["run"], 2);
        assert!(json.get("reason").is_none());
    }
}
