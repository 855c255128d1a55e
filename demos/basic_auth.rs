//! # Example: basic_auth
//!
//! Serves the read-only UI boundary over a running scheduler, guarded by
//! HTTP Basic authentication with credentials from the environment.
//!
//! ## Flow
//! ```text
//! BasicAuth::from_env() ──► UiServer::new(scheduler)
//!     ├─► GET /api/status   (title + job count)
//!     ├─► GET /api/jobs     (active jobs)
//!     └─► GET /ws           (live event stream)
//! every route: Authorization: Basic …  else 401 + WWW-Authenticate
//! ```
//!
//! ## Run
//! ```bash
//! CRONVISOR_UI_USERNAME=admin CRONVISOR_UI_PASSWORD=admin \
//!     cargo run --example basic_auth --features ui
//! # then: curl -u admin:admin http://127.0.0.1:8080/api/jobs
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use cronvisor::{BasicAuth, JobSpec, Scheduler, SchedulerConfig, TaskFn, Trigger, UiServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let auth = BasicAuth::from_env()?;

    let scheduler = Scheduler::new(SchedulerConfig::default());
    scheduler.new_job(
        JobSpec::new(
            Trigger::interval(Duration::from_secs(5)),
            TaskFn::arc(|_ctx: CancellationToken| async {
                println!("heartbeat");
                Ok(())
            }),
        )
        .with_name("heartbeat")
        .with_tags(["demo"]),
    )?;
    scheduler.start()?;

    let server = UiServer::new(scheduler.clone())
        .with_title("cronvisor demo")
        .with_auth(auth);

    let addr = "127.0.0.1:8080".parse()?;
    let ui = tokio::spawn(server.serve(addr));

    tokio::signal::ctrl_c().await?;
    scheduler.shutdown().await?;
    ui.abort();
    Ok(())
}
