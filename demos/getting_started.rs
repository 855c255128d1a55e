//! # Example: getting_started
//!
//! Tour of the trigger kinds and job options:
//! - fixed and random intervals
//! - a cron expression
//! - a daily calendar rule
//! - a one-time run
//! - a singleton job and a run-limited job with lifecycle hooks
//!
//! ## Flow
//! ```text
//! JobSpec ──► Scheduler::new_job()   (admission, next_run_at computed)
//!     ├─► Scheduler::start()         (dispatch loop begins)
//!     ├─► ctrl-c
//!     └─► Scheduler::shutdown()      (cancel, drain, exit)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example getting_started
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;

use cronvisor::{
    Calendar, JobSpec, LogWriter, Scheduler, SchedulerConfig, SingletonMode, TaskFn, Trigger,
};

fn say(line: &'static str) -> cronvisor::TaskRef {
    TaskFn::arc(move |_ctx: CancellationToken| async move {
        println!("{line}");
        Ok(())
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let scheduler = Scheduler::builder(SchedulerConfig {
        grace: Duration::from_secs(5),
        ..SchedulerConfig::default()
    })
    .with_subscriber(Arc::new(LogWriter))
    .build();

    // Fixed interval: every 3 seconds.
    scheduler.new_job(
        JobSpec::new(Trigger::interval(Duration::from_secs(3)), say("tick"))
            .with_name("ticker")
            .with_tags(["demo", "interval"]),
    )?;

    // Random interval: somewhere between 2 and 6 seconds after each run.
    scheduler.new_job(
        JobSpec::new(
            Trigger::random_interval(Duration::from_secs(2), Duration::from_secs(6)),
            say("surprise"),
        )
        .with_name("jitterbug"),
    )?;

    // Cron: top of every minute.
    scheduler.new_job(
        JobSpec::new(Trigger::cron("* * * * *", false)?, say("minute mark"))
            .with_name("cron-minutely"),
    )?;

    // Calendar: every day at 10:30 and 18:00 UTC.
    let daily = Calendar::daily(
        1,
        vec![
            NaiveTime::from_hms_opt(10, 30, 0).expect("valid time"),
            NaiveTime::from_hms_opt(18, 0, 0).expect("valid time"),
        ],
    );
    scheduler.new_job(
        JobSpec::new(Trigger::calendar(daily), say("calendar slot")).with_name("twice-a-day"),
    )?;

    // One-time: ten seconds from now, then the job removes itself.
    scheduler.new_job(
        JobSpec::new(
            Trigger::one_time(Utc::now() + TimeDelta::seconds(10)),
            say("this happens once"),
        )
        .with_name("once"),
    )?;

    // Singleton: a slow job on a fast trigger; overlapping ticks are skipped.
    scheduler.new_job(
        JobSpec::new(
            Trigger::interval(Duration::from_secs(2)),
            TaskFn::arc(|_ctx: CancellationToken| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                println!("slow work done");
                Ok(())
            }),
        )
        .with_name("slowpoke")
        .with_singleton(SingletonMode::Skip),
    )?;

    // Run-limited with hooks: exactly three runs, then gone.
    let handle = scheduler.new_job(
        JobSpec::new(Trigger::interval(Duration::from_secs(4)), say("counted"))
            .with_name("limited")
            .with_run_limit(3)
            .with_before_hook(|_, name| {
                println!("[hook] {name} about to run");
                Ok(())
            })
            .with_after_hook(|_, name, outcome| {
                println!("[hook] {name} finished: ok={}", outcome.is_ok());
            }),
    )?;
    println!(
        "registered {} (first run at {:?})",
        handle.name().unwrap_or("?"),
        handle.next_run_at()
    );

    scheduler.start()?;
    println!("scheduler running with {} jobs; ctrl-c to stop", scheduler.jobs().len());

    tokio::signal::ctrl_c().await?;
    if let Err(e) = scheduler.shutdown().await {
        eprintln!("shutdown incomplete: {e} ({})", e.as_label());
    }
    println!("bye");
    Ok(())
}
