// Poll scheduler: one independently-timed loop per task, each writing into
// its series window. A failed tick records the error on the task and leaves
// the window untouched; nothing here ever stops on upstream failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::metrics_repo::{ChartQuery, MetricSource, MetricsRepo};
use crate::store::AggregationStore;

/// One named polling task. Created at scheduler start from the static task
/// table and mutated every tick; never destroyed during process lifetime.
pub struct PollTask {
    pub name: &'static str,
    pub interval: Duration,
    pub query: ChartQuery,
    /// Per-sample channel fixup applied before the store append (e.g. rate
    /// charts report signed values; the display wants magnitudes).
    pub transform: Option<fn(&mut [f64])>,
    pub window_capacity: usize,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl PollTask {
    pub fn new(
        name: &'static str,
        interval: Duration,
        query: ChartQuery,
        transform: Option<fn(&mut [f64])>,
        window_capacity: usize,
    ) -> Self {
        Self {
            name,
            interval,
            query,
            transform,
            window_capacity,
            consecutive_failures: 0,
            last_error: None,
        }
    }
}

fn abs_channels(values: &mut [f64]) {
    for v in values.iter_mut() {
        *v = v.abs();
    }
}

/// The static task table: primary metrics at the fast cadence, per-process
/// usage on a slower one.
pub fn build_tasks(config: &AppConfig) -> Vec<PollTask> {
    let primary = Duration::from_millis(config.polling.primary_interval_ms);
    let after = -(config.metrics.lookback_secs as i64);
    let points = config.metrics.points;
    let capacity = config.metrics.window_capacity;

    vec![
        PollTask::new(
            "cpu",
            primary,
            ChartQuery::new("system.cpu", after, points),
            None,
            capacity,
        ),
        PollTask::new(
            "memory",
            primary,
            ChartQuery::new("system.ram", after, points),
            None,
            capacity,
        ),
        PollTask::new(
            "network",
            primary,
            ChartQuery::new("system.net", after, points),
            Some(abs_channels),
            capacity,
        ),
        PollTask::new(
            "disk",
            primary,
            ChartQuery::new("system.io", after, points),
            Some(abs_channels),
            capacity,
        ),
        PollTask::new(
            "load",
            primary,
            ChartQuery::new("system.load", after, points),
            None,
            capacity,
        ),
        PollTask::new(
            "processes",
            Duration::from_millis(config.polling.processes_interval_ms),
            ChartQuery::new("apps.cpu", -1, 1),
            None,
            1,
        ),
    ]
}

/// One tick: fetch, transform, append. Success resets the failure counter;
/// failure records the error and leaves the window as it was.
pub async fn run_tick<S: MetricSource>(task: &mut PollTask, source: &S, store: &AggregationStore) {
    match source.fetch(&task.query).await {
        Ok(mut slice) => {
            if let Some(transform) = task.transform {
                for sample in &mut slice.samples {
                    transform(&mut sample.values);
                }
            }
            store.append(task.name, slice.labels, slice.samples).await;
            task.consecutive_failures = 0;
            task.last_error = None;
        }
        Err(e) => {
            task.consecutive_failures += 1;
            task.last_error = Some(e.to_string());
            warn!(
                task = task.name,
                error = %e,
                consecutive_failures = task.consecutive_failures,
                "poll failed, keeping stale window"
            );
        }
    }
}

/// Shared tick/failure counters for the periodic app-stats log line.
#[derive(Default)]
pub struct SchedulerStats {
    pub ticks_total: AtomicU64,
    pub failures_total: AtomicU64,
}

pub struct SchedulerDeps {
    pub metrics_repo: Arc<MetricsRepo>,
    pub store: Arc<AggregationStore>,
    pub stats: Arc<SchedulerStats>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Spawns every poll loop plus the status (alarms/host/catalog) loop and the
/// app-stats logger. Each task owns its cadence; one task's failure never
/// delays another's schedule.
pub fn spawn(deps: SchedulerDeps, config: &AppConfig) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    for task in build_tasks(config) {
        deps.store.register(task.name, task.window_capacity);
        handles.push(spawn_poll_loop(
            task,
            deps.metrics_repo.clone(),
            deps.store.clone(),
            deps.stats.clone(),
            deps.shutdown_rx.clone(),
        ));
    }

    handles.push(spawn_status_loop(
        deps.metrics_repo.clone(),
        Duration::from_millis(config.polling.alerts_interval_ms),
        deps.shutdown_rx.clone(),
    ));

    handles.push(spawn_stats_logger(
        deps.stats.clone(),
        Duration::from_secs(config.polling.stats_log_interval_secs),
        deps.shutdown_rx.clone(),
    ));

    handles
}

fn spawn_poll_loop(
    mut task: PollTask,
    metrics_repo: Arc<MetricsRepo>,
    store: Arc<AggregationStore>,
    stats: Arc<SchedulerStats>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(task = task.name, interval = ?task.interval, "starting poll loop");
        let mut tick = interval(task.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    // Shutdown cancels an in-flight fetch before anything is
                    // written; a late result is discarded with the future.
                    tokio::select! {
                        _ = run_tick(&mut task, metrics_repo.as_ref(), store.as_ref()) => {
                            stats.ticks_total.fetch_add(1, Ordering::Relaxed);
                            if task.consecutive_failures > 0 {
                                stats.failures_total.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        _ = shutdown_rx.changed() => break,
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }
        debug!(task = task.name, "poll loop shutting down");
    })
}

fn spawn_status_loop(
    metrics_repo: Arc<MetricsRepo>,
    refresh_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(refresh_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut consecutive_failures: u32 = 0;
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    match metrics_repo.refresh_status().await {
                        Ok(()) => consecutive_failures = 0,
                        Err(e) => {
                            consecutive_failures += 1;
                            warn!(
                                error = %e,
                                consecutive_failures,
                                operation = "refresh_status",
                                "status refresh failed, keeping stale values"
                            );
                        }
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }
        debug!("status loop shutting down");
    })
}

fn spawn_stats_logger(
    stats: Arc<SchedulerStats>,
    log_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(log_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    info!(
                        ticks_total = stats.ticks_total.load(Ordering::Relaxed),
                        failures_total = stats.failures_total.load(Ordering::Relaxed),
                        "app stats"
                    );
                }
                _ = shutdown_rx.changed() => break,
            }
        }
    })
}
