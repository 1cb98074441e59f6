//! Scheduler module: drives probe cycles and dispatches their outcomes.

use crate::config::MonitorConfig;
use crate::logsink::LogSink;
use crate::monitor::{AlertPolicy, Event, MonitorContext, TransitionEngine};
use crate::notify::{render, Notifier, NotifierGateway};
use crate::probe::{Outcome, Prober};

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

const LOOP_STARTED: &str = "=== Uptime Monitor loop started ===";

/// Owns the monitor context and runs probe cycles over a fixed target list.
pub struct Monitor {
    targets: Vec<String>,
    probe_timeout: Duration,
    check_interval: Duration,
    prober: Arc<dyn Prober>,
    gateway: NotifierGateway,
    sink: LogSink,
    engine: TransitionEngine,
    ctx: MonitorContext,
    semaphore: Arc<Semaphore>,
}

impl Monitor {
    /// Create a monitor for the configured targets.
    pub fn new(cfg: &MonitorConfig, prober: Arc<dyn Prober>, notifier: Arc<dyn Notifier>) -> Self {
        let policy = AlertPolicy {
            slow_threshold_secs: cfg.slow_threshold_secs,
            slow_cooldown_secs: cfg.slow_cooldown_secs,
            down_repeat_interval_secs: cfg.down_repeat_interval_secs,
        };

        Self {
            targets: cfg.targets.clone(),
            probe_timeout: cfg.probe_timeout,
            check_interval: cfg.check_interval,
            prober,
            gateway: NotifierGateway::new(notifier),
            sink: LogSink::new(&cfg.log_path),
            engine: TransitionEngine::new(policy),
            ctx: MonitorContext::new(cfg.history_size),
            semaphore: Arc::new(Semaphore::new(cfg.probe_concurrency.max(1))),
        }
    }

    pub fn context(&self) -> &MonitorContext {
        &self.ctx
    }

    /// Probe every target once and handle the outcomes.
    ///
    /// Returns `true` when every target was UP.
    pub async fn check_once(&mut self, notify: bool) -> bool {
        let outcomes = self.probe_all().await;

        let mut all_up = true;
        for (target, outcome) in outcomes {
            all_up &= outcome.is_up();
            self.handle(&target, &outcome, notify).await;
        }
        all_up
    }

    /// Run probe cycles forever, pausing `check_interval` between cycles.
    pub async fn run_forever(&mut self) {
        self.append(LOOP_STARTED);
        tracing::info!(
            "Monitoring {} targets every {:?}",
            self.targets.len(),
            self.check_interval
        );

        loop {
            let all_up = self.check_once(true).await;
            tracing::debug!("Cycle over {} targets finished, all up: {}", self.ctx.len(), all_up);
            tokio::time::sleep(self.check_interval).await;
        }
    }

    /// Log an outcome, run it through the transition engine and notify on the
    /// resulting event when `notify` is set.
    pub async fn handle(&mut self, target: &str, outcome: &Outcome, notify: bool) -> Option<Event> {
        self.append(&outcome.log_line(target));

        let event = self.engine.evaluate(&mut self.ctx, target, outcome)?;
        tracing::info!("{} event for {}", event.name(), event.target());

        if event.is_status_change() {
            if let Some(history) = self.ctx.history(target) {
                let line = format!("[HISTORY] {} :: {}", target, history.summary());
                self.append(&line);
            }
        }

        if notify {
            self.gateway.notify(&render(&event)).await;
        }

        Some(event)
    }

    /// Probe all targets, at most `probe_concurrency` at a time, and return
    /// the outcomes in target order.
    async fn probe_all(&self) -> Vec<(String, Outcome)> {
        let handles: Vec<_> = self
            .targets
            .iter()
            .map(|target| {
                let prober = self.prober.clone();
                let semaphore = self.semaphore.clone();
                let target = target.clone();
                let timeout = self.probe_timeout;

                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    prober.probe(&target, timeout).await
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (target, handle) in self.targets.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Probe task for {} failed: {}", target, e);
                    Outcome::failed(format!("probe task failed: {}", e), Utc::now())
                }
            };
            outcomes.push((target.clone(), outcome));
        }
        outcomes
    }

    fn append(&self, line: &str) {
        if let Err(e) = self.sink.append(line) {
            tracing::error!("Failed to write uptime log: {}", e);
        }
    }
}
