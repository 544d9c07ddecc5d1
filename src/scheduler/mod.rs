//! Window-based polling loop.
//!
//! ```text
//!   start ──▶ Running { window_end } ── tick ──▶ cycle (unless one is in flight)
//!                 ▲                      │
//!                 │                  now ≥ window_end
//!                 │                      ▼
//!            sleep(tick) ◀──────── reset store + cache, Idle
//! ```
//!
//! One ticker drives everything. Each cycle runs as its own task so a slow
//! fetch never delays the deadline check; while it is still running, ticks
//! are skipped.

pub mod pipeline;

pub use pipeline::{CycleOutcome, EventPipeline};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running { window_end: Instant },
}

impl SchedulerState {
    pub fn is_running(&self) -> bool {
        matches!(self, SchedulerState::Running { .. })
    }
}

/// Handle of the fetch cycle currently in flight, shared by the loop and `stop()`.
type CycleSlot = Arc<Mutex<Option<JoinHandle<()>>>>;

pub struct CycleScheduler {
    pipeline: EventPipeline,
    state: Arc<watch::Sender<SchedulerState>>,
    task: Mutex<Option<JoinHandle<()>>>,
    in_flight: CycleSlot,
}

impl CycleScheduler {
    pub fn new(pipeline: EventPipeline) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        CycleScheduler {
            pipeline,
            state: Arc::new(state),
            task: Mutex::new(None),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Start polling every `tick`, resetting all state every `window`.
    /// Returns `false` if the loop is already running, including the gap
    /// between two windows.
    pub async fn start(&self, tick: Duration, window: Duration) -> bool {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            if self.state().is_running() {
                warn!("Fetching is already running.");
            } else {
                warn!("Next simulation window is about to start; ignoring start.");
            }
            return false;
        }

        let pipeline = self.pipeline.clone();
        let state = Arc::clone(&self.state);
        let in_flight = Arc::clone(&self.in_flight);
        *task = Some(tokio::spawn(async move {
            loop {
                run_window(&pipeline, &state, &in_flight, tick, window).await;
                tokio::time::sleep(tick).await;
            }
        }));
        true
    }

    /// Stop the loop and any cycle still in flight, then go Idle.
    /// Stored events are left as they are.
    pub async fn stop(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
            let _ = task.await;
        }
        abort_in_flight(&self.in_flight).await;
        self.state.send_replace(SchedulerState::Idle);
        info!("Scheduler stopped.");
    }
}

/// Abort the pending cycle, if any, and wait until it can no longer merge.
async fn abort_in_flight(slot: &CycleSlot) {
    if let Some(cycle) = slot.lock().await.take() {
        if !cycle.is_finished() {
            warn!("Aborting fetch cycle still in flight");
            cycle.abort();
        }
        let _ = cycle.await;
    }
}

async fn run_window(
    pipeline: &EventPipeline,
    state: &watch::Sender<SchedulerState>,
    in_flight: &CycleSlot,
    tick: Duration,
    window: Duration,
) {
    let started = Instant::now();
    let window_end = started + window;
    state.send_replace(SchedulerState::Running { window_end });
    info!(
        "Simulation window started (tick={:?}, duration={:?})",
        tick, window
    );

    let mut ticker = tokio::time::interval_at(started + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        if Instant::now() >= window_end {
            // A cycle straddling the boundary must not merge into the next window.
            abort_in_flight(in_flight).await;
            pipeline.reset_window().await;
            state.send_replace(SchedulerState::Idle);
            info!("Simulation period completed. Ready for the next one.");
            return;
        }

        let mut slot = in_flight.lock().await;
        if slot.as_ref().is_some_and(|c| !c.is_finished()) {
            debug!("Previous fetch cycle still running, skipping tick");
            continue;
        }

        let pipeline = pipeline.clone();
        *slot = Some(tokio::spawn(async move {
            match pipeline.run_cycle().await {
                Ok(outcome) => debug!("Cycle finished: {:?}", outcome),
                Err(e) => error!("Error running event processor: {:#}", e),
            }
        }));
    }
}
