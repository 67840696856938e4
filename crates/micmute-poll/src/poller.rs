//! Periodic mute status polling.
//!
//! A [`StatusPoller`] runs one schedule task on a tokio runtime. Every tick
//! it spawns at most one query against its [`MicStatusSource`]; ticks that
//! land while a query is still outstanding are skipped. Results are
//! committed to a single atomic cell, so readers never wait on a query.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use micmute_core::{Encoding, MuteState};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::{MicStatusSource, PollerError, QueryError, Result};

type Listener = Arc<dyn Fn(MuteState) + Send + Sync>;

/// State shared between the poller handle, its schedule and its queries.
struct Shared {
    /// `true` when the last committed state is muted
    muted: AtomicBool,
    /// Bumped on every start and stop. A query only commits if the
    /// generation it was issued under is still current.
    generation: Mutex<u64>,
    in_flight: AtomicBool,
    failures: AtomicU32,
}

impl Shared {
    fn state(&self) -> MuteState {
        MuteState::from(self.muted.load(Ordering::Acquire))
    }

    /// Commit a query result. Returns the new state if it changed.
    fn commit(&self, generation: u64, state: MuteState) -> Option<MuteState> {
        let current = self.generation.lock();
        if *current != generation {
            debug!(state = ?state, "discarding result of a stopped schedule");
            return None;
        }
        let previous = self.muted.swap(state.is_muted(), Ordering::AcqRel);
        (previous != state.is_muted()).then_some(state)
    }

    fn advance_generation(&self) -> u64 {
        let mut generation = self.generation.lock();
        *generation += 1;
        *generation
    }

    fn is_current(&self, generation: u64) -> bool {
        *self.generation.lock() == generation
    }

    fn record_success(&self, source: &str) {
        let streak = self.failures.swap(0, Ordering::Relaxed);
        if streak > 0 {
            info!(source, failures = streak, "mic status source recovered");
        }
    }

    fn record_failure(&self, source: &str, error: &QueryError) {
        let streak = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        if streak == 1 {
            warn!(source, "Failed to query mic status, keeping last state: {}", error);
        } else {
            debug!(source, failures = streak, error = %error, "mic status query failed again");
        }
    }
}

/// Marks a query as outstanding for as long as it is alive.
struct InFlightGuard {
    shared: Arc<Shared>,
}

impl InFlightGuard {
    fn acquire(shared: &Arc<Shared>) -> Option<Self> {
        shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                shared: shared.clone(),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.shared.in_flight.store(false, Ordering::Release);
    }
}

/// Keeps a [`MuteState`] up to date by periodically querying a status
/// source.
pub struct StatusPoller {
    source: Arc<dyn MicStatusSource>,
    shared: Arc<Shared>,
    listener: Option<Listener>,
    runtime: Handle,
    schedule: Mutex<Option<JoinHandle<()>>>,
}

impl StatusPoller {
    /// Create a stopped poller whose tasks run on `runtime`.
    pub fn new(source: Arc<dyn MicStatusSource>, runtime: Handle) -> Self {
        Self {
            source,
            shared: Arc::new(Shared {
                muted: AtomicBool::new(MuteState::default().is_muted()),
                generation: Mutex::new(0),
                in_flight: AtomicBool::new(false),
                failures: AtomicU32::new(0),
            }),
            listener: None,
            runtime,
            schedule: Mutex::new(None),
        }
    }

    /// Call `listener` every time a committed result changes the state.
    pub fn with_listener(mut self, listener: impl Fn(MuteState) + Send + Sync + 'static) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Start polling every `interval_ms` milliseconds. Does nothing if the
    /// poller is already running.
    pub fn start(&self, interval_ms: u64) -> Result<()> {
        self.start_with(Duration::from_millis(interval_ms))
    }

    /// Start polling with the given period. Does nothing if the poller is
    /// already running.
    pub fn start_with(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(PollerError::Configuration {
                interval_ms: interval.as_millis() as u64,
            });
        }

        let mut schedule = self.schedule.lock();
        if schedule.is_some() {
            debug!("poller already running, ignoring start");
            return Ok(());
        }

        let generation = self.shared.advance_generation();
        info!(
            source = self.source.name(),
            interval = ?interval,
            generation,
            "starting mic status poller"
        );
        schedule.replace(self.runtime.spawn(run_schedule(
            self.source.clone(),
            self.shared.clone(),
            self.listener.clone(),
            generation,
            interval,
        )));
        Ok(())
    }

    /// Stop polling. A query that is already outstanding is left to finish
    /// but its result is dropped.
    pub fn stop(&self) {
        let Some(schedule) = self.schedule.lock().take() else {
            return;
        };
        self.shared.advance_generation();
        schedule.abort();
        info!(source = self.source.name(), "stopped mic status poller");
    }

    /// The last committed mute state.
    pub fn current_state(&self) -> MuteState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.schedule.lock().is_some()
    }

    /// Whether a query is outstanding right now.
    pub fn in_flight(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_schedule(
    source: Arc<dyn MicStatusSource>,
    shared: Arc<Shared>,
    listener: Option<Listener>,
    generation: u64,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if !shared.is_current(generation) {
            break;
        }

        let Some(guard) = InFlightGuard::acquire(&shared) else {
            trace!("previous query still outstanding, skipping tick");
            continue;
        };

        tokio::spawn(run_cycle(
            source.clone(),
            shared.clone(),
            listener.clone(),
            generation,
            guard,
        ));
    }
}

async fn run_cycle(
    source: Arc<dyn MicStatusSource>,
    shared: Arc<Shared>,
    listener: Option<Listener>,
    generation: u64,
    _guard: InFlightGuard,
) {
    let result = source.get_mic_status().await;
    // Neither the state nor the failure streak belong to a stopped schedule
    if !shared.is_current(generation) {
        debug!(ok = result.is_ok(), "dropping mic status of a stopped schedule");
        return;
    }

    match result {
        Ok(raw) => {
            shared.record_success(source.name());

            let encoding = Encoding::classify(&raw);
            if !encoding.is_recognized() {
                debug!(raw = %raw.trim(), "unrecognized mic status, treating as unmuted");
            }

            if let Some(state) = shared.commit(generation, encoding.state()) {
                debug!(state = ?state, "mic state changed");
                if let Some(listener) = &listener {
                    listener(state);
                }
            }
        }
        Err(e) => shared.record_failure(source.name(), &e),
    }
}
