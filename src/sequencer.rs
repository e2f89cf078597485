// ⏱️ Staged Sequencer - Timed progress stages driven by an explicit clock
//
// The sequencer never sleeps. Callers poll it with the current instant (the
// TUI on every tick, the CLI after sleeping until `next_deadline`). A late
// poll enters every overdue stage in order, so no stage is ever skipped or
// entered twice.

use crate::error::AuditError;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

// ============================================================================
// CLOCK
// ============================================================================

pub trait Clock {
    /// Monotonic time used for stage deadlines
    fn now(&self) -> Instant;

    /// Wall-clock time stamped on generated artifacts
    fn wall_time(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base_instant: Instant,
    base_wall: DateTime<Utc>,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new(base_wall: DateTime<Utc>) -> Self {
        ManualClock {
            base_instant: Instant::now(),
            base_wall,
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }

    fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base_instant + self.elapsed()
    }

    fn wall_time(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.elapsed()).unwrap_or_else(|_| chrono::Duration::zero());
        self.base_wall + elapsed
    }
}

// ============================================================================
// CANCELLATION
// ============================================================================

/// Shared flag owned by the view that started a run.
/// Once cancelled it stays cancelled; a new run gets a new token.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// STAGES + DELAYS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub label: String,
    /// Delay used by `DelayPolicy::Fixed`
    pub duration: Duration,
}

impl Stage {
    pub fn new(label: &str, duration_ms: u64) -> Self {
        Stage {
            label: label.to_string(),
            duration: Duration::from_millis(duration_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    /// Each stage waits its own declared duration
    Fixed,
    /// Each stage waits a uniform random delay in [min, max]
    Jittered { min: Duration, max: Duration },
}

impl DelayPolicy {
    /// One to two seconds per stage
    pub fn default_jitter() -> Self {
        DelayPolicy::Jittered {
            min: Duration::from_millis(1000),
            max: Duration::from_millis(2000),
        }
    }

    pub fn delay_for(&self, stage: &Stage) -> Duration {
        match *self {
            DelayPolicy::Fixed => stage.duration,
            DelayPolicy::Jittered { min, max } => {
                let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
                let ms = rand::thread_rng().gen_range(lo.as_millis() as u64..=hi.as_millis() as u64);
                Duration::from_millis(ms)
            }
        }
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        DelayPolicy::Fixed
    }
}

// ============================================================================
// SEQUENCER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running { index: usize, deadline: Instant },
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    StageEntered { index: usize, label: String },
    Finished,
}

pub struct StagedSequencer {
    stages: Vec<Stage>,
    policy: DelayPolicy,
    state: SequencerState,
    token: CancelToken,
}

impl StagedSequencer {
    pub fn new(stages: Vec<Stage>, policy: DelayPolicy) -> Self {
        StagedSequencer {
            stages,
            policy,
            state: SequencerState::Idle,
            token: CancelToken::new(),
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SequencerState::Running { .. })
    }

    /// Token cancelling the current run; `start` issues a fresh one
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn current_stage(&self) -> Option<&Stage> {
        match self.state {
            SequencerState::Running { index, .. } => self.stages.get(index),
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            SequencerState::Running { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Start a run at `now`. Returns the events emitted immediately: the
    /// first stage, or `Finished` when there are no stages.
    pub fn start(&mut self, now: Instant) -> Result<Vec<SequencerEvent>, AuditError> {
        if self.is_running() {
            return Err(AuditError::AlreadyRunning);
        }

        self.token = CancelToken::new();

        match self.stages.first() {
            Some(first) => {
                let deadline = now + self.policy.delay_for(first);
                self.state = SequencerState::Running { index: 0, deadline };
                debug!(stage = %first.label, "sequencer started");
                Ok(vec![SequencerEvent::StageEntered {
                    index: 0,
                    label: first.label.clone(),
                }])
            }
            None => {
                self.state = SequencerState::Finished;
                Ok(vec![SequencerEvent::Finished])
            }
        }
    }

    /// Advance through every stage whose deadline has passed
    pub fn poll(&mut self, now: Instant) -> Vec<SequencerEvent> {
        let mut events = Vec::new();

        if self.token.is_cancelled() {
            if self.is_running() {
                debug!("sequencer cancelled");
                self.state = SequencerState::Cancelled;
            }
            return events;
        }

        while let SequencerState::Running { index, deadline } = self.state {
            if now < deadline {
                break;
            }

            let next = index + 1;
            match self.stages.get(next) {
                Some(stage) => {
                    // Chain from the previous deadline so late polls keep the schedule
                    let next_deadline = deadline + self.policy.delay_for(stage);
                    self.state = SequencerState::Running {
                        index: next,
                        deadline: next_deadline,
                    };
                    events.push(SequencerEvent::StageEntered {
                        index: next,
                        label: stage.label.clone(),
                    });
                }
                None => {
                    self.state = SequencerState::Finished;
                    events.push(SequencerEvent::Finished);
                }
            }
        }

        events
    }

    pub fn cancel(&mut self) {
        self.token.cancel();
        if self.is_running() {
            self.state = SequencerState::Cancelled;
        }
    }
}
