//! Output file growth watcher
//!
//! The writer draining a speech stream has no progress callback, so the
//! watcher infers "enough audio is buffered" from the output file's size
//! alone. It runs as its own task:
//!
//! ```text
//! Idle -> Polling -> Triggered
//!         Polling -> TimedOut -> Triggered
//! ```
//!
//! Each poll waits one interval and then stats the file. The first poll that
//! sees at least `min_start_bytes` fires the [`PlaybackTrigger`]. When the
//! poll budget runs out the trigger is fired anyway, against whatever has been
//! written. The session may also report that the writer finished, in which
//! case the complete file is played right away.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::trigger::{LaunchStatus, PlaybackTrigger};
use crate::audio::AudioFormat;
use crate::config::PlaybackConfig;

/// Reads the current size of a file. `Ok(None)` means it does not exist yet.
pub trait SizeProbe: Send + Sync + 'static {
    fn size(&self, path: &Path) -> io::Result<Option<u64>>;
}

/// Probe backed by filesystem metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl SizeProbe for FsProbe {
    fn size(&self, path: &Path) -> io::Result<Option<u64>> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Polling,
    TimedOut,
    Triggered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The size threshold was crossed
    Threshold,
    /// The writer completed before the threshold was reached
    WriterFinished,
    /// The poll budget ran out
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Triggered {
        reason: TriggerReason,
        polls: u32,
        observed_bytes: Option<u64>,
        launch: LaunchStatus,
    },
    Cancelled {
        polls: u32,
    },
}

impl WatchOutcome {
    pub fn launch(&self) -> Option<&LaunchStatus> {
        match self {
            WatchOutcome::Triggered { launch, .. } => Some(launch),
            WatchOutcome::Cancelled { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Running,
    WriterFinished,
    Cancel,
}

/// Polls a path until it is large enough to start playback.
pub struct GrowthWatcher {
    path: PathBuf,
    min_start_bytes: u64,
    interval: Duration,
    max_polls: u32,
    probe: Arc<dyn SizeProbe>,
}

impl GrowthWatcher {
    pub fn new(path: impl Into<PathBuf>, min_start_bytes: u64) -> Self {
        let defaults = PlaybackConfig::default();
        Self {
            path: path.into(),
            min_start_bytes,
            interval: defaults.poll_interval(),
            max_polls: defaults.max_polls,
            probe: Arc::new(FsProbe),
        }
    }

    pub fn from_config(
        path: impl Into<PathBuf>,
        config: &PlaybackConfig,
        format: AudioFormat,
    ) -> Self {
        Self::new(path, config.start_bytes(format))
            .with_interval(config.poll_interval())
            .with_max_polls(config.max_polls)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn SizeProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Start polling on the current tokio runtime.
    pub fn spawn(self, trigger: Arc<PlaybackTrigger>) -> WatchHandle {
        let (state_tx, state_rx) = watch::channel(WatchState::Idle);
        let (signal_tx, signal_rx) = watch::channel(Signal::Running);

        let task = tokio::spawn(self.run(trigger, signal_rx, state_tx));

        WatchHandle {
            task,
            state: state_rx,
            signal: signal_tx,
        }
    }

    async fn run(
        self,
        trigger: Arc<PlaybackTrigger>,
        mut signal: watch::Receiver<Signal>,
        state: watch::Sender<WatchState>,
    ) -> WatchOutcome {
        state.send_replace(WatchState::Polling);
        debug!(
            "Watching {:?}: start at {} bytes, every {:?}, at most {} polls",
            self.path, self.min_start_bytes, self.interval, self.max_polls
        );

        let mut last_size = None;
        for poll in 1..=self.max_polls {
            let writer_done = tokio::select! {
                _ = tokio::time::sleep(self.interval) => false,
                sig = next_signal(&mut signal) => match sig {
                    Signal::Cancel => {
                        state.send_replace(WatchState::Cancelled);
                        debug!("Watcher for {:?} cancelled after {} polls", self.path, poll - 1);
                        return WatchOutcome::Cancelled { polls: poll - 1 };
                    }
                    Signal::WriterFinished => true,
                    Signal::Running => false,
                },
            };

            match self.probe.size(&self.path) {
                Ok(Some(size)) => {
                    last_size = Some(size);
                    if size >= self.min_start_bytes {
                        let reason = TriggerReason::Threshold;
                        return self.trigger(reason, poll, last_size, &trigger, &state);
                    }
                }
                Ok(None) => debug!("Poll {}: {:?} not created yet", poll, self.path),
                Err(e) => debug!("Poll {}: stat {:?} failed: {}", poll, self.path, e),
            }

            if writer_done {
                let reason = TriggerReason::WriterFinished;
                return self.trigger(reason, poll, last_size, &trigger, &state);
            }
        }

        state.send_replace(WatchState::TimedOut);
        warn!(
            "{:?} stayed below {} bytes for {} polls, starting playback anyway",
            self.path, self.min_start_bytes, self.max_polls
        );
        self.trigger(TriggerReason::Timeout, self.max_polls, last_size, &trigger, &state)
    }

    fn trigger(
        &self,
        reason: TriggerReason,
        polls: u32,
        observed_bytes: Option<u64>,
        trigger: &PlaybackTrigger,
        state: &watch::Sender<WatchState>,
    ) -> WatchOutcome {
        let launch = match observed_bytes {
            Some(bytes) => {
                info!("Starting playback after {} polls ({:?}, {} bytes)", polls, reason, bytes);
                trigger.fire(&self.path)
            }
            None => {
                warn!("{:?} was never created, nothing to play", self.path);
                trigger.abandon()
            }
        };
        state.send_replace(WatchState::Triggered);

        WatchOutcome::Triggered {
            reason,
            polls,
            observed_bytes,
            launch,
        }
    }
}

/// Resolves on the next control signal; never resolves once the handle is
/// gone.
async fn next_signal(rx: &mut watch::Receiver<Signal>) -> Signal {
    if rx.changed().await.is_err() {
        std::future::pending::<()>().await;
    }
    *rx.borrow_and_update()
}

/// Control and completion handle for a spawned [`GrowthWatcher`].
pub struct WatchHandle {
    task: JoinHandle<WatchOutcome>,
    state: watch::Receiver<WatchState>,
    signal: watch::Sender<Signal>,
}

impl WatchHandle {
    pub fn state(&self) -> WatchState {
        *self.state.borrow()
    }

    /// Receiver for state changes.
    pub fn subscribe(&self) -> watch::Receiver<WatchState> {
        self.state.clone()
    }

    /// Tell the watcher the file is complete.
    pub fn writer_finished(&self) {
        self.signal.send_if_modified(|s| {
            if *s == Signal::Running {
                *s = Signal::WriterFinished;
                true
            } else {
                false
            }
        });
    }

    /// Stop polling. A watcher that already triggered is unaffected.
    pub fn cancel(&self) {
        self.signal.send_replace(Signal::Cancel);
    }

    /// Wait for the watcher to reach a terminal state.
    pub async fn wait(self) -> WatchOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Watcher task ended abnormally: {}", e);
                WatchOutcome::Cancelled { polls: 0 }
            }
        }
    }
}
