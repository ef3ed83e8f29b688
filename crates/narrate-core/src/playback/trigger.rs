//! Once-only playback start guard

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use super::launcher::Player;

/// Result of a trigger attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStatus {
    /// The player process was started
    Launched,
    /// Starting the player failed; synthesis is unaffected
    Failed(String),
    /// Triggered, but there was no file to play
    NothingToPlay,
    /// An earlier attempt already consumed the trigger
    AlreadyStarted,
}

/// Starts playback at most once, however many times it is fired.
pub struct PlaybackTrigger {
    started: AtomicBool,
    player: Arc<dyn Player>,
}

impl PlaybackTrigger {
    pub fn new(player: Arc<dyn Player>) -> Self {
        Self {
            started: AtomicBool::new(false),
            player,
        }
    }

    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    fn claim(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Launch the player against `path` if nothing has been launched yet.
    pub fn fire(&self, path: &Path) -> LaunchStatus {
        if !self.claim() {
            return LaunchStatus::AlreadyStarted;
        }

        match self.player.launch(path) {
            Ok(()) => {
                info!("Playback started for {:?}", path);
                LaunchStatus::Launched
            }
            Err(e) => {
                warn!("Playback failed for {:?}: {}", path, e);
                LaunchStatus::Failed(e.to_string())
            }
        }
    }

    /// Consume the trigger without launching anything.
    pub fn abandon(&self) -> LaunchStatus {
        if self.claim() {
            LaunchStatus::NothingToPlay
        } else {
            LaunchStatus::AlreadyStarted
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records every launch instead of starting a process.
    #[derive(Default)]
    pub(crate) struct RecordingPlayer {
        pub launches: Mutex<Vec<PathBuf>>,
        pub fail: bool,
    }

    impl RecordingPlayer {
        pub fn launch_count(&self) -> usize {
            self.launches.lock().unwrap().len()
        }
    }

    impl Player for RecordingPlayer {
        fn launch(&self, path: &Path) -> Result<()> {
            self.launches.lock().unwrap().push(path.to_path_buf());
            if self.fail {
                Err(Error::PlaybackUnavailable("no player".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_fires_once() {
        let player = Arc::new(RecordingPlayer::default());
        let trigger = PlaybackTrigger::new(player.clone());
        assert!(!trigger.has_started());

        assert_eq!(trigger.fire(Path::new("a.mp3")), LaunchStatus::Launched);
        assert!(trigger.has_started());
        assert_eq!(trigger.fire(Path::new("a.mp3")), LaunchStatus::AlreadyStarted);
        assert_eq!(trigger.abandon(), LaunchStatus::AlreadyStarted);
        assert_eq!(player.launch_count(), 1);
    }

    #[test]
    fn test_launch_failure_is_reported_not_raised() {
        let player = Arc::new(RecordingPlayer {
            fail: true,
            ..Default::default()
        });
        let trigger = PlaybackTrigger::new(player);
        assert!(matches!(
            trigger.fire(Path::new("a.mp3")),
            LaunchStatus::Failed(_)
        ));
        assert_eq!(trigger.fire(Path::new("a.mp3")), LaunchStatus::AlreadyStarted);
    }

    #[test]
    fn test_concurrent_fire() {
        let player = Arc::new(RecordingPlayer::default());
        let trigger = Arc::new(PlaybackTrigger::new(player.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let trigger = trigger.clone();
                std::thread::spawn(move || trigger.fire(Path::new("a.mp3")))
            })
            .collect();
        let launched = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|s| *s == LaunchStatus::Launched)
            .count();

        assert_eq!(launched, 1);
        assert_eq!(player.launch_count(), 1);
    }
}
