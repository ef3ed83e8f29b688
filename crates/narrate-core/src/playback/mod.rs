//! Starting local playback while audio is still being written

mod launcher;
mod trigger;
mod watcher;

pub use launcher::{find_in_path, Player, PlayerCommand, ProcessPlayer};
pub use trigger::{LaunchStatus, PlaybackTrigger};
pub use watcher::{
    FsProbe, GrowthWatcher, SizeProbe, TriggerReason, WatchHandle, WatchOutcome, WatchState,
};

#[cfg(test)]
pub(crate) use trigger::tests as trigger_tests;
