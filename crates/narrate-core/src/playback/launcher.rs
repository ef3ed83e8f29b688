//! Local media player processes

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::error::{Error, Result};

/// Something that can start playing a file
pub trait Player: Send + Sync {
    /// Start playback of `path` without waiting for it to finish.
    fn launch(&self, path: &Path) -> Result<()>;
}

#[cfg(target_os = "macos")]
const PLAYER_CANDIDATES: &[(&str, &[&str])] = &[("afplay", &[])];

#[cfg(not(target_os = "macos"))]
const PLAYER_CANDIDATES: &[(&str, &[&str])] = &[
    ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
    ("mpv", &["--no-video", "--really-quiet"]),
    ("mpg123", &["-q"]),
];

#[cfg(target_os = "macos")]
const DEFAULT_OPENER: &str = "open";

#[cfg(not(target_os = "macos"))]
const DEFAULT_OPENER: &str = "xdg-open";

/// A program plus the arguments that go before the file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl PlayerCommand {
    pub fn new(program: impl Into<PathBuf>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Spawn detached with null stdio. The child is reaped on a helper
    /// thread and its exit status ignored.
    fn spawn(&self, path: &Path) -> std::io::Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        debug!("Started {:?} (pid {}) for {:?}", self.program, child.id(), path);

        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

/// Plays files with an external program, falling back to the system
/// "open with default handler" command.
#[derive(Debug, Clone)]
pub struct ProcessPlayer {
    primary: Option<PlayerCommand>,
    opener: Option<PlayerCommand>,
}

impl ProcessPlayer {
    pub fn new(primary: Option<PlayerCommand>, opener: Option<PlayerCommand>) -> Self {
        Self { primary, opener }
    }

    /// Resolve the player and opener once, from config or `PATH`.
    pub fn detect(config: &PlaybackConfig) -> Self {
        let primary = match &config.player {
            Some(program) => find_in_path(program).map(|p| PlayerCommand {
                program: p,
                args: config.player_args.clone(),
            }),
            None => PLAYER_CANDIDATES.iter().find_map(|(name, args)| {
                find_in_path(name).map(|p| PlayerCommand::new(p, args))
            }),
        };

        let opener_name = config.opener.as_deref().unwrap_or(DEFAULT_OPENER);
        let opener = find_in_path(opener_name).map(|p| PlayerCommand::new(p, &[]));

        match (&primary, &opener) {
            (Some(p), _) => info!("Using player {:?}", p.program),
            (None, Some(o)) => info!("No player found, falling back to {:?}", o.program),
            (None, None) => warn!("No audio player or opener found; playback disabled"),
        }

        Self { primary, opener }
    }

    pub fn primary(&self) -> Option<&PlayerCommand> {
        self.primary.as_ref()
    }

    pub fn opener(&self) -> Option<&PlayerCommand> {
        self.opener.as_ref()
    }
}

impl Player for ProcessPlayer {
    fn launch(&self, path: &Path) -> Result<()> {
        if let Some(primary) = &self.primary {
            match primary.spawn(path) {
                Ok(()) => return Ok(()),
                Err(e) => warn!("Failed to start {:?}: {}", primary.program, e),
            }
        }

        if let Some(opener) = &self.opener {
            return opener.spawn(path).map_err(|e| {
                Error::PlaybackUnavailable(format!("{:?} failed: {}", opener.program, e))
            });
        }

        Err(Error::PlaybackUnavailable(
            "no audio player or opener available".to_string(),
        ))
    }
}

/// Locate an executable by name on `PATH`. Names containing a path
/// separator are checked as given.
pub fn find_in_path(bin: &str) -> Option<PathBuf> {
    if bin.contains(std::path::MAIN_SEPARATOR) {
        let p = PathBuf::from(bin);
        return p.is_file().then_some(p);
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(bin))
        .find(|candidate| candidate.is_file())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_to_opener() {
        let truthy = find_in_path("true").expect("`true` on PATH");
        let player = ProcessPlayer::new(
            Some(PlayerCommand::new("/nonexistent/player-xyz", &[])),
            Some(PlayerCommand::new(truthy, &[])),
        );
        assert!(player.launch(Path::new("narration.mp3")).is_ok());
    }

    #[test]
    fn test_nothing_available() {
        let player = ProcessPlayer::new(None, None);
        let err = player.launch(Path::new("narration.mp3")).unwrap_err();
        assert!(matches!(err, Error::PlaybackUnavailable(_)));
    }

    #[test]
    fn test_find_in_path() {
        assert!(find_in_path("true").is_some());
        assert!(find_in_path("no-such-binary-narrate-test").is_none());
    }

    #[test]
    fn test_configured_player_args() {
        let config = PlaybackConfig {
            player: Some("true".to_string()),
            player_args: vec!["--quiet".to_string()],
            ..Default::default()
        };
        let player = ProcessPlayer::detect(&config);
        let primary = player.primary().expect("configured player resolved");
        assert_eq!(primary.args, vec!["--quiet"]);
    }
}
