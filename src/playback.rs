//! Local playback through an external media player.

use crate::{audio, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Placeholder replaced by the audio file path in player arguments.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Placeholder replaced by the path as a quoted PowerShell string literal.
pub const PS_PATH_PLACEHOLDER: &str = "{ps_path}";

/// How long `play` blocks the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackWait {
    /// Wait for the player process to exit.
    #[default]
    UntilExit,
    /// Launch the player and return after a fixed delay.
    Fixed { ms: u64 },
    /// Launch the player and return after the measured length of the audio.
    /// Audio whose length cannot be measured (MP3) waits for the player to
    /// exit instead.
    AudioDuration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Player program; the platform default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    /// Player arguments. `{path}` (or `{ps_path}`, a quoted PowerShell literal)
    /// is substituted, otherwise the path is appended.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub wait: PlaybackWait,
}

/// Something that can play an audio file.
pub trait Player: Send + Sync {
    fn play(&self, path: &Path) -> Result<()>;
}

/// Plays audio by running an external command.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    wait: PlaybackWait,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>, wait: PlaybackWait) -> Self {
        Self {
            program: program.into(),
            args,
            wait,
        }
    }

    /// Platform default player, overridden by whatever the config names.
    pub fn from_config(cfg: &PlaybackConfig) -> Self {
        match &cfg.player {
            Some(program) => Self::new(program.clone(), cfg.args.clone(), cfg.wait),
            None => {
                let (program, args) = platform_default();
                Self::new(program, args, cfg.wait)
            }
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(expand_args(&self.args, path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    fn launch_failed(&self, e: std::io::Error) -> Error {
        Error::playback(format!("failed to launch '{}': {}", self.program, e))
    }
}

impl Player for CommandPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        debug!(player = %self.program, path = %path.display(), "starting playback");
        let delay = match self.wait {
            PlaybackWait::UntilExit => return self.play_to_end(path),
            PlaybackWait::Fixed { ms } => Duration::from_millis(ms),
            PlaybackWait::AudioDuration => match audio::wav_duration(path) {
                Ok(secs) => Duration::from_secs_f64(secs),
                Err(e) => {
                    debug!(
                        path = %path.display(),
                        "cannot measure audio length, waiting for the player instead: {}", e
                    );
                    return self.play_to_end(path);
                }
            },
        };

        let mut child = self.command(path).spawn().map_err(|e| self.launch_failed(e))?;
        thread::sleep(delay);
        match child.try_wait() {
            Ok(Some(status)) => self.check_status(status),
            Ok(None) => {
                debug!(player = %self.program, "player still running after wait");
                reap_in_background(child, self.program.clone());
                Ok(())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl CommandPlayer {
    fn play_to_end(&self, path: &Path) -> Result<()> {
        let status = self
            .command(path)
            .status()
            .map_err(|e| self.launch_failed(e))?;
        self.check_status(status)
    }

    fn check_status(&self, status: ExitStatus) -> Result<()> {
        if status.success() {
            Ok(())
        } else {
            Err(Error::playback(format!(
                "'{}' exited with {}",
                self.program, status
            )))
        }
    }
}

/// Wait for a player that outlived the playback delay so it does not linger
/// as a zombie.
fn reap_in_background(mut child: Child, program: String) {
    let spawned = thread::Builder::new()
        .name("viet-tts-player".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => debug!(player = %program, %status, "player exited"),
            Err(e) => debug!(player = %program, "failed to wait for player: {}", e),
        });
    if let Err(e) = spawned {
        warn!("cannot wait for player in the background: {}", e);
    }
}

fn expand_args(args: &[String], path: &Path) -> Vec<String> {
    let path = path.display().to_string();
    let quoted = powershell_literal(&path);
    let mut expanded: Vec<String> = args
        .iter()
        .map(|a| {
            a.replace(PS_PATH_PLACEHOLDER, &quoted)
                .replace(PATH_PLACEHOLDER, &path)
        })
        .collect();
    let has_placeholder = args
        .iter()
        .any(|a| a.contains(PATH_PLACEHOLDER) || a.contains(PS_PATH_PLACEHOLDER));
    if !has_placeholder {
        expanded.push(path);
    }
    expanded
}

/// Single-quoted PowerShell string literal; embedded quotes are doubled.
fn powershell_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn platform_default() -> (String, Vec<String>) {
    if cfg!(target_os = "windows") {
        ("powershell".to_string(), windows_default_args())
    } else if cfg!(target_os = "macos") {
        ("afplay".to_string(), Vec::new())
    } else {
        ("play".to_string(), vec!["-q".to_string()])
    }
}

// Windows Media Player's automation object plays MP3 as well as WAV. The loop
// blocks until playState reports Stopped (1), giving up after ten minutes.
fn windows_default_args() -> Vec<String> {
    let script = format!(
        "$w = New-Object -ComObject WMPlayer.OCX; \
         $w.URL = {}; \
         $w.controls.play(); \
         $n = 0; \
         while ($w.playState -ne 1) {{ \
         if (++$n -gt 6000) {{ $w.close(); exit 1 }}; \
         Start-Sleep -Milliseconds 100 }}; \
         $w.close()",
        PS_PATH_PLACEHOLDER
    );
    vec![
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-Command".to_string(),
        script,
    ]
}
