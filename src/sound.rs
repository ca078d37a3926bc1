//! Sound cues played while a number is drawn.
//!
//! Files are resolved once up front. Playback itself is handed to whatever
//! command-line player the platform ships with.

use anyhow::{Context, Result};
use rand::Rng;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub trait Player {
    fn play(&self, path: &Path) -> Result<()>;
}

/// Spawns an external player without waiting for it to finish.
pub struct CommandPlayer {
    program: String,
    // Hand the file to the shell association instead of passing it as an argument.
    via_shell: bool,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), via_shell: false }
    }

    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("afplay")
        } else if cfg!(target_os = "windows") {
            // Media.SoundPlayer only takes wav; the associated app handles mp3
            Self { program: "powershell".to_string(), via_shell: true }
        } else {
            // paplay handles mp3 through pulse, aplay would only take wav
            Self::new("paplay")
        }
    }

    fn args_for(&self, path: &Path) -> Vec<OsString> {
        if self.via_shell {
            vec![
                "-NoProfile".into(),
                "-Command".into(),
                format!("Start-Process -FilePath {}", powershell_quote(&path.to_string_lossy())).into(),
            ]
        } else {
            vec![path.as_os_str().to_os_string()]
        }
    }
}

/// Single-quoted PowerShell literal; embedded quotes are doubled.
fn powershell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl Player for CommandPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args_for(path));
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        cmd.spawn().with_context(|| format!("failed to start {}", self.program))?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct SoundBank {
    slots: Vec<Option<PathBuf>>,
}

impl SoundBank {
    pub fn preload(dir: &Path, names: &[String]) -> Self {
        let slots: Vec<Option<PathBuf>> = names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                if path.is_file() {
                    Some(path)
                } else {
                    tracing::error!(path = %path.display(), "failed to load sound file");
                    None
                }
            })
            .collect();
        let bank = Self { slots };
        if bank.is_loaded() {
            tracing::info!(count = bank.len(), "all sound files preloaded");
        }
        bank
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_loaded(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(Option::is_some)
    }

    /// 0 picks a random cue, `k` picks the k-th cue (1-based).
    pub fn select<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Option<&Path> {
        let slot = match index {
            0 if self.slots.is_empty() => None,
            0 => self.slots.get(rng.random_range(0..self.slots.len())),
            k => self.slots.get(k - 1),
        };
        let path = slot.and_then(|s| s.as_deref());
        if path.is_none() {
            tracing::error!(index, "selected sound file not found");
        }
        path
    }

    /// Playback errors are logged and swallowed; a missing cue never stops a draw.
    pub fn play<R: Rng + ?Sized>(&self, index: usize, rng: &mut R, player: &dyn Player) {
        let Some(path) = self.select(index, rng) else { return };
        if let Err(e) = player.play(path) {
            tracing::error!(path = %path.display(), "playback error: {e:#}");
        }
    }
}
