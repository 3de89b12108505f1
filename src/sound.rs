use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::error::PlaybackError;

pub const DEFAULT_POOL_SIZE: usize = 25;
/// The one asset every install is guaranteed to ship.
pub const FALLBACK_INDEX: usize = 1;

/// Plays a sound asset. The returned receiver yields (or disconnects) once
/// playback has ended. An asset the player cannot decode is an `Err`, not an
/// immediately ended sound.
pub trait AudioPlayer {
    fn play(&self, asset: &Path) -> Result<Receiver<()>, PlaybackError>;
}

/// The fixed pool of `meow_<1..N>.wav` assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundPool {
    dir: PathBuf,
    size: usize,
}

impl SoundPool {
    pub fn new<P: AsRef<Path>>(dir: P, size: usize) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            size: size.max(1),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn asset(&self, index: usize) -> PathBuf {
        self.dir.join(format!("meow_{index}.wav"))
    }

    pub fn fallback(&self) -> PathBuf {
        self.asset(FALLBACK_INDEX)
    }

    /// Uniform over `1..=size`
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(1..=self.size)
    }
}

/// Play a random meow, retrying once with the fallback asset.
///
/// Returns the ended receiver of whichever asset started, or `None` when no
/// sound could be played at all.
pub fn play_random_meow<P, R>(player: &P, pool: &SoundPool, rng: &mut R) -> Option<Receiver<()>>
where
    P: AudioPlayer + ?Sized,
    R: Rng + ?Sized,
{
    let index = pool.pick(rng);
    let asset = pool.asset(index);
    info!(asset = %asset.display(), "playing completion sound");

    match player.play(&asset) {
        Ok(ended) => Some(ended),
        Err(err) => {
            warn!(error = %err, "could not play sound");
            if index == FALLBACK_INDEX {
                return None;
            }
            match player.play(&pool.fallback()) {
                Ok(ended) => Some(ended),
                Err(err) => {
                    error!(error = %err, "fallback sound failed");
                    None
                }
            }
        }
    }
}

/// Plays assets through the platform's command-line audio player
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: Option<&'static str>,
}

impl CommandPlayer {
    pub fn detect() -> Self {
        let program = candidates().iter().copied().find(|p| probe(p));
        match program {
            Some(p) => debug!(player = p, "audio player detected"),
            None => warn!("no audio player found; completion sounds disabled"),
        }
        Self { program }
    }

    pub fn with_program(program: &'static str) -> Self {
        Self {
            program: Some(program),
        }
    }

    pub fn program(&self) -> Option<&'static str> {
        self.program
    }
}

impl Default for CommandPlayer {
    fn default() -> Self {
        Self::detect()
    }
}

/// A player that exits non-zero within this window failed to play the asset.
const STARTUP_GRACE: Duration = Duration::from_millis(200);

const MACOS_PLAYERS: &[&str] = &["afplay"];
const LINUX_PLAYERS: &[&str] = &["paplay", "aplay"];

fn candidates() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        MACOS_PLAYERS
    } else if cfg!(target_os = "linux") {
        LINUX_PLAYERS
    } else {
        &[]
    }
}

fn probe(program: &str) -> bool {
    // afplay has no version flag but always ships with macOS
    if program == "afplay" {
        return true;
    }
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

impl AudioPlayer for CommandPlayer {
    fn play(&self, asset: &Path) -> Result<Receiver<()>, PlaybackError> {
        if !asset.is_file() {
            return Err(PlaybackError::MissingAsset(asset.to_path_buf()));
        }
        let program = self.program.ok_or(PlaybackError::NoPlayer)?;

        let mut child = Command::new(program)
            .arg(asset)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // players reject undecodable files or a missing audio server right away
        let (tx, rx) = mpsc::channel();
        let started = Instant::now();
        while started.elapsed() < STARTUP_GRACE {
            match child.try_wait()? {
                Some(status) if !status.success() => return Err(PlaybackError::Failed(status)),
                Some(_) => {
                    let _ = tx.send(());
                    return Ok(rx);
                }
                None => thread::sleep(Duration::from_millis(10)),
            }
        }

        thread::spawn(move || {
            match child.wait() {
                Ok(status) if !status.success() => {
                    warn!(%status, "audio player exited with failure");
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "failed waiting on audio player"),
            }
            let _ = tx.send(());
        });

        Ok(rx)
    }
}
