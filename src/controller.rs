//! Foreground session lifecycle.
//!
//! [`SessionController`] owns the [`Session`], forwards start/stop to the
//! countdown engine and turns engine signals into rendering and completion
//! effects. Collaborators are injected so the whole flow runs headless.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::Config;
use crate::engine::{EngineHandle, Signal};
use crate::error::{parse_minutes, ValidationError};
use crate::notify::Notifier;
use crate::session::{minutes_to_secs, Session, SessionState};
use crate::sound::{play_random_meow, AudioPlayer, SoundPool};
use crate::surface::Surface;

pub const COMPLETION_MESSAGE: &str = "Meow! Focus session complete!";

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Length of the first session
    pub initial_secs: u64,
    /// What `reset` falls back to without a custom value
    pub default_minutes: u32,
    pub sounds: SoundPool,
    pub sound_enabled: bool,
    /// Upper bound on waiting for the completion sound before alerting
    pub alert_timeout: Duration,
}

impl From<&Config> for ControllerSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            initial_secs: minutes_to_secs(cfg.default_minutes()),
            default_minutes: cfg.default_minutes(),
            sounds: cfg.sound_pool(),
            sound_enabled: cfg.sound_enabled,
            alert_timeout: cfg.alert_timeout(),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

#[derive(Debug)]
struct PendingAlert {
    ended: Option<Receiver<()>>,
    give_up_at: Instant,
}

pub struct SessionController<S: Surface, N: Notifier, A: AudioPlayer> {
    session: Session,
    engine: EngineHandle,
    surface: S,
    notifier: N,
    player: A,
    settings: ControllerSettings,
    pending_alert: Option<PendingAlert>,
}

impl<S: Surface, N: Notifier, A: AudioPlayer> SessionController<S, N, A> {
    pub fn new(
        engine: EngineHandle,
        surface: S,
        notifier: N,
        player: A,
        settings: ControllerSettings,
    ) -> Self {
        let mut controller = Self {
            session: Session::new(settings.initial_secs),
            engine,
            surface,
            notifier,
            player,
            settings,
            pending_alert: None,
        };
        controller.render();
        controller
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn player(&self) -> &A {
        &self.player
    }

    pub fn alert_pending(&self) -> bool {
        self.pending_alert.is_some()
    }

    pub fn start(&mut self) {
        match self.session.state {
            SessionState::Idle | SessionState::Stopped => {}
            SessionState::Running | SessionState::Finished => return,
        }

        self.session.state = SessionState::Running;
        info!(remaining_secs = self.session.remaining_secs, "focus session running");
        self.engine.start(self.session.remaining_secs);
    }

    pub fn stop(&mut self) {
        if !self.session.is_running() {
            return;
        }

        self.engine.stop();
        self.session.state = SessionState::Stopped;
        info!(remaining_secs = self.session.remaining_secs, "focus session paused");
    }

    pub fn toggle(&mut self) {
        if self.session.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Back to `Idle` with `custom_minutes`, or the default when absent or zero.
    pub fn reset(&mut self, custom_minutes: Option<u32>) {
        self.stop();
        let minutes = custom_minutes
            .filter(|m| *m > 0)
            .unwrap_or(self.settings.default_minutes);
        self.session.remaining_secs = minutes_to_secs(minutes);
        self.session.state = SessionState::Idle;
        self.render();
    }

    /// Validate a user-entered minute count and make it the session length.
    /// Invalid input raises an alert and leaves the session untouched.
    pub fn set_custom_duration(&mut self, input: &str) -> Result<u32, ValidationError> {
        match parse_minutes(input) {
            Ok(minutes) => {
                self.stop();
                self.session.remaining_secs = minutes_to_secs(minutes);
                self.session.state = SessionState::Idle;
                self.render();
                Ok(minutes)
            }
            Err(err) => {
                warn!(input, error = %err, "rejected custom duration");
                self.surface.alert(&err.to_string());
                Err(err)
            }
        }
    }

    /// Apply every pending engine signal, then surface the completion alert
    /// if it has become due. Returns the signals applied.
    pub fn pump(&mut self) -> Vec<Signal> {
        let mut applied = Vec::new();
        while let Some(signal) = self.engine.try_recv() {
            self.apply(signal);
            applied.push(signal);
        }
        self.poll_alert(Instant::now());
        applied
    }

    fn apply(&mut self, signal: Signal) {
        match signal {
            Signal::Tick { time_left } => {
                self.session.remaining_secs = time_left;
                self.render();
            }
            Signal::Finish => self.finish(),
        }
    }

    fn finish(&mut self) {
        self.stop();
        self.session.remaining_secs = 0;
        self.session.state = SessionState::Finished;
        info!("focus session complete");
        self.render();

        self.notifier.notify(COMPLETION_MESSAGE);

        let ended = if self.settings.sound_enabled {
            play_random_meow(&self.player, &self.settings.sounds, &mut rand::thread_rng())
        } else {
            None
        };
        if self.pending_alert.take().is_some() {
            // the previous session's sound is still playing
            self.surface.alert(COMPLETION_MESSAGE);
        }
        let now = Instant::now();
        self.pending_alert = Some(PendingAlert {
            ended,
            give_up_at: now + self.settings.alert_timeout,
        });
        self.poll_alert(now);
    }

    fn poll_alert(&mut self, now: Instant) {
        let Some(pending) = &self.pending_alert else {
            return;
        };

        let due = match &pending.ended {
            None => true,
            Some(ended) => match ended.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => true,
                Err(TryRecvError::Empty) if now >= pending.give_up_at => {
                    warn!("completion sound never ended; alerting anyway");
                    true
                }
                Err(TryRecvError::Empty) => false,
            },
        };

        if due {
            self.pending_alert = None;
            self.surface.alert(COMPLETION_MESSAGE);
        }
    }

    fn render(&mut self) {
        let clock = self.session.clock();
        let title = self.session.title();
        self.surface.render(&clock, &title);
    }
}
