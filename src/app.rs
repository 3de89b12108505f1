use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::celebration::Celebration;
use crate::controller::SessionController;
use crate::engine::Signal;
use crate::notify::{DesktopNotifier, Notifier};
use crate::session::SessionState;
use crate::sound::{AudioPlayer, CommandPlayer};
use crate::surface::TerminalSurface;

/// Longest accepted minutes entry
const MAX_INPUT_DIGITS: usize = 4;

pub type Controller<N = DesktopNotifier, A = CommandPlayer> =
    SessionController<TerminalSurface, N, A>;

/// Terminal front end state: the controller plus the bits of UI around it
pub struct App<N: Notifier = DesktopNotifier, A: AudioPlayer = CommandPlayer> {
    pub controller: Controller<N, A>,
    /// Minutes field, edited with digits and backspace
    pub duration_input: String,
    pub celebration: Celebration,
    pub should_quit: bool,
}

impl<N: Notifier, A: AudioPlayer> App<N, A> {
    pub fn new(controller: Controller<N, A>) -> Self {
        let duration_input = controller.settings().default_minutes.to_string();
        Self {
            controller,
            duration_input,
            celebration: Celebration::new(),
            should_quit: false,
        }
    }

    pub fn start_label(&self) -> &'static str {
        match self.controller.state() {
            SessionState::Running => "Focusing...",
            SessionState::Stopped => "Resume Meow",
            SessionState::Idle | SessionState::Finished => "Start Meow",
        }
    }

    pub fn current_alert(&self) -> Option<&str> {
        self.controller.surface().current_alert()
    }

    /// Apply engine signals and advance the animation by `dt` seconds.
    pub fn on_tick(&mut self, width: u16, height: u16, dt: f64) {
        let applied = self.controller.pump();
        if applied.contains(&Signal::Finish) {
            self.celebration.start(width, height);
        }
        self.celebration.update(dt);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // an open alert swallows the key that dismisses it
        if self.controller.surface_mut().dismiss_alert().is_some() {
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('s') | KeyCode::Char(' ') => self.controller.toggle(),
            KeyCode::Char('p') => self.controller.stop(),
            KeyCode::Char('r') => {
                let custom = self.duration_input.trim().parse().ok();
                self.controller.reset(custom);
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.duration_input.len() < MAX_INPUT_DIGITS {
                    self.duration_input.push(c);
                }
            }
            KeyCode::Char('-') if self.duration_input.is_empty() => {
                self.duration_input.push('-');
            }
            KeyCode::Backspace => {
                self.duration_input.pop();
            }
            KeyCode::Enter => {
                // rejection is shown to the user as an alert
                let _ = self.controller.set_custom_duration(&self.duration_input);
            }
            _ => {}
        }
    }
}
