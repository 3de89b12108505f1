use std::collections::VecDeque;
use std::io;

use crossterm::{execute, terminal::SetTitle};
use tracing::debug;

/// Where the session is shown: a clock, a window title and modal alerts
pub trait Surface {
    fn render(&mut self, clock: &str, title: &str);
    fn alert(&mut self, message: &str);
}

/// Terminal-backed surface. Holds what the UI draws and mirrors the title to
/// the terminal window.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    clock: String,
    title: String,
    alerts: VecDeque<String>,
    set_window_title: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            set_window_title: true,
            ..Self::default()
        }
    }

    /// No terminal side effects; for tests and non-tty use.
    pub fn headless() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> &str {
        &self.clock
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn current_alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }

    pub fn dismiss_alert(&mut self) -> Option<String> {
        self.alerts.pop_front()
    }
}

impl Surface for TerminalSurface {
    fn render(&mut self, clock: &str, title: &str) {
        clock.clone_into(&mut self.clock);
        if self.title == title {
            return;
        }
        title.clone_into(&mut self.title);

        if self.set_window_title {
            if let Err(e) = execute!(io::stdout(), SetTitle(title)) {
                debug!(error = %e, "failed to set terminal title");
            }
        }
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push_back(message.to_string());
    }
}
