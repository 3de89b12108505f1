pub const APP_NAME: &str = "Catodoro";
pub const DEFAULT_MINUTES: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    Idle,
    Running,
    Stopped,
    Finished,
}

/// The user-visible countdown lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub remaining_secs: u64,
    pub state: SessionState,
}

impl Session {
    pub fn new(remaining_secs: u64) -> Self {
        Self {
            remaining_secs,
            state: SessionState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn clock(&self) -> String {
        format_clock(i64::try_from(self.remaining_secs).unwrap_or(i64::MAX))
    }

    pub fn title(&self) -> String {
        window_title(&self.clock(), self.state == SessionState::Finished)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(minutes_to_secs(DEFAULT_MINUTES))
    }
}

pub fn minutes_to_secs(minutes: u32) -> u64 {
    u64::from(minutes) * 60
}

/// `MM:SS`, zero padded. Negative input renders as `00:00`.
pub fn format_clock(secs: i64) -> String {
    let safe = secs.max(0);
    format!("{:02}:{:02}", safe / 60, safe % 60)
}

pub fn window_title(clock: &str, finished: bool) -> String {
    if finished {
        format!("Done! - {APP_NAME}")
    } else {
        format!("{clock} - {APP_NAME}")
    }
}
