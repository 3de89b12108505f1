use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info};

use crate::session::APP_NAME;

/// Desktop notification sink. Fire-and-forget.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Sends notifications through the platform helper (`notify-send`, `osascript`).
#[derive(Debug, Clone, Default)]
pub struct DesktopNotifier {
    authorized: bool,
}

impl DesktopNotifier {
    /// Ask for permission to notify. In a terminal that means checking the
    /// user has not opted out and that a helper is available.
    pub fn request_permission(enabled: bool) -> Self {
        let authorized = enabled && helper_available();
        info!(authorized, "desktop notifications");
        Self { authorized }
    }

    pub fn denied() -> Self {
        Self { authorized: false }
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, message: &str) {
        if !self.authorized {
            return;
        }
        let Some(mut command) = notification_command(message) else {
            return;
        };

        thread::spawn(move || {
            if let Err(e) = command.stdout(Stdio::null()).stderr(Stdio::null()).status() {
                debug!(error = %e, "Failed to send desktop notification");
            }
        });
    }
}

fn helper_available() -> bool {
    if cfg!(target_os = "macos") {
        true
    } else if cfg!(target_os = "linux") {
        Command::new("notify-send")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    } else {
        false
    }
}

fn notification_command(message: &str) -> Option<Command> {
    if cfg!(target_os = "macos") {
        let script = format!(
            r#"display notification "{}" with title "{}""#,
            message.replace('"', r#"\""#),
            APP_NAME
        );
        let mut command = Command::new("osascript");
        command.args(["-e", &script]);
        Some(command)
    } else if cfg!(target_os = "linux") {
        let mut command = Command::new("notify-send");
        command.args(["-a", APP_NAME, APP_NAME, message]);
        Some(command)
    } else {
        None
    }
}
