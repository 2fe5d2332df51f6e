//! Spoken announcements for newly added customers.
//!
//! Announcing is best effort: nothing here returns an error to the caller.
//! Failures are logged and dropped.

use crate::domain::CustomerRecord;
use crate::infra::app_config::SpeechConfig;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Side effect fired after a customer has been stored.
pub trait Notifier: Send + Sync {
    fn customer_added(&self, customer: &CustomerRecord);
}

/// Does nothing. Used when speech is disabled or unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn customer_added(&self, _customer: &CustomerRecord) {}
}

/// Speaks the announcement through an external text-to-speech program.
#[derive(Debug, Clone)]
pub struct SpeechNotifier {
    program: PathBuf,
    args: Vec<String>,
    announcement: String,
}

impl SpeechNotifier {
    pub fn new(program: PathBuf, args: Vec<String>, announcement: impl Into<String>) -> Self {
        Self {
            program,
            args,
            announcement: announcement.into(),
        }
    }

    /// Resolve the configured program. `None` when speech is disabled or the
    /// program cannot be found.
    pub fn from_config(config: &SpeechConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        match which::which(&config.command) {
            Ok(program) => Some(Self::new(
                program,
                config.args.clone(),
                config.announcement.clone(),
            )),
            Err(err) => {
                log::warn!(
                    "Speech disabled: '{}' not found ({})",
                    config.command,
                    err
                );
                None
            }
        }
    }

    pub fn announcement_for(&self, name: &str) -> String {
        self.announcement.replace("{name}", name)
    }

    fn command(&self, text: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }
}

impl Notifier for SpeechNotifier {
    fn customer_added(&self, customer: &CustomerRecord) {
        let text = self.announcement_for(&customer.name);
        let child = match self.command(&text).spawn() {
            Ok(child) => child,
            Err(err) => {
                log::warn!(
                    "Failed to start speech program {}: {}",
                    self.program.display(),
                    err
                );
                return;
            }
        };

        // Reap the child off the caller's thread so the desk never waits on audio.
        let program = self.program.clone();
        let reaper = std::thread::Builder::new()
            .name("speech".into())
            .spawn(move || match child.wait_with_output() {
                Ok(output) if output.status.success() => {}
                Ok(output) => log::warn!(
                    "Speech program {} exited with {}: {}",
                    program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
                Err(err) => log::warn!("Speech program {} failed: {}", program.display(), err),
            });
        if let Err(err) = reaper {
            log::warn!("Failed to spawn speech thread: {}", err);
        }
    }
}

pub fn notifier_from_config(config: &SpeechConfig) -> Arc<dyn Notifier> {
    match SpeechNotifier::from_config(config) {
        Some(notifier) => Arc::new(notifier),
        None => Arc::new(SilentNotifier),
    }
}
