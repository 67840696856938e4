//! Hosts the mic status poller on its own runtime and forwards state changes
//! to the tao event loop.

use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;
use tao::event_loop::EventLoopProxy;
use tokio::runtime::Runtime;
use tracing::info;

use crate::event::MicMuteEvent;
use crate::{CommandSource, Config, MicStatusSource, MuteState, StatusPoller};

/// The polling side of the app. Dropping it stops the schedule and shuts the
/// runtime down.
pub struct StatusService {
    poller: StatusPoller,
    interval_ms: u64,
    // Declared last so the poller is stopped before its runtime goes away
    _runtime: Runtime,
}

impl StatusService {
    /// Create a stopped service for the configured status command.
    pub fn new(config: &Config, event_sender: EventLoopProxy<MicMuteEvent>) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let source = source_from_config(config)?;
        let event_sender = Mutex::new(event_sender);
        let poller = StatusPoller::new(source, runtime.handle().clone()).with_listener(
            move |state| {
                event_sender
                    .lock()
                    .send_event(MicMuteEvent::StateChanged(state))
                    .ok();
            },
        );

        Ok(Self {
            poller,
            interval_ms: config.interval_ms,
            _runtime: runtime,
        })
    }

    pub fn start(&self) -> anyhow::Result<()> {
        self.poller
            .start(self.interval_ms)
            .context("Failed to start mic status poller")
    }

    pub fn stop(&self) {
        self.poller.stop();
    }

    pub fn current_state(&self) -> MuteState {
        self.poller.current_state()
    }
}

/// Build the status source described by the config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Arc<dyn MicStatusSource>> {
    let argv = config.command().context(
        "No mic status command configured for this platform, set `command` in the config file",
    )?;
    let source = CommandSource::from_argv(&argv, config.query_timeout())
        .context("Mic status command is empty")?;

    info!(
        command = ?argv,
        timeout = ?source.timeout(),
        "using command mic status source"
    );
    Ok(Arc::new(source))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use micmute_core::Encoding;

    use super::*;

    #[test]
    fn test_source_from_configured_command() {
        let config = Config {
            command: Some(vec!["echo".to_string(), "true".to_string()]),
            query_timeout_ms: 300,
            ..Default::default()
        };
        let source = source_from_config(&config).unwrap();
        assert_eq!(source.name(), "echo");
    }

    #[test]
    fn test_empty_command_is_rejected() {
        let config = Config {
            command: Some(vec![]),
            ..Default::default()
        };
        let err = source_from_config(&config).err().unwrap();
        assert!(err.to_string().contains("empty"));
    }

    #[cfg(unix)]
    #[test]
    fn test_source_answers_through_the_runtime() {
        let config = Config {
            command: Some(vec!["echo".to_string(), "Mute: yes".to_string()]),
            ..Default::default()
        };
        let source = source_from_config(&config).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let raw = runtime
            .block_on(async {
                tokio::time::timeout(Duration::from_secs(5), source.get_mic_status()).await
            })
            .unwrap()
            .unwrap();
        assert_eq!(Encoding::classify(&raw).state(), MuteState::Muted);
    }
}
