use actor_protocol::{LinkStatus, SystemEvent};
use futures::StreamExt;
use futures_channel::mpsc;

/// Follows the event stream and remembers the current logging phase and
/// link status.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PhaseTracker {
    phase: Option<String>,
    link: Option<LinkStatus>,
    commands_sent: usize,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the phase last entered and not yet exited
    pub fn current(&self) -> Option<&str> {
        self.phase.as_deref()
    }

    pub fn link(&self) -> Option<LinkStatus> {
        self.link
    }

    pub fn commands_sent(&self) -> usize {
        self.commands_sent
    }

    pub fn observe(&mut self, event: &SystemEvent) {
        match event {
            SystemEvent::StateEntered { name } => self.phase = Some(name.clone()),
            SystemEvent::StateExited { name } => {
                if self.phase.as_deref() == Some(name.as_str()) {
                    self.phase = None;
                }
            }
            SystemEvent::LinkChanged { status } => self.link = Some(*status),
            SystemEvent::CommandSent { .. } => self.commands_sent += 1,
            SystemEvent::DecodeFailed { .. }
            | SystemEvent::StatusUpdate { .. }
            | SystemEvent::Error { .. } => {}
        }
    }
}

/// Consume the event stream until every sender is gone.
///
/// Entry/exit and decode failures are already logged where they happen;
/// this reports status and errors and returns the final state.
pub async fn watch_events(mut events: mpsc::Receiver<SystemEvent>) -> PhaseTracker {
    let mut tracker = PhaseTracker::new();

    while let Some(event) = events.next().await {
        tracker.observe(&event);
        match &event {
            SystemEvent::StatusUpdate { message } => tracing::info!("{}", message),
            SystemEvent::Error { message } => tracing::error!("{}", message),
            SystemEvent::StateEntered { .. } => {
                tracing::debug!("Current phase: {:?}", tracker.current())
            }
            _ => {}
        }
    }

    tracker
}
