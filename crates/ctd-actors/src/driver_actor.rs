use actor_protocol::{
    ActorError, DesiredState, DeviceCommand, LinkStatus, LoggingEvent, LoggingPhase, SystemEvent,
};
use actor_runtime::{
    actor_debug, actor_info, actor_warn, Actor, DriverMessage, LinkId, PortMessage,
};
use dec_nmea::Sentence;
use framing::encode_line;
use futures_channel::mpsc;

use crate::constants::protocol;
use crate::state_machine::{DeviceStateMachine, SessionSink};

/// Session sink backed by the actor channels.
///
/// Commands become `$ZCCMD,<CMD>*CS\r\n` writes on the port inbox, tagged
/// with the link the session belongs to; entry and exit notifications become
/// `SystemEvent`s.
pub struct ChannelSink {
    link_id: LinkId,
    port_tx: mpsc::Sender<PortMessage>,
    event_tx: mpsc::Sender<SystemEvent>,
}

impl ChannelSink {
    pub fn new(
        link_id: LinkId,
        port_tx: mpsc::Sender<PortMessage>,
        event_tx: mpsc::Sender<SystemEvent>,
    ) -> Self {
        Self {
            link_id,
            port_tx,
            event_tx,
        }
    }

    pub fn link_id(&self) -> LinkId {
        self.link_id
    }

    fn publish(&mut self, event: SystemEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            actor_warn!("DriverActor: event dropped: {}", e);
        }
    }
}

/// Render a command sentence, without line terminator
pub fn command_line(command: DeviceCommand) -> String {
    Sentence::new(
        protocol::TALKER_ID,
        protocol::COMMAND_SENTENCE,
        [command.as_str()],
    )
    .to_line()
}

impl SessionSink for ChannelSink {
    fn emit_command(&mut self, command: DeviceCommand) -> Result<(), ActorError> {
        let line = command_line(command);
        self.port_tx
            .try_send(PortMessage::Write {
                link_id: self.link_id,
                data: encode_line(&line),
            })
            .map_err(|e| {
                if e.is_disconnected() {
                    ActorError::ChannelClosed(format!("PortActor has shut down; {} not sent", command))
                } else {
                    ActorError::Overloaded(format!("PortActor write queue full; {} not sent", command))
                }
            })?;

        actor_info!("Sent: {}", line);
        self.publish(SystemEvent::CommandSent { command, line });
        Ok(())
    }

    fn notify_entry(&mut self, phase: &'static str) {
        actor_info!("Entered: {}", phase);
        self.publish(SystemEvent::StateEntered { name: phase.into() });
    }

    fn notify_exit(&mut self, phase: &'static str) {
        actor_info!("Exited: {}", phase);
        self.publish(SystemEvent::StateExited { name: phase.into() });
    }
}

/// Map a decoded sentence to the state machine event it confirms.
///
/// Only `ACK` sentences with a first field of `START` or `STOP` count;
/// everything else (including our own `CMD` echoed back) maps to `None`.
pub fn acknowledgement(sentence: &Sentence) -> Option<LoggingEvent> {
    if sentence.id() != protocol::ACK_SENTENCE {
        return None;
    }
    match sentence.field(0)? {
        protocol::ACK_START => Some(LoggingEvent::LoggingConfirmedByDevice),
        protocol::ACK_STOP => Some(LoggingEvent::SleepConfirmedByDevice),
        _ => None,
    }
}

/// DriverActor owns the device session
///
/// Responsibilities:
/// - Create a session on `LinkOpened` and start logging right away
/// - Tear the session down on `LinkClosed` of its own link, or on shutdown
/// - Decode inbound lines and dispatch acknowledgements
/// - Dispatch operator control commands
///
/// All of this arrives through one inbox, so the state machine never sees
/// two events at once. Without a session every dispatch is a no-op.
pub struct DriverActor {
    session: Option<DeviceStateMachine<ChannelSink>>,
    port_tx: mpsc::Sender<PortMessage>,
    event_tx: mpsc::Sender<SystemEvent>,
}

impl DriverActor {
    pub fn new(port_tx: mpsc::Sender<PortMessage>, event_tx: mpsc::Sender<SystemEvent>) -> Self {
        Self {
            session: None,
            port_tx,
            event_tx,
        }
    }

    /// Phase of the live session, if any
    pub fn phase(&self) -> Option<LoggingPhase> {
        self.session.as_ref().map(DeviceStateMachine::phase)
    }

    /// Link the live session was opened on, if any
    pub fn link_id(&self) -> Option<LinkId> {
        self.session.as_ref().map(|s| s.sink().link_id())
    }

    fn publish(&mut self, event: SystemEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            actor_warn!("DriverActor: event dropped: {}", e);
        }
    }

    fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.terminate();
        }
    }

    fn dispatch(&mut self, event: LoggingEvent) -> Result<(), ActorError> {
        match self.session.as_mut() {
            Some(session) => session.handle(event).map(|_| ()),
            None => {
                actor_debug!("DriverActor: {:?} dropped, no active session", event);
                Ok(())
            }
        }
    }

    fn handle_link(&mut self, status: LinkStatus, link_id: LinkId) -> Result<(), ActorError> {
        actor_info!("Link {} status: {:?}", link_id, status);
        self.publish(SystemEvent::LinkChanged { status });

        match status {
            LinkStatus::LinkOpened => {
                if self.session.is_some() {
                    actor_warn!("DriverActor: link reopened without close; restarting session");
                    self.end_session();
                }

                let sink = ChannelSink::new(link_id, self.port_tx.clone(), self.event_tx.clone());
                let mut session = DeviceStateMachine::new(sink);
                session.initialize();
                self.session = Some(session);

                self.dispatch(LoggingEvent::RequestStartLogging)
            }
            LinkStatus::LinkClosed => {
                match self.link_id() {
                    Some(current) if current != link_id => {
                        actor_debug!(
                            "DriverActor: close of link {} ignored, session runs on link {}",
                            link_id,
                            current
                        );
                    }
                    _ => self.end_session(),
                }
                Ok(())
            }
        }
    }

    fn handle_line(&mut self, line: String) -> Result<(), ActorError> {
        actor_debug!("Received: {}", line);

        let sentence = match Sentence::parse(&line) {
            Ok(sentence) => sentence,
            Err(e) => {
                actor_warn!("Failed to decode '{}': {}", line, e);
                self.publish(SystemEvent::DecodeFailed {
                    line,
                    reason: e.to_string(),
                });
                return Ok(());
            }
        };

        match acknowledgement(&sentence) {
            Some(event) => self.dispatch(event),
            None => {
                actor_debug!("DriverActor: ignoring {}{} sentence", sentence.talker(), sentence.id());
                Ok(())
            }
        }
    }

    fn handle_control(&mut self, desired: DesiredState) -> Result<(), ActorError> {
        actor_info!("Operator requested {:?}", desired);

        if let Some(phase) = self.phase().filter(LoggingPhase::is_awaiting_ack) {
            self.publish(SystemEvent::StatusUpdate {
                message: format!(
                    "{:?} request has no effect while {} waits for the device",
                    desired,
                    phase.name()
                ),
            });
        }

        match desired {
            DesiredState::Logging => self.dispatch(LoggingEvent::RequestStartLogging),
            DesiredState::NotLogging => self.dispatch(LoggingEvent::RequestStopLogging),
        }
    }
}

impl Actor for DriverActor {
    type Message = DriverMessage;

    fn name(&self) -> &'static str {
        "DriverActor"
    }

    async fn handle(&mut self, msg: Self::Message) -> Result<(), ActorError> {
        match msg {
            DriverMessage::Link { status, link_id } => self.handle_link(status, link_id),
            DriverMessage::Line(line) => self.handle_line(line),
            DriverMessage::Control(ctrl) => self.handle_control(ctrl.desired_state),
        }
    }

    async fn shutdown(&mut self) {
        self.end_session();
    }
}
