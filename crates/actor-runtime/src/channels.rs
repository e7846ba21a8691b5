use actor_protocol::{ActorError, CtdControl, LinkStatus, SystemEvent};
use futures_channel::mpsc;

/// Identifies one connection of the port actor.
///
/// Ids start at 1 and grow by one per successful connect. Writes carry the id
/// of the link their session was opened on; the port actor drops writes for
/// any other link.
pub type LinkId = u64;

/// Inbox of the driver actor.
///
/// Every input that can move the device state machine arrives here, so the
/// machine sees one serialized stream of link events, lines and operator
/// commands.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverMessage {
    /// Link status from the transport
    Link { status: LinkStatus, link_id: LinkId },
    /// One inbound line, terminator already removed
    Line(String),
    /// Operator control command
    Control(CtdControl),
}

/// Inbox of the port actor.
///
/// The port actor stops once every sender is dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum PortMessage {
    /// Bytes to transmit on `link_id`, framing included
    Write { link_id: LinkId, data: Vec<u8> },
}

/// Handles for running actors
pub struct ActorHandles {
    pub driver_rx: mpsc::Receiver<DriverMessage>,
    pub port_rx: mpsc::Receiver<PortMessage>,
    pub event_tx: mpsc::Sender<SystemEvent>,
}

/// Channel manager for actor communication
///
/// Owns the senders for each actor inbox and the receiving end of the
/// system event stream.
pub struct ChannelManager {
    // Bounded channels to prevent memory exhaustion under high load
    driver_tx: mpsc::Sender<DriverMessage>,
    port_tx: mpsc::Sender<PortMessage>,

    event_rx: mpsc::Receiver<SystemEvent>,
}

impl ChannelManager {
    /// Capacity of the driver inbox (link events, lines, operator commands)
    pub const DRIVER_CAPACITY: usize = 256;
    /// Capacity of the port inbox (outbound command lines)
    pub const PORT_CAPACITY: usize = 64;
    /// Capacity of the system event stream
    pub const EVENT_CAPACITY: usize = 1024;

    /// Create a new channel manager and actor handles
    ///
    /// Returns (ChannelManager for the application, ActorHandles for running actors)
    pub fn new() -> (Self, ActorHandles) {
        let (driver_tx, driver_rx) = mpsc::channel(Self::DRIVER_CAPACITY);
        let (port_tx, port_rx) = mpsc::channel(Self::PORT_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(Self::EVENT_CAPACITY);

        let handles = ActorHandles {
            driver_rx,
            port_rx,
            event_tx,
        };

        let manager = Self {
            driver_tx,
            port_tx,
            event_rx,
        };

        (manager, handles)
    }

    /// Forward an operator control command to the driver
    pub fn send_control(&self, ctrl: CtdControl) -> Result<(), ActorError> {
        self.driver_tx
            .clone()
            .try_send(DriverMessage::Control(ctrl))
            .map_err(|e| {
                if e.is_full() {
                    ActorError::Overloaded(
                        "Too many pending driver messages; retry the command shortly".into(),
                    )
                } else {
                    ActorError::ChannelClosed(
                        "DriverActor has shut down; restart the driver".into(),
                    )
                }
            })
    }

    /// Take ownership of event receiver
    ///
    /// Call once; the receiver left behind is disconnected.
    pub fn take_event_receiver(&mut self) -> mpsc::Receiver<SystemEvent> {
        let (_new_tx, new_rx) = mpsc::channel(1);
        std::mem::replace(&mut self.event_rx, new_rx)
    }

    /// Clone senders for direct actor-to-actor communication
    pub fn driver_sender(&self) -> mpsc::Sender<DriverMessage> {
        self.driver_tx.clone()
    }

    pub fn port_sender(&self) -> mpsc::Sender<PortMessage> {
        self.port_tx.clone()
    }
}
