use crate::messages::DeviceCommand;

/// # CTD Logging Cycle
///
/// The device moves through a single fixed cycle. Two edges are operator
/// (or driver) requests, two are acknowledgements from the device.
///
/// ```text
///            RequestStartLogging
///   ┌───────┐ ──────────────────► ┌──────────────┐
///   │ Sleep │      emit START     │ StartLogging │
///   └───────┘                     └──────┬───────┘
///       ▲                                │ LoggingConfirmedByDevice
///       │ SleepConfirmedByDevice         │ (ACK,START)
///       │ emit SLEEP                     ▼
///   ┌───┴─────────┐               ┌──────────┐
///   │ StopLogging │ ◄──────────── │ Logging  │
///   └─────────────┘  emit STOP    └──────────┘
///              RequestStopLogging
/// ```
///
/// ## Invariants
///
/// - Exactly one phase is active; it is the whole persistent state.
/// - No edges exist besides the four above. Any other (phase, event) pair is
///   discarded without side effects, which is what makes late or duplicated
///   acknowledgements harmless.
/// - A transition produces, in order: exit(old), at most one command,
///   entry(new).
/// - `StartLogging` and `StopLogging` wait for the device indefinitely; there
///   is no timeout or retransmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LoggingPhase {
    /// Device idle; initial phase of every session
    Sleep,

    /// START sent, waiting for ACK,START
    StartLogging,

    /// Device is logging
    Logging,

    /// STOP sent, waiting for ACK,STOP
    StopLogging,
}

/// Transient inputs to the logging cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LoggingEvent {
    RequestStartLogging,
    LoggingConfirmedByDevice,
    RequestStopLogging,
    SleepConfirmedByDevice,
}

/// One observable consequence of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    NotifyExit(LoggingPhase),
    SendCommand(DeviceCommand),
    NotifyEntry(LoggingPhase),
}

impl LoggingPhase {
    pub const ALL: [LoggingPhase; 4] = [
        LoggingPhase::Sleep,
        LoggingPhase::StartLogging,
        LoggingPhase::Logging,
        LoggingPhase::StopLogging,
    ];

    /// Name published on the notification channel
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sleep => "Sleep",
            Self::StartLogging => "StartLogging",
            Self::Logging => "Logging",
            Self::StopLogging => "StopLogging",
        }
    }

    /// Command emitted when this phase is entered through a transition.
    ///
    /// Not emitted by session initialization, which enters `Sleep` quietly.
    pub fn entry_command(&self) -> Option<DeviceCommand> {
        match self {
            Self::Sleep => Some(DeviceCommand::Sleep),
            Self::StartLogging => Some(DeviceCommand::Start),
            Self::Logging => None,
            Self::StopLogging => Some(DeviceCommand::Stop),
        }
    }

    /// Waiting on the device rather than on an operator request?
    pub fn is_awaiting_ack(&self) -> bool {
        matches!(self, Self::StartLogging | Self::StopLogging)
    }

    /// The transition table. `None` means the event is discarded.
    pub fn next(&self, event: LoggingEvent) -> Option<LoggingPhase> {
        use LoggingEvent::*;
        use LoggingPhase::*;

        match (self, event) {
            (Sleep, RequestStartLogging) => Some(StartLogging),
            (StartLogging, LoggingConfirmedByDevice) => Some(Logging),
            (Logging, RequestStopLogging) => Some(StopLogging),
            (StopLogging, SleepConfirmedByDevice) => Some(Sleep),
            _ => None,
        }
    }
}

impl LoggingEvent {
    pub const ALL: [LoggingEvent; 4] = [
        LoggingEvent::RequestStartLogging,
        LoggingEvent::LoggingConfirmedByDevice,
        LoggingEvent::RequestStopLogging,
        LoggingEvent::SleepConfirmedByDevice,
    ];
}

/// Apply one event: returns the resulting phase and the ordered side effects.
///
/// Pure; an event that is not in the table returns `(phase, [])`.
pub fn step(phase: LoggingPhase, event: LoggingEvent) -> (LoggingPhase, Vec<SideEffect>) {
    let Some(next) = phase.next(event) else {
        return (phase, Vec::new());
    };

    let mut effects = Vec::with_capacity(3);
    effects.push(SideEffect::NotifyExit(phase));
    if let Some(command) = next.entry_command() {
        effects.push(SideEffect::SendCommand(command));
    }
    effects.push(SideEffect::NotifyEntry(next));
    (next, effects)
}
