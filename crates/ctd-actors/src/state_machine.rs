use actor_protocol::{step, ActorError, DeviceCommand, LoggingEvent, LoggingPhase, SideEffect};
use actor_runtime::actor_debug;

/// Where a device session sends its effects.
///
/// The driver wires this to the port and event channels; tests record into
/// vectors. Implementations must not block.
pub trait SessionSink {
    /// Hand a command to the transport
    fn emit_command(&mut self, command: DeviceCommand) -> Result<(), ActorError>;

    /// A phase was entered
    fn notify_entry(&mut self, phase: &'static str);

    /// A phase was left
    fn notify_exit(&mut self, phase: &'static str);
}

/// One device session: the current logging phase plus its effect sink.
///
/// A session lives from `LinkOpened` to `LinkClosed`. It starts in `Sleep`
/// and never carries state over from a previous link.
pub struct DeviceStateMachine<S: SessionSink> {
    phase: LoggingPhase,
    sink: S,
}

impl<S: SessionSink> DeviceStateMachine<S> {
    pub fn new(sink: S) -> Self {
        Self {
            phase: LoggingPhase::Sleep,
            sink,
        }
    }

    /// Start the session in `Sleep`. Publishes the entry notification only;
    /// the device is not told to sleep.
    pub fn initialize(&mut self) {
        self.phase = LoggingPhase::Sleep;
        self.sink.notify_entry(self.phase.name());
    }

    /// Apply one event.
    ///
    /// Returns `Ok(false)` when the event is not valid in the current phase
    /// (nothing happens). On a transition every effect is applied even if the
    /// command could not be handed off; that failure is returned afterwards
    /// and the phase still advances.
    pub fn handle(&mut self, event: LoggingEvent) -> Result<bool, ActorError> {
        let (next, effects) = step(self.phase, event);
        if effects.is_empty() {
            actor_debug!("{:?} ignored in {}", event, self.phase.name());
            return Ok(false);
        }

        self.phase = next;

        let mut first_error = None;
        for effect in effects {
            match effect {
                SideEffect::NotifyExit(phase) => self.sink.notify_exit(phase.name()),
                SideEffect::SendCommand(command) => {
                    if let Err(e) = self.sink.emit_command(command) {
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
                SideEffect::NotifyEntry(phase) => self.sink.notify_entry(phase.name()),
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(true),
        }
    }

    /// End the session: publishes the exit notification of the current phase
    /// and hands the sink back.
    pub fn terminate(mut self) -> S {
        self.sink.notify_exit(self.phase.name());
        self.sink
    }

    pub fn phase(&self) -> LoggingPhase {
        self.phase
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use LoggingEvent::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Record {
        Command(DeviceCommand),
        Entered(&'static str),
        Exited(&'static str),
    }

    #[derive(Default)]
    struct RecordingSink {
        records: Vec<Record>,
        fail_commands: bool,
    }

    impl RecordingSink {
        fn commands(&self) -> Vec<DeviceCommand> {
            self.records
                .iter()
                .filter_map(|r| match r {
                    Record::Command(c) => Some(*c),
                    _ => None,
                })
                .collect()
        }
    }

    impl SessionSink for RecordingSink {
        fn emit_command(&mut self, command: DeviceCommand) -> Result<(), ActorError> {
            self.records.push(Record::Command(command));
            if self.fail_commands {
                return Err(ActorError::ChannelClosed("port gone".into()));
            }
            Ok(())
        }

        fn notify_entry(&mut self, phase: &'static str) {
            self.records.push(Record::Entered(phase));
        }

        fn notify_exit(&mut self, phase: &'static str) {
            self.records.push(Record::Exited(phase));
        }
    }

    fn started() -> DeviceStateMachine<RecordingSink> {
        let mut machine = DeviceStateMachine::new(RecordingSink::default());
        machine.initialize();
        machine
    }

    #[test]
    fn test_initialize_enters_sleep_without_command() {
        let machine = started();
        assert_eq!(machine.phase(), LoggingPhase::Sleep);
        assert_eq!(machine.sink().records, vec![Record::Entered("Sleep")]);
    }

    #[test]
    fn test_start_request_orders_exit_command_entry() {
        let mut machine = started();
        assert!(machine.handle(RequestStartLogging).unwrap());

        assert_eq!(machine.phase(), LoggingPhase::StartLogging);
        assert_eq!(
            machine.sink().records,
            vec![
                Record::Entered("Sleep"),
                Record::Exited("Sleep"),
                Record::Command(DeviceCommand::Start),
                Record::Entered("StartLogging"),
            ]
        );
    }

    #[test]
    fn test_start_logging_waits_for_confirmation_only() {
        let mut machine = started();
        machine.handle(RequestStartLogging).unwrap();

        for event in [RequestStartLogging, RequestStopLogging, SleepConfirmedByDevice] {
            assert!(!machine.handle(event).unwrap());
            assert_eq!(machine.phase(), LoggingPhase::StartLogging);
        }

        assert!(machine.handle(LoggingConfirmedByDevice).unwrap());
        assert_eq!(machine.phase(), LoggingPhase::Logging);
        // Entering Logging sends nothing
        assert_eq!(machine.sink().commands(), vec![DeviceCommand::Start]);
    }

    #[test]
    fn test_full_cycle_emits_start_stop_sleep() {
        let mut machine = started();
        for event in [
            RequestStartLogging,
            LoggingConfirmedByDevice,
            RequestStopLogging,
            SleepConfirmedByDevice,
        ] {
            assert!(machine.handle(event).unwrap());
        }

        assert_eq!(machine.phase(), LoggingPhase::Sleep);
        assert_eq!(
            machine.sink().commands(),
            vec![DeviceCommand::Start, DeviceCommand::Stop, DeviceCommand::Sleep]
        );
    }

    #[test]
    fn test_stop_confirmation_while_logging_is_ignored() {
        let mut machine = started();
        machine.handle(RequestStartLogging).unwrap();
        machine.handle(LoggingConfirmedByDevice).unwrap();
        let before = machine.sink().records.len();

        assert!(!machine.handle(SleepConfirmedByDevice).unwrap());
        assert_eq!(machine.phase(), LoggingPhase::Logging);
        assert_eq!(machine.sink().records.len(), before);
    }

    #[test]
    fn test_terminate_publishes_exit_of_current_phase() {
        let mut machine = started();
        machine.handle(RequestStartLogging).unwrap();

        let sink = machine.terminate();
        assert_eq!(sink.records.last(), Some(&Record::Exited("StartLogging")));
    }

    #[test]
    fn test_failed_command_still_transitions() {
        let mut machine = DeviceStateMachine::new(RecordingSink {
            fail_commands: true,
            ..Default::default()
        });
        machine.initialize();

        let err = machine.handle(RequestStartLogging).unwrap_err();
        assert!(matches!(err, ActorError::ChannelClosed(_)));
        assert_eq!(machine.phase(), LoggingPhase::StartLogging);
        assert_eq!(
            machine.sink().records.last(),
            Some(&Record::Entered("StartLogging"))
        );
    }
}
