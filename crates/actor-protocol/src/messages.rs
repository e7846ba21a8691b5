use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Connection status reported by the transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStatus {
    /// Link is up; a new device session starts
    LinkOpened,
    /// Link is gone (normal close or failure); the session ends
    LinkClosed,
}

/// Logging mode requested by an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesiredState {
    Logging,
    NotLogging,
}

impl FromStr for DesiredState {
    type Err = String;

    /// Accepts the wire names (`LOGGING`, `NOT_LOGGING`) and the short
    /// operator aliases `start` / `stop`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOGGING" | "START" => Ok(Self::Logging),
            "NOT_LOGGING" | "STOP" => Ok(Self::NotLogging),
            other => Err(format!(
                "Unknown logging mode '{}': expected LOGGING (start) or NOT_LOGGING (stop)",
                other
            )),
        }
    }
}

/// Operator control message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtdControl {
    pub desired_state: DesiredState,
}

impl CtdControl {
    pub fn new(desired_state: DesiredState) -> Self {
        Self { desired_state }
    }
}

/// Command payloads sent to the CTD inside a `$ZCCMD` sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceCommand {
    Start,
    Stop,
    Sleep,
}

impl DeviceCommand {
    /// Field value on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Sleep => "SLEEP",
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events from the actor system to observers (application, tests)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SystemEvent {
    /// A logging phase was entered
    StateEntered { name: String },

    /// A logging phase was left
    StateExited { name: String },

    /// Transport link status changed
    LinkChanged { status: LinkStatus },

    /// A command sentence was handed to the transport
    CommandSent { command: DeviceCommand, line: String },

    /// An inbound line failed sentence validation
    DecodeFailed { line: String, reason: String },

    /// Status message for operator display
    StatusUpdate { message: String },

    /// Error occurred
    Error { message: String },
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_state_parsing() {
        assert_eq!("LOGGING".parse::<DesiredState>(), Ok(DesiredState::Logging));
        assert_eq!("start".parse::<DesiredState>(), Ok(DesiredState::Logging));
        assert_eq!(
            " not_logging\n".parse::<DesiredState>(),
            Ok(DesiredState::NotLogging)
        );
        assert_eq!("Stop".parse::<DesiredState>(), Ok(DesiredState::NotLogging));
        assert!("sleep".parse::<DesiredState>().is_err());
    }

    #[test]
    fn test_control_serialization() {
        let ctrl = CtdControl::new(DesiredState::NotLogging);
        let json = serde_json::to_string(&ctrl).unwrap();
        assert_eq!(json, r#"{"desired_state":"NOT_LOGGING"}"#);
        let back: CtdControl = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctrl);
    }

    #[test]
    fn test_device_command_names() {
        assert_eq!(DeviceCommand::Start.as_str(), "START");
        assert_eq!(DeviceCommand::Stop.to_string(), "STOP");
        assert_eq!(DeviceCommand::Sleep.as_str(), "SLEEP");
    }

    #[test]
    fn test_system_event_serialization() {
        let event = SystemEvent::StateEntered {
            name: "Logging".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SystemEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }
}
