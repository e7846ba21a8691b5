//! Protocol identifiers and link timing
//!
//! **Before changing a link constant:** check it against the serial bridge
//! in use. Bridges that power-cycle the device on connect need longer delays.

/// Sentence identifiers of the CTD control protocol
pub mod protocol {
    /// Talker id used in both directions (`$ZC...`)
    pub const TALKER_ID: &str = "ZC";

    /// Sentence id of driver → device commands (`$ZCCMD,START`)
    pub const COMMAND_SENTENCE: &str = "CMD";

    /// Sentence id of device → driver acknowledgements (`$ZCACK,START`)
    pub const ACK_SENTENCE: &str = "ACK";

    /// Acknowledgement field confirming a START command
    pub const ACK_START: &str = "START";

    /// Acknowledgement field confirming a STOP command
    pub const ACK_STOP: &str = "STOP";
}

/// Link (re)connection
pub mod link {
    /// Address of the serial bridge when none is configured
    ///
    /// **Value**: `127.0.0.1:54321`, the simulator's default listen address
    pub const DEFAULT_ADDRESS: &str = "127.0.0.1:54321";

    /// Upper bound of the reconnect delay (milliseconds)
    ///
    /// **Value**: 5000ms
    ///
    /// **Rationale**: The backoff doubles from 100ms; without a cap the 10th
    /// attempt would wait ~51s. Five seconds keeps a power-cycled logger
    /// from sitting idle long after it comes back.
    pub const MAX_RETRY_DELAY_MS: u64 = 5000;

    /// Consecutive failed connects before the port actor gives up
    ///
    /// **Value**: 0 (never give up)
    ///
    /// **Rationale**: A deployed logger is expected to come back; the driver
    /// keeps trying until it is shut down.
    pub const MAX_CONNECT_ATTEMPTS: u32 = 0;
}
