use serde::{Deserialize, Serialize};

pub mod transport;
pub use transport::{Transport, TransportError};

/// A raw chunk of logical data (one protocol line, terminator included).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    /// The raw bytes comprising this frame.
    pub bytes: Vec<u8>,
    /// Timestamp in microseconds (relative to link open).
    pub timestamp_us: u64,
}

impl Frame {
    /// Frame received from the device
    pub fn new_rx(bytes: Vec<u8>, timestamp_us: u64) -> Self {
        Self {
            bytes,
            timestamp_us,
        }
    }

    /// Frame contents as text with the line terminator (`\n` or `\r\n`) removed.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the sentence codec
    /// refuses non-ASCII input later anyway.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes)
            .trim_end_matches(['\r', '\n'])
            .to_string()
    }

    /// True when the frame holds nothing but a line terminator.
    pub fn is_blank(&self) -> bool {
        self.bytes.iter().all(|b| matches!(b, b'\r' | b'\n'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_serialization() {
        let frame = Frame::new_rx(b"$ZCACK,START\r\n".to_vec(), 1000);
        let json = serde_json::to_string(&frame).unwrap();
        let deserialized: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame, deserialized);
    }

    #[test]
    fn test_text_strips_terminators() {
        let crlf = Frame::new_rx(b"$ZCACK,STOP\r\n".to_vec(), 0);
        assert_eq!(crlf.text(), "$ZCACK,STOP");

        let lf = Frame::new_rx(b"$ZCACK,STOP\n".to_vec(), 0);
        assert_eq!(lf.text(), "$ZCACK,STOP");

        let bare = Frame::new_rx(b"$ZCCMD,START*3F".to_vec(), 0);
        assert_eq!(bare.text(), "$ZCCMD,START*3F");
    }

    #[test]
    fn test_blank_frames() {
        assert!(Frame::new_rx(b"\r\n".to_vec(), 0).is_blank());
        assert!(Frame::new_rx(b"\n".to_vec(), 0).is_blank());
        assert!(!Frame::new_rx(b"$\n".to_vec(), 0).is_blank());
    }
}
