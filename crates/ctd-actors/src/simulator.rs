//! Device side of the CTD control protocol.
//!
//! Acknowledges `START` and `STOP` commands immediately and ignores
//! everything else, including `SLEEP`. Used by the `ctd-sim` binary and by
//! end-to-end tests.

use actor_runtime::{actor_debug, actor_info, actor_warn};
use core_types::{Transport, TransportError};
use dec_nmea::{Sentence, SentenceError};
use framing::{Framer, LineFramer};

use crate::constants::protocol;

/// Reply to one inbound line, terminator included.
///
/// `Ok(None)` for valid sentences that need no reply.
pub fn respond(line: &str) -> Result<Option<String>, SentenceError> {
    let sentence = Sentence::parse(line)?;
    if sentence.id() != protocol::COMMAND_SENTENCE {
        return Ok(None);
    }

    let reply = match sentence.field(0) {
        Some(protocol::ACK_START) => protocol::ACK_START,
        Some(protocol::ACK_STOP) => protocol::ACK_STOP,
        _ => return Ok(None),
    };

    Ok(Some(format!(
        "${}{},{}\r\n",
        protocol::TALKER_ID,
        protocol::ACK_SENTENCE,
        reply
    )))
}

/// Serve one connection until the peer closes it.
pub async fn serve_connection<T: Transport>(transport: &T) -> Result<(), TransportError> {
    let mut framer = LineFramer::new();

    loop {
        let (bytes, timestamp_us) = transport.read_chunk().await?;
        if bytes.is_empty() {
            return Ok(());
        }

        for frame in framer.push(&bytes, timestamp_us) {
            let line = frame.text();
            match respond(&line) {
                Ok(Some(reply)) => {
                    actor_info!("Sim: {} -> {}", line, reply.trim_end());
                    transport.write(reply.as_bytes()).await?;
                }
                Ok(None) => actor_debug!("Sim: {} (no reply)", line),
                Err(e) => actor_warn!("Sim: failed to decode '{}': {}", line, e),
            }
        }
    }
}
