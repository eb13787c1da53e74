//! Length-prefixed framing
//!
//! Each frame is a 4-byte big-endian unsigned length followed by exactly
//! that many bytes of an encoded [`WireMessage`]. Byte order is fixed to
//! network order on both directions so a bridge and client built for
//! different platforms can never silently misframe. Any short read or
//! write, an oversized length, or an undecodable payload is fatal to the
//! stream; there is no resynchronization.

use prost::Message;
use std::io::{Read, Write};

use crate::error::{Result, VizError};
use crate::protocol::messages::WireMessage;

/// Encode `msg` and write one frame
pub fn write_frame<W: Write>(writer: &mut W, msg: &WireMessage, max_frame_len: usize) -> Result<()> {
    let payload = msg.encode_to_vec();
    if payload.len() > max_frame_len || payload.len() > u32::MAX as usize {
        return Err(VizError::Framing(format!(
            "outbound frame of {} bytes exceeds limit of {}",
            payload.len(),
            max_frame_len.min(u32::MAX as usize)
        )));
    }
    writer.write_all(&(payload.len() as u32).to_be_bytes())?;
    writer.write_all(&payload)?;
    Ok(())
}

/// Read exactly one frame and decode it.
///
/// An EOF before the first prefix byte surfaces as
/// `std::io::ErrorKind::UnexpectedEof`; callers that treat a closed pipe as
/// clean shutdown inspect the error kind.
pub fn read_frame<R: Read>(reader: &mut R, max_frame_len: usize) -> Result<WireMessage> {
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix)?;
    let len = u32::from_be_bytes(prefix) as usize;
    if len > max_frame_len {
        return Err(VizError::Framing(format!(
            "inbound frame length {} exceeds limit of {}",
            len, max_frame_len
        )));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(WireMessage::decode(payload.as_slice())?)
}
