//! i3/sway IPC framing.
//!
//! Every message, in both directions, is
//!
//! | Bytes | Content                                  |
//! |-------|------------------------------------------|
//! | 6     | magic string `i3-ipc`                    |
//! | 4     | payload length (native byte order)       |
//! | 4     | message type (native byte order)         |
//! | n     | JSON payload                             |
//!
//! Events on a subscribed connection use the same framing with bit 31 of
//! the type set.

use super::SwayError;
use std::io::{Read, Write};

pub(crate) const MAGIC: &[u8; 6] = b"i3-ipc";
pub(crate) const HEADER_SIZE: usize = 14;

pub(crate) const RUN_COMMAND: u32 = 0;
pub(crate) const GET_WORKSPACES: u32 = 1;
pub(crate) const SUBSCRIBE: u32 = 2;
pub(crate) const GET_TREE: u32 = 4;

pub(crate) const EVENT_BIT: u32 = 1 << 31;
pub(crate) const EVENT_WINDOW: u32 = EVENT_BIT | 3;

/// Reject payloads larger than this to guard against bogus length fields.
const MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Write one framed message.
pub(crate) fn write_message<W: Write>(
    stream: &mut W,
    msg_type: u32,
    payload: &[u8],
) -> Result<(), SwayError> {
    let len = u32::try_from(payload.len())
        .map_err(|_| SwayError::Protocol(format!("payload too large: {} bytes", payload.len())))?;
    let mut header = [0u8; HEADER_SIZE];
    header[..6].copy_from_slice(MAGIC);
    header[6..10].copy_from_slice(&len.to_ne_bytes());
    header[10..14].copy_from_slice(&msg_type.to_ne_bytes());
    stream.write_all(&header)?;
    stream.write_all(payload)?;
    stream.flush()?;
    Ok(())
}

/// Read one framed message, returning its type and payload.
pub(crate) fn read_message<R: Read>(stream: &mut R) -> Result<(u32, Vec<u8>), SwayError> {
    let mut header = [0u8; HEADER_SIZE];
    stream.read_exact(&mut header)?;
    if &header[..6] != MAGIC {
        return Err(SwayError::Protocol("invalid i3-ipc magic".into()));
    }

    let len = u32::from_ne_bytes([header[6], header[7], header[8], header[9]]) as usize;
    let msg_type = u32::from_ne_bytes([header[10], header[11], header[12], header[13]]);
    if len > MAX_PAYLOAD {
        return Err(SwayError::Protocol(format!("payload too large: {} bytes", len)));
    }

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload)?;
    Ok((msg_type, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_layout() {
        let mut buf = Vec::new();
        write_message(&mut buf, GET_TREE, b"").unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(&buf[..6], b"i3-ipc");
        assert_eq!(&buf[6..10], &0u32.to_ne_bytes());
        assert_eq!(&buf[10..14], &4u32.to_ne_bytes());
    }

    #[test]
    fn reads_back_what_was_written() {
        let mut buf = Vec::new();
        write_message(&mut buf, RUN_COMMAND, b"workspace 1").unwrap();
        write_message(&mut buf, EVENT_WINDOW, br#"{"change":"new"}"#).unwrap();

        let mut cursor = Cursor::new(buf);
        let (ty, payload) = read_message(&mut cursor).unwrap();
        assert_eq!(ty, RUN_COMMAND);
        assert_eq!(payload, b"workspace 1");
        let (ty, payload) = read_message(&mut cursor).unwrap();
        assert_eq!(ty, EVENT_WINDOW);
        assert_eq!(ty & EVENT_BIT, EVENT_BIT);
        assert_eq!(payload, br#"{"change":"new"}"#);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = b"i3-ipx".to_vec();
        bytes.extend_from_slice(&[0u8; 8]);
        let err = read_message(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, SwayError::Protocol(_)));
    }

    #[test]
    fn oversized_length_is_rejected() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&u32::MAX.to_ne_bytes());
        bytes.extend_from_slice(&GET_TREE.to_ne_bytes());
        let err = read_message(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, SwayError::Protocol(_)));
    }

    #[test]
    fn truncated_payload_is_an_io_error() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&10u32.to_ne_bytes());
        bytes.extend_from_slice(&GET_TREE.to_ne_bytes());
        bytes.extend_from_slice(b"short");
        let err = read_message(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, SwayError::Io(_)));
    }
}
