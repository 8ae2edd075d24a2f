//! Length-prefixed framing.
//!
//! A raw TCP stream does not preserve message boundaries, so every packet
//! travels as a `u32` little-endian length followed by that many payload bytes.

use crate::ProtocolError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the length prefix in bytes.
pub const HEADER_LEN: usize = 4;

/// Default upper bound for a single frame payload.
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// Wrap a payload in a length-prefixed frame.
pub fn encode_frame(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u32_le(payload.len() as u32);
    buf.put_slice(payload);
    buf.freeze()
}

/// Try to split one complete frame off the front of `buf`.
///
/// Returns `Ok(None)` when more bytes are needed. An oversized or empty
/// frame is an error; the stream cannot be resynchronised after either.
pub fn decode_frame(buf: &mut BytesMut, max_len: usize) -> Result<Option<Bytes>, ProtocolError> {
    if buf.len() < HEADER_LEN {
        return Ok(None);
    }

    let len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    if len == 0 {
        return Err(ProtocolError::EmptyFrame);
    }
    if len > max_len {
        return Err(ProtocolError::FrameTooLarge { len, max: max_len });
    }
    if buf.len() < HEADER_LEN + len {
        buf.reserve(HEADER_LEN + len - buf.len());
        return Ok(None);
    }

    buf.advance(HEADER_LEN);
    Ok(Some(buf.split_to(len).freeze()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_frame_waits_for_more() {
        let frame = encode_frame(b"hello");
        let mut buf = BytesMut::from(&frame[..6]);
        assert_eq!(decode_frame(&mut buf, DEFAULT_MAX_FRAME_LEN), Ok(None));

        buf.extend_from_slice(&frame[6..]);
        let payload = decode_frame(&mut buf, DEFAULT_MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(&payload[..], b"hello");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_two_frames_in_one_read() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encode_frame(b"a"));
        buf.extend_from_slice(&encode_frame(b"bc"));

        let first = decode_frame(&mut buf, 16).unwrap().unwrap();
        let second = decode_frame(&mut buf, 16).unwrap().unwrap();
        assert_eq!(&first[..], b"a");
        assert_eq!(&second[..], b"bc");
        assert_eq!(decode_frame(&mut buf, 16), Ok(None));
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut buf = BytesMut::from(&encode_frame(&[0u8; 32])[..]);
        assert_eq!(
            decode_frame(&mut buf, 16),
            Err(ProtocolError::FrameTooLarge { len: 32, max: 16 })
        );
    }

    #[test]
    fn test_empty_frame_rejected() {
        let mut buf = BytesMut::from(&[0u8, 0, 0, 0][..]);
        assert_eq!(decode_frame(&mut buf, 16), Err(ProtocolError::EmptyFrame));
    }
}
