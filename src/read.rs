use std::io::Read;

use ntex_bytes::Bytes;

use crate::decode::decode_packet;
use crate::error::{DecodeError, ReadError};
use crate::packet::Packet;
use crate::types::packet_type;

/// Read one packet from a blocking byte source.
///
/// Consumes exactly one fixed header byte, the variable length Remaining
/// Length field one byte at a time, and then exactly Remaining Length body
/// bytes; nothing past the packet is touched. Reads from two packets must
/// not interleave on the same source.
pub fn read_packet<R: Read>(src: &mut R) -> Result<Packet, ReadError> {
    let mut first_byte = [0u8; 1];
    src.read_exact(&mut first_byte)?;
    let remaining_length = read_variable_length(src)?;

    let body = if remaining_length > 0 {
        let mut body = vec![0u8; remaining_length];
        src.read_exact(&mut body)?;
        Bytes::from(body)
    } else {
        Bytes::new()
    };

    log::trace!(
        "read {} packet, remaining length {}",
        packet_type::name(first_byte[0]),
        remaining_length
    );
    Ok(decode_packet(body, first_byte[0])?)
}

/// Blocking counterpart of `decode_variable_length`; reads one byte per
/// continuation group and rejects encodings longer than four bytes.
fn read_variable_length<R: Read>(src: &mut R) -> Result<usize, ReadError> {
    let mut multiplier: usize = 1;
    let mut value: usize = 0;
    let mut byte = [0u8; 1];

    loop {
        src.read_exact(&mut byte)?;
        value += ((byte[0] & 0x7F) as usize) * multiplier;
        if byte[0] & 0x80 == 0 {
            break;
        }
        multiplier *= 128;
        if multiplier > 128 * 128 * 128 {
            return Err(ReadError::Decode(DecodeError::InvalidLength));
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn read_remaining_length(bytes: &[u8]) -> Result<usize, ReadError> {
        read_variable_length(&mut Cursor::new(bytes))
    }

    #[test]
    fn test_read_variable_length() {
        assert_eq!(read_remaining_length(b"\x00").unwrap(), 0);
        assert_eq!(read_remaining_length(b"\x7f").unwrap(), 127);
        assert_eq!(read_remaining_length(b"\x80\x01").unwrap(), 128);
        assert_eq!(read_remaining_length(b"\xff\x7f").unwrap(), 16383);
        assert_eq!(read_remaining_length(b"\x80\x80\x01").unwrap(), 16384);
        assert_eq!(read_remaining_length(b"\xff\xff\xff\x7f").unwrap(), 268435455);

        // a fifth group is never valid
        assert!(matches!(
            read_remaining_length(b"\xff\xff\xff\xff\x7f"),
            Err(ReadError::Decode(DecodeError::InvalidLength))
        ));
        // a truncated field surfaces the transport failure untouched
        assert!(matches!(
            read_remaining_length(b"\xff\xff"),
            Err(ReadError::Transport(_))
        ));
    }

    #[test]
    fn test_read_packet() {
        let mut src = Cursor::new(b"\x20\x02\x01\x00".to_vec());
        let packet = read_packet(&mut src).unwrap();
        assert_eq!(packet.name(), "CONNACK");
        assert_eq!(src.position(), 4);
    }

    #[test]
    fn test_read_packet_zero_length_body() {
        let mut src = Cursor::new(b"\xd0\x00".to_vec());
        assert_eq!(read_packet(&mut src).unwrap(), Packet::PingResponse);
    }

    #[test]
    fn test_read_packet_consumes_exactly_one_packet() {
        // PINGRESP followed by the head of another packet
        let mut src = Cursor::new(b"\xd0\x00\x40".to_vec());
        assert_eq!(read_packet(&mut src).unwrap(), Packet::PingResponse);
        assert_eq!(src.position(), 2);
    }

    #[test]
    fn test_read_packet_unknown_type() {
        let mut src = Cursor::new(b"\x00\x00".to_vec());
        assert!(matches!(
            read_packet(&mut src),
            Err(ReadError::Decode(DecodeError::UnsupportedPacketType(0)))
        ));

        let mut src = Cursor::new(b"\xf0\x00".to_vec());
        assert!(matches!(
            read_packet(&mut src),
            Err(ReadError::Decode(DecodeError::UnsupportedPacketType(0xf0)))
        ));
    }

    #[test]
    fn test_read_packet_truncated_body() {
        let mut src = Cursor::new(b"\x40\x02\x43".to_vec());
        assert!(matches!(read_packet(&mut src), Err(ReadError::Transport(_))));
    }

    #[test]
    fn test_read_packet_empty_source() {
        let mut src = Cursor::new(Vec::new());
        assert!(matches!(read_packet(&mut src), Err(ReadError::Transport(_))));
    }
}
