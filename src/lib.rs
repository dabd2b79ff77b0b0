//! Codec for the MQTT v3.1.1 control packet wire format.
//!
//! Typed packet values are validated and serialized to exact byte
//! sequences, and incoming byte streams are parsed back into typed
//! values. Transport, session state and keep alive timing live outside
//! this crate; it performs no I/O of its own beyond reading from a
//! caller supplied byte source.
//!
//! Outbound packets are assembled through [`PacketBuffer`], which keeps
//! fixed header, variable header and payload as separate parts until the
//! caller flattens them for transmission. Inbound bytes are consumed
//! either through the blocking [`read_packet`] parser or incrementally
//! through [`Codec`], which implements the `ntex-codec` framing traits.
//!
//! ```
//! use ntex_bytes::{ByteString, Bytes};
//! use mqtt311::{read_packet, Packet, Publish, QoS};
//!
//! let packet = Packet::Publish(Publish {
//!     dup: false,
//!     retain: false,
//!     qos: QoS::AtMostOnce,
//!     topic: ByteString::from_static("sensors/kitchen"),
//!     packet_id: None,
//!     payload: Bytes::from_static(b"21.5"),
//! });
//! let bytes = packet.to_bytes().unwrap();
//!
//! let mut src = std::io::Cursor::new(bytes.as_ref());
//! assert_eq!(read_packet(&mut src).unwrap(), packet);
//! ```

#![deny(unsafe_code)]

#[macro_use]
mod utils;

mod buffer;
mod codec;
mod decode;
mod encode;
mod error;
mod packet;
mod read;
mod types;

pub use self::buffer::PacketBuffer;
pub use self::codec::Codec;
pub use self::error::{DecodeError, EncodeError, ReadError};
pub use self::packet::{
    next_packet_id, Connect, ConnectAck, ConnectAckReason, LastWill, Packet, Publish,
    SubscribeReturnCode,
};
pub use self::read::read_packet;
pub use self::types::{ConnectAckFlags, ConnectFlags, QoS, MAX_PACKET_SIZE};
