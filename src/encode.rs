use std::num::NonZeroU16;

use ntex_bytes::{BufMut, ByteString, Bytes, BytesMut};

use crate::buffer::PacketBuffer;
use crate::error::EncodeError;
use crate::packet::{Connect, LastWill, Packet, Publish, SubscribeReturnCode};
use crate::types::{packet_type, ConnectFlags, QoS, MAX_PACKET_SIZE, MQTT, MQTT_LEVEL, WILL_QOS_SHIFT};

/// Validate a packet and assemble its wire representation.
///
/// The body is built as separate variable header and payload parts first,
/// so the fixed header's Remaining Length is known before a single body
/// byte is copied. Validation failures return before any part is emitted.
pub(crate) fn encode_packet(packet: &Packet) -> Result<PacketBuffer, EncodeError> {
    match packet {
        Packet::Connect(connect) => encode_connect(connect),
        Packet::ConnectAck(ack) => {
            let mut var_header = BytesMut::with_capacity(2);
            var_header.put_slice(&[u8::from(ack.session_present), ack.return_code.into()]);
            packet_with_header(packet_type::CONNACK, var_header, None)
        }
        Packet::Publish(publish) => encode_publish(publish),
        Packet::PublishAck { packet_id } => ack_packet(packet_type::PUBACK, *packet_id),
        Packet::PublishReceived { packet_id } => ack_packet(packet_type::PUBREC, *packet_id),
        Packet::PublishRelease { packet_id } => ack_packet(packet_type::PUBREL, *packet_id),
        Packet::PublishComplete { packet_id } => ack_packet(packet_type::PUBCOMP, *packet_id),
        Packet::Subscribe { packet_id, topic_filters } => {
            ensure!(!topic_filters.is_empty(), EncodeError::EmptyTopicFilters);
            let mut var_header = BytesMut::with_capacity(2);
            var_header.put_u16(packet_id.get());
            let mut payload = BytesMut::new();
            for (filter, qos) in topic_filters {
                filter.encode(&mut payload)?;
                payload.put_u8(u8::from(*qos));
            }
            packet_with_header(packet_type::SUBSCRIBE, var_header, Some(payload))
        }
        Packet::SubscribeAck { packet_id, status } => {
            let mut var_header = BytesMut::with_capacity(2);
            var_header.put_u16(packet_id.get());
            let mut payload = BytesMut::with_capacity(status.len());
            for code in status {
                payload.put_u8(match code {
                    SubscribeReturnCode::Success(qos) => u8::from(*qos),
                    SubscribeReturnCode::Failure => 0x80,
                });
            }
            packet_with_header(packet_type::SUBACK, var_header, Some(payload))
        }
        Packet::Unsubscribe { packet_id, topic_filters } => {
            ensure!(!topic_filters.is_empty(), EncodeError::EmptyTopicFilters);
            let mut var_header = BytesMut::with_capacity(2);
            var_header.put_u16(packet_id.get());
            let mut payload = BytesMut::new();
            for filter in topic_filters {
                filter.encode(&mut payload)?;
            }
            packet_with_header(packet_type::UNSUBSCRIBE, var_header, Some(payload))
        }
        Packet::UnsubscribeAck { packet_id } => ack_packet(packet_type::UNSUBACK, *packet_id),
        Packet::PingRequest => fixed_literal(packet_type::PINGREQ),
        Packet::PingResponse => fixed_literal(packet_type::PINGRESP),
        Packet::Disconnect => fixed_literal(packet_type::DISCONNECT),
    }
}

fn encode_connect(connect: &Connect) -> Result<PacketBuffer, EncodeError> {
    ensure!(
        connect.password.is_none() || connect.username.is_some(),
        EncodeError::PasswordWithoutUsername
    );

    let mut flags = ConnectFlags::empty();
    if connect.username.is_some() {
        flags |= ConnectFlags::USERNAME;
    }
    if connect.password.is_some() {
        flags |= ConnectFlags::PASSWORD;
    }
    if let Some(LastWill { qos, retain, .. }) = connect.last_will {
        flags |= ConnectFlags::WILL;
        if retain {
            flags |= ConnectFlags::WILL_RETAIN;
        }
        flags |= ConnectFlags::from_bits_truncate(u8::from(qos) << WILL_QOS_SHIFT);
    }
    if connect.clean_session {
        flags |= ConnectFlags::CLEAN_SESSION;
    }

    let mut var_header = BytesMut::with_capacity(10);
    MQTT.encode(&mut var_header)?;
    var_header.put_slice(&[MQTT_LEVEL, flags.bits()]);
    var_header.put_u16(connect.keep_alive);

    let mut payload = BytesMut::new();
    connect.client_id.encode(&mut payload)?;
    if let Some(LastWill { ref topic, ref message, .. }) = connect.last_will {
        topic.encode(&mut payload)?;
        message.encode(&mut payload)?;
    }
    if let Some(ref username) = connect.username {
        username.encode(&mut payload)?;
    }
    if let Some(ref password) = connect.password {
        password.encode(&mut payload)?;
    }

    packet_with_header(packet_type::CONNECT, var_header, Some(payload))
}

fn encode_publish(publish: &Publish) -> Result<PacketBuffer, EncodeError> {
    let first_byte = packet_type::PUBLISH_START
        | (u8::from(publish.qos) << 1)
        | ((publish.dup as u8) << 3)
        | (publish.retain as u8);

    let mut var_header = BytesMut::new();
    publish.topic.encode(&mut var_header)?;
    if publish.qos == QoS::AtMostOnce {
        // packet id must not be set [MQTT-2.3.1-5]
        ensure!(publish.packet_id.is_none(), EncodeError::MalformedPacket);
    } else {
        let packet_id = publish.packet_id.ok_or(EncodeError::PacketIdRequired)?;
        var_header.put_u16(packet_id.get());
    }

    let mut body = PacketBuffer::new();
    body.push(var_header.freeze());
    if !publish.payload.is_empty() {
        body.push(publish.payload.clone());
    }
    with_fixed_header(first_byte, body)
}

fn ack_packet(first_byte: u8, packet_id: NonZeroU16) -> Result<PacketBuffer, EncodeError> {
    let mut var_header = BytesMut::with_capacity(2);
    var_header.put_u16(packet_id.get());
    packet_with_header(first_byte, var_header, None)
}

fn fixed_literal(first_byte: u8) -> Result<PacketBuffer, EncodeError> {
    let mut packet = PacketBuffer::new();
    packet.push(Bytes::from(vec![first_byte, 0]));
    Ok(packet)
}

fn packet_with_header(
    first_byte: u8,
    var_header: BytesMut,
    payload: Option<BytesMut>,
) -> Result<PacketBuffer, EncodeError> {
    let mut body = PacketBuffer::new();
    body.push(var_header.freeze());
    if let Some(payload) = payload {
        body.push(payload.freeze());
    }
    with_fixed_header(first_byte, body)
}

/// Prepend the fixed header once the body's Remaining Length is known.
fn with_fixed_header(first_byte: u8, body: PacketBuffer) -> Result<PacketBuffer, EncodeError> {
    let remaining_length = body.len();
    ensure!(remaining_length <= MAX_PACKET_SIZE as usize, EncodeError::InvalidLength);

    let mut header = BytesMut::with_capacity(5);
    header.put_u8(first_byte);
    write_variable_length(remaining_length as u32, &mut header);

    let mut packet = PacketBuffer::new();
    packet.push(header.freeze());
    packet.push_buffer(body);
    Ok(packet)
}

/// Emit the 1..=4 byte Remaining Length group, least significant 7 bits
/// first. `len` must not exceed [`MAX_PACKET_SIZE`]; callers check.
pub(crate) fn write_variable_length(len: u32, dst: &mut BytesMut) {
    match len {
        0..=127 => dst.put_u8(len as u8),
        128..=16_383 => {
            dst.put_slice(&[((len & 0b0111_1111) | 0b1000_0000) as u8, (len >> 7) as u8])
        }
        16_384..=2_097_151 => {
            dst.put_slice(&[
                ((len & 0b0111_1111) | 0b1000_0000) as u8,
                (((len >> 7) & 0b0111_1111) | 0b1000_0000) as u8,
                (len >> 14) as u8,
            ]);
        }
        2_097_152..=268_435_455 => {
            dst.put_slice(&[
                ((len & 0b0111_1111) | 0b1000_0000) as u8,
                (((len >> 7) & 0b0111_1111) | 0b1000_0000) as u8,
                (((len >> 14) & 0b0111_1111) | 0b1000_0000) as u8,
                (len >> 21) as u8,
            ]);
        }
        _ => panic!("length exceeds maximum remaining length"),
    }
}

pub(crate) trait Encode {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), EncodeError>;
}

impl Encode for [u8] {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let len = u16::try_from(self.len()).map_err(|_| EncodeError::InvalidLength)?;
        dst.put_u16(len);
        dst.put_slice(self);
        Ok(())
    }
}

impl Encode for Bytes {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), EncodeError> {
        self.as_ref().encode(dst)
    }
}

impl Encode for ByteString {
    fn encode(&self, dst: &mut BytesMut) -> Result<(), EncodeError> {
        self.as_str().as_bytes().encode(dst)
    }
}
