use std::io::Cursor;
use std::num::NonZeroU16;

use ntex_bytes::{ByteString, Bytes};
use rand::Rng;
use test_case::test_case;

use mqtt311::{
    next_packet_id, read_packet, Codec, Connect, ConnectAck, ConnectAckReason, LastWill, Packet,
    Publish, QoS, ReadError, SubscribeReturnCode,
};

fn packet_id(v: u16) -> NonZeroU16 {
    NonZeroU16::new(v).unwrap()
}

fn round_trip(packet: &Packet) -> Packet {
    let bytes = packet.to_bytes().unwrap();
    let mut src = Cursor::new(bytes.to_vec());
    let decoded = read_packet(&mut src).unwrap();
    assert_eq!(src.position() as usize, bytes.len(), "parser must consume the whole packet");
    decoded
}

#[test]
fn round_trip_every_packet_kind() {
    let packets = vec![
        Packet::Connect(Box::new(Connect {
            clean_session: true,
            keep_alive: 30,
            client_id: ByteString::from_static("device-7"),
            last_will: Some(LastWill {
                qos: QoS::AtLeastOnce,
                retain: true,
                topic: ByteString::from_static("will/topic"),
                message: Bytes::from_static(b"gone"),
            }),
            username: Some(ByteString::from_static("user")),
            password: Some(Bytes::from_static(b"pass")),
        })),
        Packet::ConnectAck(ConnectAck {
            session_present: true,
            return_code: ConnectAckReason::ConnectionAccepted,
        }),
        Packet::Publish(Publish {
            dup: true,
            retain: false,
            qos: QoS::ExactlyOnce,
            topic: ByteString::from_static("a/b/c"),
            packet_id: Some(packet_id(77)),
            payload: Bytes::from_static(b"payload"),
        }),
        Packet::PublishAck { packet_id: packet_id(1) },
        Packet::PublishReceived { packet_id: packet_id(2) },
        Packet::PublishRelease { packet_id: packet_id(3) },
        Packet::PublishComplete { packet_id: packet_id(4) },
        Packet::Subscribe {
            packet_id: packet_id(5),
            topic_filters: vec![
                (ByteString::from_static("a/+"), QoS::AtMostOnce),
                (ByteString::from_static("b/#"), QoS::ExactlyOnce),
            ],
        },
        Packet::SubscribeAck {
            packet_id: packet_id(5),
            status: vec![
                SubscribeReturnCode::Success(QoS::AtMostOnce),
                SubscribeReturnCode::Failure,
            ],
        },
        Packet::Unsubscribe {
            packet_id: packet_id(6),
            topic_filters: vec![ByteString::from_static("a/+")],
        },
        Packet::UnsubscribeAck { packet_id: packet_id(6) },
        Packet::PingRequest,
        Packet::PingResponse,
        Packet::Disconnect,
    ];

    for packet in packets {
        assert_eq!(round_trip(&packet), packet);
    }
}

#[test]
fn connect_wire_bytes() {
    let connect = Packet::Connect(Box::new(Connect {
        clean_session: true,
        keep_alive: 60,
        client_id: ByteString::from_static("c1"),
        last_will: None,
        username: None,
        password: None,
    }));

    let bytes = connect.to_bytes().unwrap();
    assert_eq!(
        bytes,
        Bytes::from_static(b"\x10\x0e\x00\x04MQTT\x04\x02\x00\x3c\x00\x02c1")
    );
}

#[test]
fn publish_wire_bytes() {
    let publish = Packet::Publish(Publish {
        dup: false,
        retain: false,
        qos: QoS::AtLeastOnce,
        topic: ByteString::from_static("a/b"),
        packet_id: Some(packet_id(5)),
        payload: Bytes::from_static(b"hi"),
    });

    let bytes = publish.to_bytes().unwrap();
    // flags nibble carries only the QoS 1 bit
    assert_eq!(bytes[0], 0x32);
    assert_eq!(bytes, Bytes::from_static(b"\x32\x09\x00\x03a/b\x00\x05hi"));

    match round_trip(&publish) {
        Packet::Publish(decoded) => {
            assert_eq!(decoded.topic.as_str(), "a/b");
            assert_eq!(decoded.qos, QoS::AtLeastOnce);
            assert_eq!(decoded.packet_id, Some(packet_id(5)));
            assert_eq!(decoded.payload, Bytes::from_static(b"hi"));
        }
        other => panic!("unexpected packet: {other:?}"),
    }
}

#[test_case(10, 2; "one byte remaining length")]
#[test_case(200, 3; "two byte remaining length")]
#[test_case(20_000, 4; "three byte remaining length")]
#[test_case(3_000_000, 5; "four byte remaining length")]
fn publish_fixed_header_width(payload_len: usize, header_len: usize) {
    let publish = Packet::Publish(Publish {
        dup: false,
        retain: false,
        qos: QoS::AtMostOnce,
        topic: ByteString::from_static("t"),
        packet_id: None,
        payload: Bytes::from(vec![0x55; payload_len]),
    });

    let bytes = publish.to_bytes().unwrap();
    // body = topic string (3 bytes) + payload
    assert_eq!(bytes.len(), header_len + 3 + payload_len);
    assert_eq!(round_trip(&publish), publish);
}

#[test_case(None, 1)]
#[test_case(Some(1), 2)]
#[test_case(Some(41), 42)]
#[test_case(Some(65_534), 65_535)]
#[test_case(Some(65_535), 1)]
fn packet_id_cycle(current: Option<u16>, expected: u16) {
    let current = current.map(|v| NonZeroU16::new(v).unwrap());
    assert_eq!(next_packet_id(current).get(), expected);
}

#[test]
fn reads_packets_back_to_back() {
    let mut stream = Vec::new();
    let first = Packet::PublishAck { packet_id: packet_id(9) };
    let second = Packet::PingResponse;
    stream.extend_from_slice(&first.to_bytes().unwrap());
    stream.extend_from_slice(&second.to_bytes().unwrap());

    let mut src = Cursor::new(stream);
    assert_eq!(read_packet(&mut src).unwrap(), first);
    assert_eq!(read_packet(&mut src).unwrap(), second);
    assert!(matches!(read_packet(&mut src), Err(ReadError::Transport(_))));
}

#[test]
fn random_payload_round_trip() {
    let mut rng = rand::thread_rng();
    for _ in 0..16 {
        let len = rng.gen_range(0..4096);
        let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let publish = Packet::Publish(Publish {
            dup: false,
            retain: rng.gen(),
            qos: QoS::AtLeastOnce,
            packet_id: Some(next_packet_id(None)),
            topic: ByteString::from_static("random/data"),
            payload: Bytes::from(payload),
        });
        assert_eq!(round_trip(&publish), publish);
    }
}

#[test]
fn incremental_codec_matches_blocking_parser() {
    use ntex_bytes::BytesMut;
    use ntex_codec::{Decoder, Encoder};

    let codec = Codec::new();
    let packet = Packet::Subscribe {
        packet_id: packet_id(11),
        topic_filters: vec![(ByteString::from_static("x/y"), QoS::AtLeastOnce)],
    };

    let mut framed = BytesMut::new();
    codec.encode(packet.clone(), &mut framed).unwrap();

    let mut src = Cursor::new(framed.to_vec());
    assert_eq!(read_packet(&mut src).unwrap(), packet);

    assert_eq!(codec.decode(&mut framed).unwrap(), Some(packet));
}
