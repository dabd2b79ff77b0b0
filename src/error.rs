use std::io;

/// Errors surfaced while decoding a packet body.
///
/// The bytes were received but violate the v3.1.1 wire format for the
/// declared packet type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid protocol")]
    InvalidProtocol,
    #[error("Invalid length")]
    InvalidLength,
    #[error("Malformed packet")]
    MalformedPacket,
    #[error("Unsupported protocol level")]
    UnsupportedProtocolLevel,
    #[error("Connect frame's reserved flag is set")]
    ConnectReservedFlagSet,
    #[error("ConnectAck frame's reserved flag is set")]
    ConnAckReservedFlagSet,
    #[error("Invalid client id")]
    InvalidClientId,
    #[error("Unsupported packet type: {0:#04x}")]
    UnsupportedPacketType(u8),
    #[error("Max size exceeded")]
    MaxSizeExceeded,
    #[error("utf8 error")]
    Utf8Error,
}

/// Errors surfaced while building a packet.
///
/// A caller supplied field is missing or outside the protocol's legal
/// range. The builder returns this instead of a buffer; no bytes are
/// produced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum EncodeError {
    #[error("Invalid length")]
    InvalidLength,
    #[error("Malformed packet")]
    MalformedPacket,
    #[error("Packet id is required")]
    PacketIdRequired,
    #[error("Topic filter list is empty")]
    EmptyTopicFilters,
    #[error("Password flag requires a user name")]
    PasswordWithoutUsername,
}

/// Errors surfaced while reading a packet from a blocking byte source.
///
/// Transport failures are propagated unchanged from the underlying
/// reader; nothing is retried here.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The byte source failed to supply the requested bytes
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),
    /// The bytes were read but could not be decoded
    #[error("Decoding error: {0}")]
    Decode(#[from] DecodeError),
}
