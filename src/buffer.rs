use ntex_bytes::{Bytes, BytesMut};

/// Ordered, append only sequence of byte bearing parts.
///
/// Packet assembly needs the total body length before the fixed header,
/// which embeds that length, can be emitted. Builders therefore collect
/// fixed header, variable header and payload as separate parts and defer
/// concatenation until the whole packet is known; the payload part in
/// particular is shared, not copied, until [`flatten`](Self::flatten).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PacketBuffer {
    parts: Vec<Part>,
}

#[derive(Debug, PartialEq, Eq)]
enum Part {
    Raw(Bytes),
    Nested(PacketBuffer),
}

impl PacketBuffer {
    pub fn new() -> Self {
        PacketBuffer { parts: Vec::new() }
    }

    /// Append a raw byte part.
    pub fn push<B: Into<Bytes>>(&mut self, part: B) {
        self.parts.push(Part::Raw(part.into()));
    }

    /// Append a nested buffer; its parts keep their order and are
    /// flattened depth first.
    pub fn push_buffer(&mut self, buf: PacketBuffer) {
        self.parts.push(Part::Nested(buf));
    }

    /// Total byte length of all parts, aggregated on demand.
    pub fn len(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match part {
                Part::Raw(bytes) => bytes.len(),
                Part::Nested(buf) => buf.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate all parts into one contiguous byte sequence.
    ///
    /// Consumes the buffer; the single copy of every part happens here.
    pub fn flatten(self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.len());
        self.write_to(&mut dst);
        dst.freeze()
    }

    pub(crate) fn write_to(self, dst: &mut BytesMut) {
        for part in self.parts {
            match part {
                Part::Raw(bytes) => dst.extend_from_slice(&bytes),
                Part::Nested(buf) => buf.write_to(dst),
            }
        }
    }
}
