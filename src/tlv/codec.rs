//! BER-TLV encoding, ISO/IEC 7816-4 section 5.2 and ITU-T X.690 section 8.1.
use {
    super::{LengthMode, Node, Nodes, Tag},
    crate::{ensure_err, Error, Result},
    bytes::{Buf, BufMut, Bytes, BytesMut},
    tracing::warn,
};

/// End-of-contents marker terminating an indefinite length element.
const END_OF_CONTENTS: [u8; 2] = [0x00, 0x00];

pub trait Codec<T> {
    type Parent;

    fn encoded_size(&self, value: &T) -> usize {
        let mut buffer = BytesMut::new();
        self.encode(&mut buffer, value);
        buffer.len()
    }

    fn encode<B: BufMut>(&self, buffer: &mut B, value: &T);

    fn decode<B: Buf>(&self, buffer: &mut B, parent: Self::Parent) -> Result<T>;
}

/// How to handle correctable errors when decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leniency {
    /// Correct errors
    Allow,

    /// Correct, but log a warning.
    Warn,

    /// Be strict and return an error.
    Strict,
}

/// Length field of a TLV header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Length {
    Definite(usize),
    Indefinite,
}

/// BER-TLV codec configuration.
#[derive(Clone, Copy, Debug)]
pub struct TlvCodec {
    /// Long form lengths with leading zeros, or long form where the short
    /// form would do.
    pub non_minimal_length: Leniency,

    /// Constructed elements terminated by `00 00` instead of a length.
    pub indefinite_length: Leniency,

    /// Maximum nesting of constructed elements.
    pub max_depth: usize,
}

/// Default behaviour is to warn on non-canonical lengths.
impl Default for TlvCodec {
    fn default() -> Self {
        Self {
            non_minimal_length: Leniency::Warn,
            indefinite_length:  Leniency::Allow,
            max_depth:          64,
        }
    }
}

fn lenient(leniency: Leniency, msg: &'static str) -> Result<()> {
    match leniency {
        Leniency::Strict => Err(Error::MalformedTlv(msg)),
        Leniency::Warn => {
            warn!("{msg}");
            Ok(())
        }
        Leniency::Allow => Ok(()),
    }
}

impl TlvCodec {
    /// Decode a buffer into a forest of top level nodes.
    pub fn decode_nodes(&self, data: &[u8]) -> Result<Nodes> {
        let mut buffer = Bytes::copy_from_slice(data);
        self.decode(&mut buffer, ())
    }

    /// Read a tag and length, leaving the buffer positioned at the value.
    pub fn decode_header<B: Buf>(&self, buffer: &mut B) -> Result<(Tag, Length)> {
        ensure_err!(
            buffer.remaining() >= 2,
            Error::MalformedTlv("Fewer than 2 bytes left for tag and length")
        );
        let tag: Tag = self.decode(buffer, ())?;
        let length: Length = self.decode(buffer, ())?;
        Ok((tag, length))
    }

    fn decode_forest<B: Buf>(&self, buffer: &mut B, depth: usize) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        while buffer.has_remaining() {
            nodes.push(self.decode(buffer, depth)?);
        }
        Ok(nodes)
    }
}

impl Codec<Tag> for TlvCodec {
    type Parent = ();

    fn encode<B: BufMut>(&self, buffer: &mut B, value: &Tag) {
        let be = value.0.to_be_bytes();
        let trim = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
        buffer.put_slice(&be[trim..]);
    }

    fn decode<B: Buf>(&self, buffer: &mut B, _parent: Self::Parent) -> Result<Tag> {
        ensure_err!(
            buffer.has_remaining(),
            Error::MalformedTlv("EOF when reading tag")
        );
        let first = buffer.get_u8();
        let mut tag = u32::from(first);
        if first & 0x1f == 0x1f {
            // High tag number form, subsequent bytes have bit 8 set except the last.
            loop {
                ensure_err!(
                    buffer.has_remaining(),
                    Error::MalformedTlv("EOF when reading high tag number")
                );
                ensure_err!(
                    tag <= 0x00ff_ffff,
                    Error::MalformedTlv("Tag longer than 4 bytes")
                );
                let byte = buffer.get_u8();
                tag = (tag << 8) | u32::from(byte);
                if byte & 0x80 == 0 {
                    break;
                }
            }
        }
        Ok(Tag(tag))
    }
}

impl Codec<Length> for TlvCodec {
    type Parent = ();

    fn encode<B: BufMut>(&self, buffer: &mut B, value: &Length) {
        match *value {
            Length::Indefinite => buffer.put_u8(0x80),
            Length::Definite(len) if len < 0x80 => buffer.put_u8(len as u8),
            Length::Definite(len) => {
                let be = len.to_be_bytes();
                let trim = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
                let trimmed = &be[trim..];
                buffer.put_u8(0x80 | trimmed.len() as u8);
                buffer.put_slice(trimmed);
            }
        }
    }

    fn decode<B: Buf>(&self, buffer: &mut B, _parent: Self::Parent) -> Result<Length> {
        ensure_err!(
            buffer.has_remaining(),
            Error::MalformedTlv("EOF when reading length")
        );
        let first = buffer.get_u8();
        match first {
            0x00..=0x7f => Ok(Length::Definite(first as usize)),
            0x80 => {
                lenient(self.indefinite_length, "Indefinite length encoding.")?;
                Ok(Length::Indefinite)
            }
            0xff => Err(Error::MalformedTlv("Reserved length byte 0xFF")),
            _ => {
                const BYTES: usize = usize::BITS as usize / 8;
                let len = (first & 0x7f) as usize;
                ensure_err!(len <= BYTES, Error::MalformedTlv("Length too large"));
                ensure_err!(
                    buffer.remaining() >= len,
                    Error::MalformedTlv("EOF when reading long length")
                );
                let mut bytes = [0; BYTES];
                let trim = BYTES - len;
                buffer.copy_to_slice(&mut bytes[trim..]);
                if bytes[trim] == 0 || (len == 1 && bytes[trim] < 0x80) {
                    lenient(self.non_minimal_length, "Length encoding is non-canonical.")?;
                }
                Ok(Length::Definite(usize::from_be_bytes(bytes)))
            }
        }
    }
}

/// Nodes are always encoded with a definite length.
impl Codec<Node> for TlvCodec {
    /// Nesting depth of the node being decoded.
    type Parent = usize;

    fn encode<B: BufMut>(&self, buffer: &mut B, value: &Node) {
        match value {
            Node::Absent => {}
            Node::Primitive { tag, value } => {
                self.encode(buffer, tag);
                self.encode(buffer, &Length::Definite(value.len()));
                buffer.put_slice(value);
            }
            Node::Constructed { tag, children, .. } => {
                let mut content = BytesMut::new();
                for child in children {
                    self.encode(&mut content, child);
                }
                self.encode(buffer, tag);
                self.encode(buffer, &Length::Definite(content.len()));
                buffer.put_slice(&content);
            }
        }
    }

    fn decode<B: Buf>(&self, buffer: &mut B, depth: Self::Parent) -> Result<Node> {
        ensure_err!(
            depth < self.max_depth,
            Error::MalformedTlv("Maximum nesting depth exceeded")
        );
        let (tag, length) = self.decode_header(buffer)?;
        match (tag.is_constructed(), length) {
            (false, Length::Indefinite) => Err(Error::MalformedTlv(
                "Indefinite length on a primitive element",
            )),
            (false, Length::Definite(len)) => {
                ensure_err!(
                    buffer.remaining() >= len,
                    Error::MalformedTlv("Length exceeds remaining bytes")
                );
                Ok(Node::Primitive {
                    tag,
                    value: buffer.copy_to_bytes(len),
                })
            }
            (true, Length::Definite(len)) => {
                ensure_err!(
                    buffer.remaining() >= len,
                    Error::MalformedTlv("Length exceeds remaining bytes")
                );
                let mut content = buffer.copy_to_bytes(len);
                Ok(Node::Constructed {
                    tag,
                    length_mode: LengthMode::Definite,
                    children: self.decode_forest(&mut content, depth + 1)?,
                })
            }
            (true, Length::Indefinite) => {
                let mut children = Vec::new();
                loop {
                    ensure_err!(
                        buffer.has_remaining(),
                        Error::MalformedTlv("Missing end-of-contents after indefinite length")
                    );
                    // Contiguous buffers (slices, `Bytes`) expose everything in `chunk`.
                    if buffer.chunk().starts_with(&END_OF_CONTENTS) {
                        buffer.advance(END_OF_CONTENTS.len());
                        break;
                    }
                    children.push(self.decode(buffer, depth + 1)?);
                }
                Ok(Node::Constructed {
                    tag,
                    length_mode: LengthMode::Indefinite,
                    children,
                })
            }
        }
    }
}

impl Codec<Nodes> for TlvCodec {
    type Parent = ();

    fn encode<B: BufMut>(&self, buffer: &mut B, value: &Nodes) {
        for node in value.iter() {
            self.encode(buffer, node);
        }
    }

    fn decode<B: Buf>(&self, buffer: &mut B, _parent: Self::Parent) -> Result<Nodes> {
        self.decode_forest(buffer, 0).map(Nodes)
    }
}
