//! BER-TLV trees.
//!
//! Data groups and EF.DIR are BER-TLV encoded (ICAO 9303-10 section 4.4),
//! with application specific and multi-byte tags that do not fit ASN.1
//! schemas well. Files are decoded into a forest of [`Node`]s that can be
//! navigated by tag and occurrence:
//!
//! ```
//! # use emrtd_decode::tlv;
//! let nodes = tlv::decode(&[0x70, 0x05, 0xa0, 0x03, 0x01, 0x01, 0x2a])?;
//! assert_eq!(nodes.get_node(0x70).get_node(0xa0).get_node(0x01).value(), [0x2a_u8]);
//! assert!(!nodes.get_node(0x70).get_node(0x02).get_node(0x01).is_valid_node());
//! # Ok::<(), emrtd_decode::Error>(())
//! ```
//!
//! Lookups never fail: a miss yields [`Node::absent`], and every lookup on the
//! absent node yields the absent node again.

mod codec;

pub use self::codec::{Codec, Leniency, Length, TlvCodec};
use {
    crate::Result,
    bytes::{Buf, Bytes},
    std::fmt::{self, Display, Formatter},
};

static ABSENT: Node = Node::Absent;

/// A BER-TLV tag, stored as its encoded bytes in big-endian order.
///
/// The class and constructed bits are part of the value, so `0x5F1F` is the
/// primitive application tag 31 and `0x7F61` the constructed application tag
/// 97.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Class {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LengthMode {
    #[default]
    Definite,
    Indefinite,
}

/// A single TLV element, or the absent node returned by failed lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Absent,
    Primitive {
        tag:   Tag,
        value: Bytes,
    },
    Constructed {
        tag:         Tag,
        length_mode: LengthMode,
        children:    Vec<Node>,
    },
}

/// An ordered sequence of top level nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nodes(Vec<Node>);

/// Decode BER-TLV bytes with the default [`TlvCodec`].
pub fn decode(data: &[u8]) -> Result<Nodes> {
    TlvCodec::default().decode_nodes(data)
}

/// Decode only the tag and length at the start of `buffer`.
pub fn tag_and_length<B: Buf>(buffer: &mut B) -> Result<(Tag, Length)> {
    TlvCodec::default().decode_header(buffer)
}

fn find(children: &[Node], tag: Tag, occurrence: usize) -> &Node {
    occurrence
        .checked_sub(1)
        .and_then(|skip| {
            children
                .iter()
                .filter(|node| node.tag() == Some(tag))
                .nth(skip)
        })
        .unwrap_or(&ABSENT)
}

impl Tag {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    fn leading_byte(self) -> u8 {
        self.0
            .to_be_bytes()
            .into_iter()
            .find(|&b| b != 0)
            .unwrap_or_default()
    }

    pub fn class(self) -> Class {
        match self.leading_byte() >> 6 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::ContextSpecific,
            _ => Class::Private,
        }
    }

    pub fn is_constructed(self) -> bool {
        self.leading_byte() & 0x20 != 0
    }
}

impl From<u32> for Tag {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Tag> for u32 {
    fn from(value: Tag) -> Self {
        value.0
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

impl Node {
    /// The node returned by every lookup miss.
    pub fn absent() -> &'static Self {
        &ABSENT
    }

    pub fn primitive(tag: u32, value: impl Into<Bytes>) -> Self {
        Self::Primitive {
            tag:   Tag(tag),
            value: value.into(),
        }
    }

    pub fn constructed(tag: u32, children: Vec<Self>) -> Self {
        Self::Constructed {
            tag: Tag(tag),
            length_mode: LengthMode::Definite,
            children,
        }
    }

    /// The tag, or `None` for the absent node.
    pub const fn tag(&self) -> Option<Tag> {
        match self {
            Self::Absent => None,
            Self::Primitive { tag, .. } | Self::Constructed { tag, .. } => Some(*tag),
        }
    }

    pub const fn is_valid_node(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    pub const fn is_constructed(&self) -> bool {
        matches!(self, Self::Constructed { .. })
    }

    /// How the length was encoded in the input. Encoding always uses the
    /// definite form.
    pub const fn length_mode(&self) -> LengthMode {
        match self {
            Self::Constructed { length_mode, .. } => *length_mode,
            _ => LengthMode::Definite,
        }
    }

    /// Value of a primitive node, empty otherwise.
    pub fn value(&self) -> &[u8] {
        match self {
            Self::Primitive { value, .. } => value,
            _ => &[],
        }
    }

    /// Children of a constructed node, empty otherwise.
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Constructed { children, .. } => children,
            _ => &[],
        }
    }

    /// First immediate child with `tag`.
    pub fn get_node(&self, tag: u32) -> &Self {
        self.get_node_by_occur(tag, 1)
    }

    /// The `occurrence`-th (1-based) immediate child with `tag`.
    pub fn get_node_by_occur(&self, tag: u32, occurrence: usize) -> &Self {
        find(self.children(), Tag(tag), occurrence)
    }

    /// Encoded bytes, empty for the absent node.
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        TlvCodec::default().encode(&mut buffer, self);
        buffer
    }

    fn fmt_indented(&self, f: &mut Formatter, depth: usize) -> fmt::Result {
        let indent = depth * 2;
        match self {
            Self::Absent => Ok(()),
            Self::Primitive { tag, value } => writeln!(
                f,
                "{:indent$}{tag} [{}]: {}",
                "",
                value.len(),
                hex::encode_upper(value)
            ),
            Self::Constructed {
                tag,
                length_mode,
                children,
            } => {
                let codec = TlvCodec::default();
                let len: usize = children.iter().map(|c| codec.encoded_size(c)).sum();
                match length_mode {
                    LengthMode::Definite => writeln!(f, "{:indent$}{tag} [{len}]", "")?,
                    LengthMode::Indefinite => {
                        writeln!(f, "{:indent$}{tag} [{len}, indefinite]", "")?;
                    }
                }
                children
                    .iter()
                    .try_for_each(|child| child.fmt_indented(f, depth + 1))
            }
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl Nodes {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }

    /// First top level node with `tag`.
    pub fn get_node(&self, tag: u32) -> &Node {
        self.get_node_by_occur(tag, 1)
    }

    /// The `occurrence`-th (1-based) top level node with `tag`.
    pub fn get_node_by_occur(&self, tag: u32, occurrence: usize) -> &Node {
        find(&self.0, Tag(tag), occurrence)
    }

    /// A forest is always valid, even when empty.
    pub const fn is_valid_node(&self) -> bool {
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        TlvCodec::default().encode(&mut buffer, self);
        buffer
    }
}

impl Display for Nodes {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.iter().try_for_each(|node| node.fmt_indented(f, 0))
    }
}

impl From<Vec<Node>> for Nodes {
    fn from(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }
}

impl<'a> IntoIterator for &'a Nodes {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::Error,
        anyhow::Result,
        hex_literal::hex,
    };

    //  70
    //      02: 123456
    //      A0
    //          01: 7890
    //          02: 45
    //          01: 67
    const NESTED: [u8; 19] = hex!("70110203123456A00A01027890020145010167");

    #[test]
    fn test_decode_and_encode() -> Result<()> {
        let data = hex!(
            "31283012060a04007f000702020402040201020201103012060a04007f00070202040604020102020110"
        );
        let nodes = decode(&data)?;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes.get_node(0x31).children().len(), 2);
        assert_eq!(nodes.encode(), data);
        Ok(())
    }

    #[test]
    fn test_decode_and_access() -> Result<()> {
        let nodes = decode(&NESTED)?;
        let root = nodes.get_node(0x70);
        assert_eq!(root.get_node(0x02).value(), hex!("123456"));
        assert_eq!(root.get_node(0xA0).get_node_by_occur(0x01, 1).value(), hex!("7890"));
        assert_eq!(root.get_node(0xA0).get_node_by_occur(0x02, 1).value(), hex!("45"));
        assert_eq!(root.get_node(0xA0).get_node_by_occur(0x01, 2).value(), hex!("67"));

        assert!(nodes.is_valid_node());
        assert!(root.is_valid_node());
        assert!(root.get_node(0x02).is_valid_node());
        assert!(root.get_node(0xA0).is_valid_node());
        Ok(())
    }

    #[test]
    fn test_absent_lookups() -> Result<()> {
        let nodes = decode(&NESTED)?;
        let root = nodes.get_node(0x70);
        assert!(!nodes.get_node(0x71).is_valid_node());
        assert!(!root.get_node(0x02).get_node(0x01).is_valid_node());
        assert!(!root.get_node(0x02).get_node_by_occur(0x01, 3).is_valid_node());
        assert!(!root.get_node(0x02).get_node(0x01).get_node(0x01).is_valid_node());
        assert_eq!(root.get_node(0x02).get_node(0x01).get_node(0x01).tag(), None);
        assert!(!nodes.get_node_by_occur(0x70, 2).is_valid_node());
        assert!(!root.get_node(0xA0).get_node_by_occur(0x02, 2).is_valid_node());
        assert!(!root.get_node(0xA0).get_node_by_occur(0x01, 0).is_valid_node());
        assert!(!root.get_node(0xA0).get_node_by_occur(0x01, 3).is_valid_node());
        Ok(())
    }

    #[test]
    fn test_absent_node() {
        let node = Node::absent();
        assert_eq!(node.tag(), None);
        assert!(node.value().is_empty());
        assert!(node.encode().is_empty());
        assert!(node.to_string().is_empty());
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_indefinite_length() -> Result<()> {
        //  70
        //      02: 123456
        //      A0 (indefinite length)
        //          01: 7890
        //          02: 45
        //          01: 67
        //      A0
        //          01: 1234
        let nodes = decode(&hex!("70190203123456A080010278900201450101670000A00401021234"))?;
        let root = nodes.get_node(0x70);
        let first = root.get_node_by_occur(0xA0, 1);
        assert_eq!(first.length_mode(), LengthMode::Indefinite);
        assert_eq!(first.get_node_by_occur(0x01, 1).value(), hex!("7890"));
        assert_eq!(first.get_node_by_occur(0x02, 1).value(), hex!("45"));
        assert_eq!(first.get_node_by_occur(0x01, 2).value(), hex!("67"));
        let second = root.get_node_by_occur(0xA0, 2);
        assert_eq!(second.length_mode(), LengthMode::Definite);
        assert_eq!(second.get_node(0x01).value(), hex!("1234"));
        assert!(!root.get_node_by_occur(0xA0, 3).is_valid_node());

        // Re-encoding uses the definite form.
        assert_eq!(
            first.encode(),
            hex!("A00A01027890020145010167")
        );
        Ok(())
    }

    #[test]
    fn test_multi_byte_tags() -> Result<()> {
        let nodes = decode(&hex!("7F6108 5F1F03414243 0100"))?;
        let root = nodes.get_node(0x7F61);
        assert!(root.is_constructed());
        assert_eq!(root.tag().map(Tag::class), Some(Class::Application));
        let mrz = root.get_node(0x5F1F);
        assert!(!mrz.is_constructed());
        assert_eq!(mrz.value(), b"ABC");
        assert!(root.get_node(0x01).is_valid_node());
        assert!(root.get_node(0x01).value().is_empty());
        assert_eq!(nodes.encode(), hex!("7F6108 5F1F03414243 0100"));
        Ok(())
    }

    #[test]
    fn test_multiple_roots() -> Result<()> {
        let nodes = decode(&hex!("0101AA 0101BB 0201CC"))?;
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.get_node_by_occur(0x01, 2).value(), hex!("BB"));
        assert_eq!(nodes.get_node(0x02).value(), hex!("CC"));
        Ok(())
    }

    #[test]
    fn test_long_form_round_trip() -> Result<()> {
        let mut data = hex!("0481C8").to_vec();
        data.extend(std::iter::repeat(0x5a).take(200));
        let nodes = decode(&data)?;
        assert_eq!(nodes.get_node(0x04).value().len(), 200);
        assert_eq!(nodes.encode(), data);
        Ok(())
    }

    #[test]
    fn test_build_and_encode() {
        let nodes = Nodes::new(vec![Node::constructed(0x61, vec![
            Node::primitive(0x4F, hex!("A0000002471001").to_vec()),
        ])]);
        assert_eq!(nodes.encode(), hex!("61094F07A0000002471001"));
    }

    #[test]
    fn test_malformed() {
        for data in [
            &hex!("70")[..],
            &hex!("02101234")[..],
            &hex!("7003020512")[..],
            &hex!("A08001010A")[..],
            &hex!("A08001010A00")[..],
            &hex!("0180010100")[..],
            &hex!("5F")[..],
        ] {
            assert!(
                matches!(decode(data), Err(Error::MalformedTlv(_))),
                "{}",
                hex::encode(data)
            );
        }
    }

    #[test]
    fn test_to_string() -> Result<()> {
        let nodes = decode(&NESTED)?;
        let dump = nodes.to_string();
        assert_eq!(
            dump,
            "70 [17]\n  02 [3]: 123456\n  A0 [10]\n    01 [2]: 7890\n    02 [1]: 45\n    01 [1]: \
             67\n"
        );
        Ok(())
    }
}
