use {
    crate::{Error, Result},
    der::{asn1::ObjectIdentifier as Oid, Decode, Header, Reader, SliceReader, Tag},
    tracing::warn,
};

/// A single `SecurityInfo` with only its protocol decoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecurityInfoRecord {
    pub protocol:  Oid,
    /// Complete DER encoding, tag and length included.
    pub raw:       Vec<u8>,
    /// Contents following the protocol OID.
    pub remainder: Vec<u8>,
}

impl SecurityInfoRecord {
    /// Split a DER `SET OF SecurityInfo` into records.
    ///
    /// Every element must be a SEQUENCE starting with an OBJECT IDENTIFIER.
    /// Bytes following the SET are ignored.
    pub fn sniff(data: &[u8]) -> Result<Vec<Self>> {
        let mut reader = SliceReader::new(data).map_err(Error::MalformedAsn1)?;
        let records = Self::decode_set(&mut reader).map_err(Error::MalformedAsn1)?;
        if !reader.is_finished() {
            warn!(
                trailing = %reader.remaining_len(),
                "Ignoring data following SecurityInfos"
            );
        }
        Ok(records)
    }

    fn decode_set(reader: &mut SliceReader<'_>) -> der::Result<Vec<Self>> {
        let header = Header::decode(reader)?;
        header.tag.assert_eq(Tag::Set)?;
        reader.read_nested(header.length, |reader| {
            let mut records = Vec::new();
            while !reader.is_finished() {
                records.push(Self::from_tlv(reader.tlv_bytes()?)?);
            }
            Ok(records)
        })
    }

    fn from_tlv(raw: &[u8]) -> der::Result<Self> {
        let mut reader = SliceReader::new(raw)?;
        let (protocol, remainder) = reader.sequence(|reader| {
            let protocol = Oid::decode(reader)?;
            let length = reader.remaining_len();
            let remainder = reader.read_slice(length)?;
            Ok((protocol, remainder.to_vec()))
        })?;
        Ok(Self {
            protocol,
            raw: raw.to_vec(),
            remainder,
        })
    }
}
