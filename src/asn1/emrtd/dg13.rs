use {
    crate::tlv::{self, Length, Tag},
    anyhow::{bail, ensure, Context, Result},
    bytes::Buf,
};

/// Data Group 13, optional details defined by the issuing state.
///
/// Only the root tag is decoded: some issuers put content in DG13 that is
/// not valid BER-TLV.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EfDg13 {
    pub raw:     Vec<u8>,
    /// Contents of the `6D` root tag.
    pub content: Vec<u8>,
}

impl EfDg13 {
    pub const TAG: u32 = 0x6D;

    pub fn from_bytes(data: &[u8]) -> Result<Option<Self>> {
        if data.is_empty() {
            return Ok(None);
        }
        let mut buffer = data;
        let (tag, length) = tlv::tag_and_length(&mut buffer).context("Decoding EF.DG13")?;
        ensure!(
            tag == Tag::new(Self::TAG),
            "Invalid root tag (expected: {:02X}, actual: {tag})",
            Self::TAG
        );
        let Length::Definite(length) = length else {
            bail!("EF.DG13 must have a definite length");
        };
        ensure!(buffer.remaining() >= length, "EF.DG13 content truncated");
        Ok(Some(Self {
            raw:     data.to_vec(),
            content: buffer[..length].to_vec(),
        }))
    }
}
