use {
    super::root,
    crate::{
        tlv::{self, Length, Tag},
        SecurityInfos,
    },
    anyhow::{bail, ensure, Context, Result},
    bytes::Buf,
};

/// Data Group 14, the SecurityInfos for Chip Authentication and PACE.
///
/// See ICAO 9303-10 section 4.7.14
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EfDg14 {
    pub raw:            Vec<u8>,
    pub security_infos: SecurityInfos,
}

impl EfDg14 {
    pub const TAG: u32 = 0x6E;
    pub const SECURITY_INFOS_TAG: u32 = 0x31;

    pub fn from_bytes(data: &[u8]) -> Result<Option<Self>> {
        if data.is_empty() {
            return Ok(None);
        }
        let nodes = tlv::decode(data).context("Decoding EF.DG14")?;
        let set = root(&nodes, Self::TAG)?.get_node(Self::SECURITY_INFOS_TAG);
        ensure!(set.is_valid_node(), "SecurityInfos missing from EF.DG14");
        let security_infos = SecurityInfos::from_der_bytes(Self::security_infos_bytes(data)?)?;
        Ok(Some(Self {
            raw: data.to_vec(),
            security_infos,
        }))
    }

    /// The encoded SecurityInfos SET as stored in the file.
    fn security_infos_bytes(data: &[u8]) -> Result<&[u8]> {
        let mut content = data;
        if let (_, Length::Definite(length)) = tlv::tag_and_length(&mut content)? {
            content = &content[..length.min(content.len())];
        }
        while content.has_remaining() {
            let element = content;
            let (tag, length) = tlv::tag_and_length(&mut content)?;
            let Length::Definite(length) = length else {
                bail!("Indefinite length in EF.DG14, SecurityInfos must be DER");
            };
            ensure!(content.remaining() >= length, "EF.DG14 content truncated");
            if tag == Tag::new(Self::SECURITY_INFOS_TAG) {
                let header = element.len() - content.len();
                return Ok(&element[..header + length]);
            }
            content.advance(length);
        }
        bail!("SecurityInfos missing from EF.DG14")
    }
}
