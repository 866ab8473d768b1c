use {
    super::root,
    crate::{asn1::public_key_info::SubjectPublicKeyInfo, tlv},
    anyhow::{anyhow, ensure, Context, Result},
    der::Decode,
};

/// Data Group 15, the Active Authentication public key.
///
/// See ICAO 9303-10 section 4.7.15
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EfDg15 {
    pub raw: Vec<u8>,
    /// DER encoded `SubjectPublicKeyInfo`.
    pub subject_public_key_info: Vec<u8>,
}

impl EfDg15 {
    pub const TAG: u32 = 0x6F;

    pub fn from_bytes(data: &[u8]) -> Result<Option<Self>> {
        if data.is_empty() {
            return Ok(None);
        }
        let nodes = tlv::decode(data).context("Decoding EF.DG15")?;
        let subject_public_key_info = root(&nodes, Self::TAG)?.get_node(0x30).encode();
        ensure!(
            !subject_public_key_info.is_empty(),
            "SubjectPublicKeyInfo missing from EF.DG15"
        );
        Ok(Some(Self {
            raw: data.to_vec(),
            subject_public_key_info,
        }))
    }

    pub fn public_key(&self) -> Result<SubjectPublicKeyInfo> {
        SubjectPublicKeyInfo::from_der(&self.subject_public_key_info).map_err(|e| anyhow!(e))
    }
}
