use {
    super::root,
    crate::tlv,
    anyhow::{ensure, Context, Result},
};

/// Data Group 1, the Machine Readable Zone.
///
/// See ICAO 9303-10 section 4.7.1
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EfDg1 {
    pub raw: Vec<u8>,
    pub mrz: String,
}

impl EfDg1 {
    pub const TAG: u32 = 0x61;
    pub const MRZ_TAG: u32 = 0x5F1F;

    pub fn from_bytes(data: &[u8]) -> Result<Option<Self>> {
        if data.is_empty() {
            return Ok(None);
        }
        let nodes = tlv::decode(data).context("Decoding EF.DG1")?;
        let mrz = root(&nodes, Self::TAG)?.get_node(Self::MRZ_TAG);
        ensure!(mrz.is_valid_node(), "MRZ ({:04X}) missing", Self::MRZ_TAG);
        let mrz = String::from_utf8(mrz.value().to_vec()).context("MRZ is not text")?;
        Ok(Some(Self {
            raw: data.to_vec(),
            mrz,
        }))
    }
}
