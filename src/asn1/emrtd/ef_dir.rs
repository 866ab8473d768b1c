use {
    crate::tlv,
    anyhow::{ensure, Context, Result},
};

/// EF.DIR, the list of applications present on the chip.
///
/// See ICAO 9303-10 section 3.11.1
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EfDir {
    pub raw:          Vec<u8>,
    /// Application identifiers, in file order.
    pub applications: Vec<Vec<u8>>,
}

impl EfDir {
    pub const APPLICATION_TAG: u32 = 0x61;
    pub const AID_TAG: u32 = 0x4F;

    pub fn from_bytes(data: &[u8]) -> Result<Option<Self>> {
        if data.is_empty() {
            return Ok(None);
        }
        let nodes = tlv::decode(data).context("Decoding EF.DIR")?;
        let applications = (1..)
            .map(|occurrence| nodes.get_node_by_occur(Self::APPLICATION_TAG, occurrence))
            .take_while(|application| application.is_valid_node())
            .map(|application| {
                let aid = application.get_node(Self::AID_TAG);
                ensure!(aid.is_valid_node(), "Application template without AID");
                Ok(aid.value().to_vec())
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Self {
            raw: data.to_vec(),
            applications,
        }))
    }
}
