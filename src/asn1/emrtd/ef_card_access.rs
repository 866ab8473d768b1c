use {crate::SecurityInfos, anyhow::Result};

/// EF.CardAccess, the SecurityInfos needed before PACE.
///
/// See ICAO 9303-10 section 3.11.3
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EfCardAccess {
    pub security_infos: SecurityInfos,
}

impl EfCardAccess {
    pub fn from_bytes(data: &[u8]) -> Result<Option<Self>> {
        if data.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            security_infos: SecurityInfos::from_der_bytes(data)?,
        }))
    }

    pub fn raw(&self) -> &[u8] {
        self.security_infos.raw()
    }
}
