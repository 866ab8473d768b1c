use {
    super::{
        ActiveAuthenticationInfo, ChipAuthenticationInfo, ChipAuthenticationPublicKeyInfo,
        EfDirInfo, PaceDomainParameterInfo, PaceInfo, SecurityInfo, SecurityInfoKind,
        SecurityInfoRecord, TerminalAuthenticationInfo, UnhandledInfo,
    },
    crate::Result,
    tracing::{error, warn},
};

/// Decoded `SecurityInfos` grouped by kind, in the order they were encoded.
///
/// Constructed only by decoding, so [`SecurityInfos::raw`] is always the
/// input the lists were built from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecurityInfos {
    raw: Vec<u8>,
    pace: Vec<PaceInfo>,
    pace_domain_parameter: Vec<PaceDomainParameterInfo>,
    active_authentication: Vec<ActiveAuthenticationInfo>,
    chip_authentication: Vec<ChipAuthenticationInfo>,
    chip_authentication_public_key: Vec<ChipAuthenticationPublicKeyInfo>,
    terminal_authentication: Vec<TerminalAuthenticationInfo>,
    ef_dir: Vec<EfDirInfo>,
    unhandled: Vec<UnhandledInfo>,
}

/// Decode a DER `SET OF SecurityInfo`.
pub fn decode_security_infos(data: &[u8]) -> Result<SecurityInfos> {
    SecurityInfos::from_der_bytes(data)
}

impl SecurityInfos {
    pub fn from_der_bytes(data: &[u8]) -> Result<Self> {
        SecurityInfoRecord::sniff(data)?
            .iter()
            .map(SecurityInfo::classify)
            .try_fold(Self::empty(data), |infos, info| info.map(|info| infos.with(info)))
    }

    fn empty(raw: &[u8]) -> Self {
        Self {
            raw: raw.to_vec(),
            pace: Vec::new(),
            pace_domain_parameter: Vec::new(),
            active_authentication: Vec::new(),
            chip_authentication: Vec::new(),
            chip_authentication_public_key: Vec::new(),
            terminal_authentication: Vec::new(),
            ef_dir: Vec::new(),
            unhandled: Vec::new(),
        }
    }

    fn with(mut self, info: SecurityInfo) -> Self {
        match info {
            SecurityInfo::Pace(info) => self.pace.push(info),
            SecurityInfo::PaceDomainParameter(info) => self.pace_domain_parameter.push(info),
            SecurityInfo::ActiveAuthentication(info) => self.active_authentication.push(info),
            SecurityInfo::ChipAuthentication(info) => self.chip_authentication.push(info),
            SecurityInfo::ChipAuthenticationPublicKey(info) => {
                self.chip_authentication_public_key.push(info);
            }
            SecurityInfo::TerminalAuthentication(info) => self.terminal_authentication.push(info),
            SecurityInfo::EfDir(info) => self.ef_dir.push(info),
            SecurityInfo::Unhandled(info) => self.unhandled.push(info),
        }
        self
    }

    /// The bytes this was decoded from.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn pace_infos(&self) -> &[PaceInfo] {
        &self.pace
    }

    pub fn pace_domain_parameter_infos(&self) -> &[PaceDomainParameterInfo] {
        &self.pace_domain_parameter
    }

    pub fn active_authentication_infos(&self) -> &[ActiveAuthenticationInfo] {
        &self.active_authentication
    }

    pub fn chip_authentication_infos(&self) -> &[ChipAuthenticationInfo] {
        &self.chip_authentication
    }

    pub fn chip_authentication_public_key_infos(&self) -> &[ChipAuthenticationPublicKeyInfo] {
        &self.chip_authentication_public_key
    }

    pub fn terminal_authentication_infos(&self) -> &[TerminalAuthenticationInfo] {
        &self.terminal_authentication
    }

    pub fn ef_dir_infos(&self) -> &[EfDirInfo] {
        &self.ef_dir
    }

    pub fn unhandled_infos(&self) -> &[UnhandledInfo] {
        &self.unhandled
    }

    pub fn count(&self, kind: SecurityInfoKind) -> usize {
        match kind {
            SecurityInfoKind::Pace => self.pace.len(),
            SecurityInfoKind::PaceDomainParameter => self.pace_domain_parameter.len(),
            SecurityInfoKind::ActiveAuthentication => self.active_authentication.len(),
            SecurityInfoKind::ChipAuthentication => self.chip_authentication.len(),
            SecurityInfoKind::ChipAuthenticationPublicKey => {
                self.chip_authentication_public_key.len()
            }
            SecurityInfoKind::TerminalAuthentication => self.terminal_authentication.len(),
            SecurityInfoKind::EfDir => self.ef_dir.len(),
            SecurityInfoKind::Unhandled => self.unhandled.len(),
        }
    }

    /// Number of `SecurityInfo`s of every kind, unhandled included.
    pub fn total_count(&self) -> usize {
        SecurityInfoKind::ALL
            .into_iter()
            .map(|kind| self.count(kind))
            .sum()
    }

    /// Whether every `SecurityInfo` in `subset` also occurs in `self`.
    ///
    /// Records are compared by their exact encoding. EF.CardSecurity for
    /// example must contain every record of EF.CardAccess.
    pub fn contains(&self, subset: &Self) -> bool {
        let (records, candidates) = match (
            SecurityInfoRecord::sniff(&self.raw),
            SecurityInfoRecord::sniff(&subset.raw),
        ) {
            (Ok(records), Ok(candidates)) => (records, candidates),
            (Err(err), _) | (_, Err(err)) => {
                error!(%err, "Can not compare SecurityInfos");
                return false;
            }
        };
        candidates.iter().all(|candidate| {
            let found = records.iter().any(|record| record.raw == candidate.raw);
            if !found {
                warn!(
                    protocol = %candidate.protocol,
                    raw = %hex::encode(&candidate.raw),
                    "SecurityInfo missing"
                );
            }
            found
        })
    }
}
