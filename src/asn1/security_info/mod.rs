//! SecurityInfos, ICAO 9303-11 section 9.2 and BSI TR-03110-3 appendix A.1.
//!
//! ```text
//! SecurityInfos ::= SET OF SecurityInfo
//!
//! SecurityInfo ::= SEQUENCE {
//!     protocol OBJECT IDENTIFIER,
//!     requiredData ANY DEFINED BY protocol,
//!     optionalData ANY DEFINED BY protocol OPTIONAL
//! }
//! ```
//!
//! Which schema applies to a `SecurityInfo` depends on its protocol OID, so
//! decoding happens in two passes: [`SecurityInfoRecord::sniff`] splits the
//! SET into records and reads only the OID, then [`SecurityInfo::classify`]
//! picks the schema using the ordered [`RULES`].

mod infos;
mod record;

pub use self::{
    infos::{decode_security_infos, SecurityInfos},
    record::SecurityInfoRecord,
};
use {
    super::{
        oid::{
            self, is_child_of, ID_AA, ID_CA_DH, ID_CA_ECDH, ID_EF_DIR, ID_PK_DH, ID_PK_ECDH,
            ID_TA, PACE_PROTOCOLS,
        },
        public_key_info::SubjectPublicKeyInfo,
        AnyAlgorithmIdentifier,
    },
    crate::{ensure_err, Error, Result},
    der::{
        asn1::{Int, ObjectIdentifier as Oid, OctetString},
        Decode, DecodeValue, FixedTag, Header, Reader, Sequence, Tag,
    },
    std::fmt::{self, Display, Formatter},
    tracing::debug,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecurityInfoKind {
    Pace,
    PaceDomainParameter,
    ActiveAuthentication,
    ChipAuthentication,
    ChipAuthenticationPublicKey,
    TerminalAuthentication,
    EfDir,
    Unhandled,
}

/// Classification rules, evaluated top to bottom; the first match wins.
/// Records matching none of them are [`SecurityInfoKind::Unhandled`].
pub const RULES: [(SecurityInfoKind, fn(&Oid) -> bool); 7] = [
    (SecurityInfoKind::Pace, is_pace_info),
    (SecurityInfoKind::PaceDomainParameter, is_pace_domain_parameter_info),
    (SecurityInfoKind::ActiveAuthentication, is_active_authentication_info),
    (SecurityInfoKind::ChipAuthentication, is_chip_authentication_info),
    (
        SecurityInfoKind::ChipAuthenticationPublicKey,
        is_chip_authentication_public_key_info,
    ),
    (
        SecurityInfoKind::TerminalAuthentication,
        is_terminal_authentication_info,
    ),
    (SecurityInfoKind::EfDir, is_ef_dir_info),
];

/// A child of id-PACE-DH-GM, id-PACE-ECDH-GM, id-PACE-DH-IM, id-PACE-ECDH-IM
/// or id-PACE-ECDH-CAM.
fn is_pace_info(oid: &Oid) -> bool {
    PACE_PROTOCOLS.iter().any(|branch| is_child_of(oid, branch))
}

/// Exactly one of the PACE mappings.
fn is_pace_domain_parameter_info(oid: &Oid) -> bool {
    PACE_PROTOCOLS.contains(oid)
}

fn is_active_authentication_info(oid: &Oid) -> bool {
    *oid == ID_AA
}

fn is_chip_authentication_info(oid: &Oid) -> bool {
    is_child_of(oid, &ID_CA_DH) || is_child_of(oid, &ID_CA_ECDH)
}

fn is_chip_authentication_public_key_info(oid: &Oid) -> bool {
    *oid == ID_PK_DH || *oid == ID_PK_ECDH
}

fn is_terminal_authentication_info(oid: &Oid) -> bool {
    *oid == ID_TA || is_child_of(oid, &ID_TA)
}

fn is_ef_dir_info(oid: &Oid) -> bool {
    *oid == ID_EF_DIR
}

fn first_match(
    rules: &[(SecurityInfoKind, fn(&Oid) -> bool)],
    protocol: &Oid,
) -> SecurityInfoKind {
    rules
        .iter()
        .find(|(_, matches)| matches(protocol))
        .map_or(SecurityInfoKind::Unhandled, |&(kind, _)| kind)
}

/// ICAO 9303-11 section 9.2.1
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaceInfo {
    pub protocol:     Oid,
    pub version:      i64,
    pub parameter_id: Option<Int>,
}

/// ICAO 9303-11 section 9.2.2
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaceDomainParameterInfo {
    pub protocol:         Oid,
    pub domain_parameter: AnyAlgorithmIdentifier,
    pub parameter_id:     Option<Int>,
}

/// ICAO 9303-11 section 9.2.3
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActiveAuthenticationInfo {
    pub protocol:            Oid,
    pub version:             i64,
    pub signature_algorithm: Oid,
}

/// ICAO 9303-11 section 9.2.4
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChipAuthenticationInfo {
    pub protocol: Oid,
    pub version:  i64,
    pub key_id:   Option<Int>,
}

/// ICAO 9303-11 section 9.2.5
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChipAuthenticationPublicKeyInfo {
    pub protocol:                       Oid,
    pub chip_authentication_public_key: SubjectPublicKeyInfo,
    pub key_id:                         Option<Int>,
}

/// ICAO 9303-11 section 9.2.6
///
/// BSI TR-03110-3 adds an optional `efCVCA` for version 1.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TerminalAuthenticationInfo {
    pub protocol: Oid,
    pub version:  i64,
    pub ef_cvca:  Option<FileId>,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct FileId {
    pub fid:  OctetString,
    pub sfid: Option<OctetString>,
}

/// ICAO 9303-11 section 9.2.8
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EfDirInfo {
    pub protocol: Oid,
    pub ef_dir:   OctetString,
}

/// Decodes a SecurityInfo `SEQUENCE` field by field. Elements after the last
/// known field are extensions and are skipped; they stay in the record's raw
/// bytes.
macro_rules! security_info_sequence {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        impl FixedTag for $name {
            const TAG: Tag = Tag::Sequence;
        }

        impl<'a> DecodeValue<'a> for $name {
            fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
                reader.read_nested(header.length, |reader| {
                    let info = Self {
                        $($field: reader.decode()?,)+
                    };
                    skip_extensions(reader, stringify!($name))?;
                    Ok(info)
                })
            }
        }
    };
}

security_info_sequence!(PaceInfo { protocol, version, parameter_id });
security_info_sequence!(PaceDomainParameterInfo { protocol, domain_parameter, parameter_id });
security_info_sequence!(ActiveAuthenticationInfo { protocol, version, signature_algorithm });
security_info_sequence!(ChipAuthenticationInfo { protocol, version, key_id });
security_info_sequence!(ChipAuthenticationPublicKeyInfo {
    protocol,
    chip_authentication_public_key,
    key_id,
});
security_info_sequence!(TerminalAuthenticationInfo { protocol, version, ef_cvca });
security_info_sequence!(EfDirInfo { protocol, ef_dir });

fn skip_extensions<'a, R: Reader<'a>>(reader: &mut R, schema: &str) -> der::Result<()> {
    let mut skipped = 0_usize;
    while !reader.is_finished() {
        reader.tlv_bytes()?;
        skipped += 1;
    }
    if skipped > 0 {
        debug!(schema, skipped, "Skipped unknown trailing elements");
    }
    Ok(())
}

/// A SecurityInfo for a protocol we do not interpret.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnhandledInfo {
    pub protocol:  Oid,
    /// Complete DER encoding of the SecurityInfo.
    pub raw:       Vec<u8>,
    /// Everything after the protocol OID.
    pub remainder: Vec<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SecurityInfo {
    Pace(PaceInfo),
    PaceDomainParameter(PaceDomainParameterInfo),
    ActiveAuthentication(ActiveAuthenticationInfo),
    ChipAuthentication(ChipAuthenticationInfo),
    ChipAuthenticationPublicKey(ChipAuthenticationPublicKeyInfo),
    TerminalAuthentication(TerminalAuthenticationInfo),
    EfDir(EfDirInfo),
    Unhandled(UnhandledInfo),
}

impl SecurityInfoKind {
    pub const ALL: [Self; 8] = [
        Self::Pace,
        Self::PaceDomainParameter,
        Self::ActiveAuthentication,
        Self::ChipAuthentication,
        Self::ChipAuthenticationPublicKey,
        Self::TerminalAuthentication,
        Self::EfDir,
        Self::Unhandled,
    ];

    /// Apply [`RULES`] to a protocol OID.
    pub fn classify(protocol: &Oid) -> Self {
        first_match(&RULES, protocol)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pace => "PACEInfo",
            Self::PaceDomainParameter => "PACEDomainParameterInfo",
            Self::ActiveAuthentication => "ActiveAuthenticationInfo",
            Self::ChipAuthentication => "ChipAuthenticationInfo",
            Self::ChipAuthenticationPublicKey => "ChipAuthenticationPublicKeyInfo",
            Self::TerminalAuthentication => "TerminalAuthenticationInfo",
            Self::EfDir => "EFDIRInfo",
            Self::Unhandled => "UnhandledInfo",
        }
    }
}

impl Display for SecurityInfoKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PaceInfo {
    /// ICAO 9303-11 section 9.2.1: version SHALL be 2.
    pub const VERSION: i64 = 2;

    fn validate(&self) -> Result<()> {
        ensure_err!(
            self.version == Self::VERSION,
            Error::ProtocolInvariantViolation(format!(
                "PACEInfo version must be {} (version: {})",
                Self::VERSION,
                self.version
            ))
        );
        Ok(())
    }
}

impl SecurityInfo {
    /// Decode a record with the schema selected by its protocol OID.
    pub fn classify(record: &SecurityInfoRecord) -> Result<Self> {
        let kind = SecurityInfoKind::classify(&record.protocol);
        debug!(
            protocol = %oid::name(&record.protocol),
            %kind,
            raw = %hex::encode(&record.raw),
            "Parsing SecurityInfo"
        );
        let schema = |source| Error::SchemaMismatch { kind, source };
        let raw = record.raw.as_slice();
        Ok(match kind {
            SecurityInfoKind::Pace => {
                let info = PaceInfo::from_der(raw).map_err(schema)?;
                info.validate()?;
                Self::Pace(info)
            }
            SecurityInfoKind::PaceDomainParameter => {
                Self::PaceDomainParameter(PaceDomainParameterInfo::from_der(raw).map_err(schema)?)
            }
            SecurityInfoKind::ActiveAuthentication => Self::ActiveAuthentication(
                ActiveAuthenticationInfo::from_der(raw).map_err(schema)?,
            ),
            SecurityInfoKind::ChipAuthentication => {
                Self::ChipAuthentication(ChipAuthenticationInfo::from_der(raw).map_err(schema)?)
            }
            SecurityInfoKind::ChipAuthenticationPublicKey => Self::ChipAuthenticationPublicKey(
                ChipAuthenticationPublicKeyInfo::from_der(raw).map_err(schema)?,
            ),
            SecurityInfoKind::TerminalAuthentication => Self::TerminalAuthentication(
                TerminalAuthenticationInfo::from_der(raw).map_err(schema)?,
            ),
            SecurityInfoKind::EfDir => Self::EfDir(EfDirInfo::from_der(raw).map_err(schema)?),
            SecurityInfoKind::Unhandled => Self::Unhandled(UnhandledInfo {
                protocol:  record.protocol,
                raw:       record.raw.clone(),
                remainder: record.remainder.clone(),
            }),
        })
    }

    pub const fn kind(&self) -> SecurityInfoKind {
        match self {
            Self::Pace(_) => SecurityInfoKind::Pace,
            Self::PaceDomainParameter(_) => SecurityInfoKind::PaceDomainParameter,
            Self::ActiveAuthentication(_) => SecurityInfoKind::ActiveAuthentication,
            Self::ChipAuthentication(_) => SecurityInfoKind::ChipAuthentication,
            Self::ChipAuthenticationPublicKey(_) => SecurityInfoKind::ChipAuthenticationPublicKey,
            Self::TerminalAuthentication(_) => SecurityInfoKind::TerminalAuthentication,
            Self::EfDir(_) => SecurityInfoKind::EfDir,
            Self::Unhandled(_) => SecurityInfoKind::Unhandled,
        }
    }

    pub const fn protocol(&self) -> &Oid {
        match self {
            Self::Pace(info) => &info.protocol,
            Self::PaceDomainParameter(info) => &info.protocol,
            Self::ActiveAuthentication(info) => &info.protocol,
            Self::ChipAuthentication(info) => &info.protocol,
            Self::ChipAuthenticationPublicKey(info) => &info.protocol,
            Self::TerminalAuthentication(info) => &info.protocol,
            Self::EfDir(info) => &info.protocol,
            Self::Unhandled(info) => &info.protocol,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::asn1::oid::{ID_PACE, ID_PACE_DH_GM, ID_PACE_ECDH_CAM, ID_PACE_ECDH_GM, ID_PK},
        anyhow::Result,
        hex_literal::hex,
    };

    fn record(raw: &[u8]) -> Result<SecurityInfoRecord> {
        let mut set = vec![0x31, u8::try_from(raw.len())?];
        set.extend_from_slice(raw);
        let mut records = SecurityInfoRecord::sniff(&set)?;
        anyhow::ensure!(records.len() == 1);
        Ok(records.remove(0))
    }

    #[test]
    fn test_rule_order() {
        let kinds: Vec<_> = RULES.iter().map(|&(kind, _)| kind).collect();
        assert_eq!(kinds, &SecurityInfoKind::ALL[..7]);
    }

    #[test]
    fn test_classify_oids() {
        use SecurityInfoKind::*;
        for (oid, kind) in [
            ("0.4.0.127.0.7.2.2.4.2.4", Pace),
            ("0.4.0.127.0.7.2.2.4.6.4", Pace),
            ("0.4.0.127.0.7.2.2.4.1.1.9", Pace),
            ("0.4.0.127.0.7.2.2.4.2", PaceDomainParameter),
            ("0.4.0.127.0.7.2.2.4.6", PaceDomainParameter),
            ("0.4.0.127.0.7.2.2.4", Unhandled),
            ("0.4.0.127.0.7.2.2.4.5.1", Unhandled),
            ("2.23.136.1.1.5", ActiveAuthentication),
            ("2.23.136.1.1.5.1", Unhandled),
            ("0.4.0.127.0.7.2.2.3.1.1", ChipAuthentication),
            ("0.4.0.127.0.7.2.2.3.2.4", ChipAuthentication),
            ("0.4.0.127.0.7.2.2.3.2", Unhandled),
            ("0.4.0.127.0.7.2.2.1.1", ChipAuthenticationPublicKey),
            ("0.4.0.127.0.7.2.2.1.2", ChipAuthenticationPublicKey),
            ("0.4.0.127.0.7.2.2.1.2.1", Unhandled),
            ("0.4.0.127.0.7.2.2.2", TerminalAuthentication),
            ("0.4.0.127.0.7.2.2.2.1", TerminalAuthentication),
            ("2.23.136.1.1.13", EfDir),
            ("0.4.0.127.0.7.2.2.8", Unhandled),
        ] {
            assert_eq!(SecurityInfoKind::classify(&Oid::new_unwrap(oid)), kind, "{oid}");
        }
    }

    #[test]
    fn test_first_rule_wins() {
        // Exact PACE mappings are also children of id-PACE, but the PACEInfo
        // rule only looks at the five mappings, so the exact match falls
        // through to the domain parameter rule.
        for protocol in PACE_PROTOCOLS {
            assert!(is_child_of(&protocol, &ID_PACE));
            assert!(!is_pace_info(&protocol));
            assert!(is_pace_domain_parameter_info(&protocol));
            assert_eq!(
                SecurityInfoKind::classify(&protocol),
                SecurityInfoKind::PaceDomainParameter
            );
        }

        // A grandchild of a mapping matches the PACEInfo rule before any later rule.
        let grandchild = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.1.2.3");
        assert!(is_child_of(&grandchild, &ID_PACE_DH_GM));
        assert_eq!(SecurityInfoKind::classify(&grandchild), SecurityInfoKind::Pace);
        assert!(!is_chip_authentication_public_key_info(&ID_PK));
        assert!(!is_pace_info(&ID_PACE_ECDH_GM));
        assert!(!is_pace_info(&ID_PACE_ECDH_CAM));
    }

    #[test]
    fn test_first_rule_wins_across_families() {
        fn is_child_of_pk(oid: &Oid) -> bool {
            is_child_of(oid, &ID_PK)
        }

        // id-PK-ECDH matches both a prefix rule and an exact rule.
        assert!(is_child_of_pk(&ID_PK_ECDH));
        assert!(is_chip_authentication_public_key_info(&ID_PK_ECDH));

        let prefix_first: [(SecurityInfoKind, fn(&Oid) -> bool); 2] = [
            (SecurityInfoKind::Unhandled, is_child_of_pk),
            (
                SecurityInfoKind::ChipAuthenticationPublicKey,
                is_chip_authentication_public_key_info,
            ),
        ];
        assert_eq!(first_match(&prefix_first, &ID_PK_ECDH), SecurityInfoKind::Unhandled);

        let exact_first = [prefix_first[1], prefix_first[0]];
        assert_eq!(
            first_match(&exact_first, &ID_PK_ECDH),
            SecurityInfoKind::ChipAuthenticationPublicKey
        );

        // Only the prefix rule applies to a sibling.
        let ri = Oid::new_unwrap("0.4.0.127.0.7.2.2.1.3");
        assert_eq!(first_match(&exact_first, &ri), SecurityInfoKind::Unhandled);
        assert_eq!(first_match(&[], &ID_PK_ECDH), SecurityInfoKind::Unhandled);
    }

    #[test]
    fn test_pace_info() -> Result<()> {
        let record = record(&hex!("3012 060a04007f00070202040204 020102 020110"))?;
        let info = SecurityInfo::classify(&record)?;
        let SecurityInfo::Pace(pace) = &info else {
            anyhow::bail!("expected PACEInfo, got {info:?}");
        };
        assert_eq!(pace.protocol, Oid::new_unwrap("0.4.0.127.0.7.2.2.4.2.4"));
        assert_eq!(pace.version, 2);
        assert_eq!(pace.parameter_id.as_ref().map(Int::as_bytes), Some(&hex!("10")[..]));
        assert_eq!(info.kind(), SecurityInfoKind::Pace);
        assert_eq!(info.protocol(), &pace.protocol);
        Ok(())
    }

    #[test]
    fn test_pace_version() -> Result<()> {
        let record = record(&hex!("3012 060a04007f00070202040204 020101 020110"))?;
        assert!(matches!(
            SecurityInfo::classify(&record),
            Err(Error::ProtocolInvariantViolation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_negative_version() -> Result<()> {
        let info = record(&hex!("3012 060a04007f00070202040204 0201ff 020110"))?;
        assert!(matches!(
            SecurityInfo::classify(&info),
            Err(Error::ProtocolInvariantViolation(_))
        ));

        let info = record(&hex!("3012 060a04007f00070202030204 0201ff 020101"))?;
        let SecurityInfo::ChipAuthentication(info) = SecurityInfo::classify(&info)? else {
            anyhow::bail!("expected ChipAuthenticationInfo");
        };
        assert_eq!(info.version, -1);
        Ok(())
    }

    #[test]
    fn test_trailing_elements() -> Result<()> {
        let info = record(&hex!("3015 060a04007f00070202040204 020102 020110 010100"))?;
        let SecurityInfo::Pace(pace) = SecurityInfo::classify(&info)? else {
            anyhow::bail!("expected PACEInfo");
        };
        assert_eq!(pace.version, 2);
        assert_eq!(pace.parameter_id.as_ref().map(Int::as_bytes), Some(&hex!("10")[..]));

        // An INTEGER where efCVCA would be is not a FileId.
        let info = record(&hex!("3010 060804007f0007020202 020101 020101"))?;
        let SecurityInfo::TerminalAuthentication(ta) = SecurityInfo::classify(&info)? else {
            anyhow::bail!("expected TerminalAuthenticationInfo");
        };
        assert_eq!(ta.version, 1);
        assert_eq!(ta.ef_cvca, None);

        let info = record(&hex!(
            "3018 060804007f0007020202 020101 3004 0402011c 0403010203"
        ))?;
        let SecurityInfo::TerminalAuthentication(ta) = SecurityInfo::classify(&info)? else {
            anyhow::bail!("expected TerminalAuthenticationInfo");
        };
        assert_eq!(ta.ef_cvca.map(|id| id.fid.as_bytes().to_vec()), Some(vec![0x01, 0x1c]));

        // Trailing bytes must still be well formed TLVs.
        let info = record(&hex!("3013 060a04007f00070202040204 020102 020110 05"))?;
        assert!(matches!(
            SecurityInfo::classify(&info),
            Err(Error::SchemaMismatch {
                kind: SecurityInfoKind::Pace,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn test_schema_mismatch() -> Result<()> {
        // Version encoded as an OCTET STRING.
        let record = record(&hex!("3012 060a04007f00070202040204 040102 020110"))?;
        assert!(matches!(
            SecurityInfo::classify(&record),
            Err(Error::SchemaMismatch {
                kind: SecurityInfoKind::Pace,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn test_terminal_authentication_ef_cvca() -> Result<()> {
        let record = record(&hex!("3016 060804007f0007020202 020101 3007 0402011c 04011c"))?;
        let SecurityInfo::TerminalAuthentication(info) = SecurityInfo::classify(&record)? else {
            anyhow::bail!("expected TerminalAuthenticationInfo");
        };
        assert_eq!(info.version, 1);
        let ef_cvca = info.ef_cvca.expect("efCVCA present");
        assert_eq!(ef_cvca.fid.as_bytes(), hex!("011c"));
        assert_eq!(ef_cvca.sfid.map(|sfid| sfid.as_bytes().to_vec()), Some(vec![0x1c]));
        Ok(())
    }

    #[test]
    fn test_unhandled() -> Result<()> {
        let record = record(&hex!("300c 060804007f0007020208 3100"))?;
        let info = SecurityInfo::classify(&record)?;
        let SecurityInfo::Unhandled(unhandled) = info else {
            anyhow::bail!("expected UnhandledInfo");
        };
        assert_eq!(unhandled.remainder, hex!("3100"));
        assert_eq!(unhandled.raw, hex!("300c 060804007f0007020208 3100"));
        Ok(())
    }
}
