use {
    super::{
        oid::{ID_DH_PUBLIC_NUMBER, ID_EC_PUBLIC_KEY, ID_PK_DH, ID_PK_ECDH, ID_RSA_ENCRYPTION},
        AnyAlgorithmIdentifier,
    },
    crate::ensure_err,
    der::{
        asn1::{BitString, Int, Null, ObjectIdentifier as Oid, OctetString},
        Any, Choice, Decode, Encode, Error, ErrorKind, Length, Result, Sequence, Tag,
    },
};

/// Public key with its algorithm, as found in DG15 and
/// `ChipAuthenticationPublicKeyInfo`.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct SubjectPublicKeyInfo {
    pub algorithm:          AnyAlgorithmIdentifier,
    pub subject_public_key: BitString,
}

/// Interpretation of [`AnyAlgorithmIdentifier::parameters`] for the key
/// algorithms used by eMRTDs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PublicKeyParameters {
    Rsa,
    Dh(DhAlgoParameters),
    Ec(ECAlgoParameters),
    Unknown(Oid),
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct RsaPublicKeyInfo {
    pub modulus:         Int,
    pub public_exponent: Int,
}

/// Diffie-Hellman Mod-P Group Parameters.
///
/// RFC 3279 `DomainParameters`, referenced by ICAO 9303-11 for DH based
/// Chip Authentication and PACE.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct DhAlgoParameters {
    pub prime:             Int,
    pub base:              Int,
    pub order:             Int,
    pub cofactor:          Option<Int>,
    pub validation_params: Option<ValidationParams>,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct ValidationParams {
    pub seed:         BitString,
    pub pgen_counter: Int,
}

/// Elliptic Curve Algorithm Parameters.
///
/// **Note**: This deviates from RFC 5480 by allowing for explicit
/// parameters using `EcParameters` in addition to named curves. This
/// is used by at least some Dutch eMRTDs.
///
/// [TR-03111] `Parameters`
#[derive(Clone, Debug, Eq, PartialEq, Choice)]
pub enum ECAlgoParameters {
    EcParameters(EcParameters),
    NamedCurve(Oid),
    ImplicitlyCA(Null),
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct EcParameters {
    pub version:  u64,
    pub field_id: FieldId,
    pub curve:    Curve,
    pub base:     ECPoint,
    pub order:    Int,
    pub cofactor: Option<Int>,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct FieldId {
    pub field_type: Oid,
    pub parameters: Any,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct Curve {
    pub a:    FieldElement,
    pub b:    FieldElement,
    pub seed: Option<BitString>,
}

pub type FieldElement = OctetString;

pub type ECPoint = OctetString;

fn decode_parameters<T: for<'a> Decode<'a>>(parameters: Option<&Any>) -> Result<T> {
    let parameters = parameters.ok_or_else(|| {
        Error::new(
            ErrorKind::TagUnexpected {
                expected: None,
                actual:   Tag::Null, // Actually absent
            },
            Length::ZERO,
        )
    })?;
    T::from_der(&parameters.to_der()?)
}

impl SubjectPublicKeyInfo {
    pub fn parameters(&self) -> Result<PublicKeyParameters> {
        let parameters = self.algorithm.parameters.as_ref();
        Ok(match self.algorithm.algorithm {
            ID_RSA_ENCRYPTION => PublicKeyParameters::Rsa,
            ID_DH_PUBLIC_NUMBER | ID_PK_DH => {
                PublicKeyParameters::Dh(decode_parameters(parameters)?)
            }
            ID_EC_PUBLIC_KEY | ID_PK_ECDH => {
                PublicKeyParameters::Ec(decode_parameters(parameters)?)
            }
            oid => PublicKeyParameters::Unknown(oid),
        })
    }

    /// RFC 3279 `RSAPublicKey` carried in the subject public key bits.
    pub fn rsa_public_key(&self) -> Result<RsaPublicKeyInfo> {
        let oid = self.algorithm.algorithm;
        ensure_err!(
            oid == ID_RSA_ENCRYPTION,
            Error::new(ErrorKind::OidUnknown { oid }, Length::ZERO)
        );
        RsaPublicKeyInfo::from_der(self.subject_public_key.raw_bytes())
    }
}
