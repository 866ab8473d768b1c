//! Object identifiers from ICAO 9303-11 section 9.2 and BSI TR-03110-3.

use der::asn1::ObjectIdentifier as Oid;

pub const BSI_DE: Oid = Oid::new_unwrap("0.4.0.127.0.7");

pub const ID_PK: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.1");
pub const ID_PK_DH: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.1.1");
pub const ID_PK_ECDH: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.1.2");

pub const ID_TA: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.2");

pub const ID_CA: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3");
pub const ID_CA_DH: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3.1");
pub const ID_CA_ECDH: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3.2");

pub const ID_PACE: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4");
pub const ID_PACE_DH_GM: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.1");
pub const ID_PACE_ECDH_GM: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.2");
pub const ID_PACE_DH_IM: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.3");
pub const ID_PACE_ECDH_IM: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.4");
pub const ID_PACE_ECDH_CAM: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.6");

/// The five PACE key agreement mappings.
pub const PACE_PROTOCOLS: [Oid; 5] = [
    ID_PACE_DH_GM,
    ID_PACE_ECDH_GM,
    ID_PACE_DH_IM,
    ID_PACE_ECDH_IM,
    ID_PACE_ECDH_CAM,
];

/// RFC 5652 content type of `SignedData`.
pub const ID_SIGNED_DATA: Oid = Oid::new_unwrap("1.2.840.113549.1.7.2");

/// eContentType of EF.CardSecurity.
pub const ID_SECURITY_OBJECT: Oid = Oid::new_unwrap("0.4.0.127.0.7.3.2.1");

pub const ID_ICAO_MRTD_SECURITY: Oid = Oid::new_unwrap("2.23.136.1.1");
pub const ID_AA: Oid = Oid::new_unwrap("2.23.136.1.1.5");
pub const ID_EF_DIR: Oid = Oid::new_unwrap("2.23.136.1.1.13");

/// Public key algorithms (RFC 3279 and X9.42).
pub const ID_RSA_ENCRYPTION: Oid = Oid::new_unwrap("1.2.840.113549.1.1.1");
pub const ID_DH_PUBLIC_NUMBER: Oid = Oid::new_unwrap("1.2.840.10046.2.1");
pub const ID_EC_PUBLIC_KEY: Oid = Oid::new_unwrap("1.2.840.10045.2.1");

/// Whether `oid` lies strictly below `branch` in the OID tree.
///
/// The last byte of an encoded OID never has bit 8 set, so a byte prefix is
/// always an arc prefix.
pub fn is_child_of(oid: &Oid, branch: &Oid) -> bool {
    let (oid, branch) = (oid.as_bytes(), branch.as_bytes());
    oid.len() > branch.len() && oid.starts_with(branch)
}

/// Human readable name for logging, falling back to dotted notation.
pub fn name(oid: &Oid) -> String {
    const_oid::db::DB
        .by_oid(oid)
        .map_or_else(|| oid.to_string(), ToString::to_string)
}
