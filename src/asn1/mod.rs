//! Pure ASN1 types, no application logic.
//!
//! Parsing is done as deeply as is useful, for example a `SecurityInfo` is
//! parsed into an enum of the known protocols with a catch-all for
//! unimplemented cases. This ensures that rich types are available for the
//! application to use, but still allows for parsing of all valid inputs.
//!
//! A second goal is for comparisons to be exact. Real world data is not always
//! DER compliant and our types do not capture every field, so the raw
//! encoding of each [`SecurityInfoRecord`](security_info::SecurityInfoRecord)
//! is kept and compared byte for byte.

pub mod emrtd;
pub mod oid;
pub mod public_key_info;
pub mod security_info;

use der::{asn1::ObjectIdentifier as Oid, Any, Sequence};

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct AnyAlgorithmIdentifier {
    pub algorithm:  Oid,
    pub parameters: Option<Any>,
}
