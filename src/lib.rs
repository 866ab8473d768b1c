//! Structured-data decoding for ICAO 9303 eMRTDs.
//!
//! Two layers:
//!
//! * [`tlv`] decodes the BER-TLV files read from the chip (data groups, EF.DIR)
//!   into a navigable tree, and encodes it back.
//! * [`asn1::security_info`] classifies the `SecurityInfos` found in
//!   EF.CardAccess, EF.CardSecurity and DG14 into the protocols (PACE, Chip
//!   Authentication, Terminal Authentication, Active Authentication) the
//!   document supports.

pub mod asn1;
mod error;
pub mod tlv;

pub use self::{
    asn1::security_info::{decode_security_infos, SecurityInfos},
    error::{Error, Result},
};

/// Return early with an error if a condition is not satisfied.
///
/// Like [`anyhow::ensure`], but for typed errors.
#[macro_export]
macro_rules! ensure_err {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}
