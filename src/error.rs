use {crate::asn1::security_info::SecurityInfoKind, thiserror::Error};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Truncated header, length overrun, missing end-of-contents, ...
    #[error("Malformed BER-TLV: {0}")]
    MalformedTlv(&'static str),

    /// The input is not a SET of `SEQUENCE { OBJECT IDENTIFIER, ... }`.
    #[error("Malformed SecurityInfos: {0}")]
    MalformedAsn1(#[source] der::Error),

    /// A record was recognised by its OID but does not have the expected shape.
    #[error("{kind} does not match its schema: {source}")]
    SchemaMismatch {
        kind:   SecurityInfoKind,
        source: der::Error,
    },

    /// The record decoded, but a value is not allowed by the protocol.
    #[error("Protocol invariant violated: {0}")]
    ProtocolInvariantViolation(String),
}
