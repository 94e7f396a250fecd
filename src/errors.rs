//! Error types for the KERI library

use thiserror::Error;

/// Error types for the KERI library
#[derive(Error, Debug)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("parsing error: {0}")]
    Parsing(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("general error: {0}")]
    Other(String),
}

/// Result type for KERI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors arising from CESR primitive (Matter) encoding, decoding and parsing.
///
/// Distinct variants exist for "cold start" stream parsing (`Shortage`,
/// `NeedMoreDataError`) versus outright malformed material, because callers
/// resuming a partial read need to tell the two apart.
#[derive(Error, Debug)]
pub enum MatterError {
    #[error("cold start error: {0}")]
    ColdStartError(String),

    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("conversion error: {0}")]
    ConversionError(String),

    #[error("crypto error: {0}")]
    CryptoError(String),

    #[error("empty material: {0}")]
    EmptyMaterial(String),

    #[error("empty material: {0}")]
    EmptyMaterialError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("invalid code: {0}")]
    InvalidCode(String),

    #[error("invalid code size: {0}")]
    InvalidCodeSize(String),

    #[error("invalid code size: {0}")]
    InvalidCodeSizeError(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid soft: {0}")]
    InvalidSoft(String),

    #[error("invalid soft: {0}")]
    InvalidSoftError(String),

    #[error("invalid variable index: {0}")]
    InvalidVarIndex(String),

    #[error("invalid variable index: {0}")]
    InvalidVarIndexError(String),

    #[error("invalid variable raw size: {0}")]
    InvalidVarRawSize(String),

    #[error("need more data: {0}")]
    NeedMoreDataError(String),

    #[error("raw material error: {0}")]
    RawMaterial(String),

    #[error("raw material error: {0}")]
    RawMaterialError(String),

    #[error("secp256k1 error: {0}")]
    Secp256k1Error(String),

    #[error("secp256r1 error: {0}")]
    Secp256r1Error(String),

    #[error("shortage: {0}")]
    Shortage(String),

    #[error("shortage: {0}")]
    ShortageError(String),

    #[error("soft material error: {0}")]
    SoftMaterial(String),

    #[error("soft material error: {0}")]
    SoftMaterialError(String),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("unexpected code: {0}")]
    UnexpectedCode(String),

    #[error("unexpected code: {0}")]
    UnexpectedCodeError(String),

    #[error("unexpected count code: {0}")]
    UnexpectedCountCode(String),

    #[error("unexpected count code: {0}")]
    UnexpectedCountCodeError(String),

    #[error("unexpected op code: {0}")]
    UnexpectedOpCode(String),

    #[error("unexpected op code: {0}")]
    UnexpectedOpCodeError(String),

    #[error("unsupported code: {0}")]
    UnsupportedCodeError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("value error: {0}")]
    ValueError(String),

    #[error("verification error: {0}")]
    VerificationError(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },

    #[error("invalid base64")]
    InvalidBase64,

    #[error("invalid format")]
    InvalidFormat,

    #[error("invalid base64 index: {0}")]
    InvalidBase64Index(usize),
}
