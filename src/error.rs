//! Schema and decoding errors

use asn1_rs::Error as BerError;
use nom::error::{ErrorKind, ParseError};
use nom::IResult;

/// An error that can occur while converting an OID to a short or long name.
#[derive(Debug, PartialEq)]
pub struct NidError;

/// An error raised by a schema object.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// A default value was requested for an attribute the object does not have.
    #[error("invalid member name for {object} class: {name}")]
    InvalidMemberName { object: &'static str, name: String },
    /// The input tree does not match the object template.
    ///
    /// If the mismatch was detected by a nested object (for ex. a `GeneralName` inside
    /// an `AltName`), the nested error is kept as `cause`.
    #[error("object's schema was not verified against input data for {object}")]
    SchemaVerificationFailed {
        object: &'static str,
        #[source]
        cause: Option<Box<SchemaError>>,
    },
}

impl SchemaError {
    pub(crate) const fn verification_failed(object: &'static str) -> Self {
        SchemaError::SchemaVerificationFailed {
            object,
            cause: None,
        }
    }

    pub(crate) fn caused_by(object: &'static str, cause: SchemaError) -> Self {
        SchemaError::SchemaVerificationFailed {
            object,
            cause: Some(Box::new(cause)),
        }
    }
}

/// An error that can occur while decoding DER bytes into a tree or an object.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("BER error: {0}")]
    Der(#[from] BerError),
    #[error("incomplete input")]
    Incomplete,
    #[error("maximum recursion depth exceeded")]
    MaxDepthExceeded,
    #[error("non-minimal DER header encoding")]
    NonMinimalHeader,
    #[error("trailing data after object")]
    TrailingData,
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("nom error: {0:?}")]
    NomError(ErrorKind),
}

/// Holds the result of decoding functions
///
/// Note that this type is also a `Result`, so usual functions (`map`, `unwrap` etc.) are available.
pub type DecodeResult<'a, T> = IResult<&'a [u8], T, DecodeError>;

impl From<ErrorKind> for DecodeError {
    fn from(e: ErrorKind) -> DecodeError {
        DecodeError::NomError(e)
    }
}

impl<I> ParseError<I> for DecodeError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        DecodeError::NomError(kind)
    }
    fn append(_input: I, kind: ErrorKind, _other: Self) -> Self {
        DecodeError::NomError(kind)
    }
}
