//! Specific error types for type id construction and descriptor handling

use thiserror::Error;

use super::type_id::Carrier;

/// Errors raised while building a TypeId
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeIdError {
    #[error("Array depth {depth} exceeds the maximum of {max}")]
    DepthOverflow { depth: u32, max: u32 },
    #[error("Value-type index {index} does not fit the type id encoding")]
    IndexOverflow { index: u32 },
    #[error("Value-type index {index} is not registered")]
    UnregisteredValueType { index: u32 },
    #[error("Value type {class_name} is registered with a {registered:?} carrier, not {requested:?}")]
    CarrierConflict {
        class_name: String,
        registered: Carrier,
        requested: Carrier,
    },
    #[error("Void cannot be used as {role}")]
    VoidNotAllowed { role: &'static str },
}

/// Errors raised while parsing a type or method descriptor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Unexpected end of descriptor '{descriptor}' at {position}")]
    UnexpectedEnd { descriptor: String, position: usize },
    #[error("Unknown type code '{code}' in descriptor '{descriptor}' at {position}")]
    UnknownTypeCode { descriptor: String, position: usize, code: char },
    #[error("Unterminated class name in descriptor '{descriptor}' at {position}")]
    UnterminatedClassName { descriptor: String, position: usize },
    #[error("Empty class name in descriptor '{descriptor}' at {position}")]
    EmptyClassName { descriptor: String, position: usize },
    #[error("Void used outside return position in descriptor '{descriptor}' at {position}")]
    MisplacedVoid { descriptor: String, position: usize },
    #[error("Method descriptor '{descriptor}' must start with '('")]
    MissingOpenParen { descriptor: String },
    #[error("Method descriptor '{descriptor}' has no closing ')'")]
    MissingCloseParen { descriptor: String },
    #[error("Trailing characters in descriptor '{descriptor}' after {position}")]
    TrailingCharacters { descriptor: String, position: usize },
    #[error("Invalid type in descriptor '{descriptor}': {source}")]
    InvalidType {
        descriptor: String,
        #[source]
        source: TypeIdError,
    },
}

/// Generic result type for type id operations
pub type TypeIdResult<T> = Result<T, TypeIdError>;

/// Generic result type for descriptor operations
pub type DescriptorResult<T> = Result<T, DescriptorError>;
