//! Contract violations raised by the stack and variable simulators

use thiserror::Error;

use crate::types::TypeId;

/// What the rewriter got wrong
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("stack underflow: {op} needs {needed} entries, {available} present")]
    Underflow { op: &'static str, needed: usize, available: usize },
    #[error("{op} expects a {expected}-word entry at depth {depth}, found {found} words")]
    WidthMismatch { op: &'static str, depth: usize, expected: u32, found: u32 },
    #[error("void cannot be used as {what}")]
    VoidEntry { what: &'static str },
    #[error("popping {words} words would split the entry at depth {depth}")]
    MisalignedPop { words: u32, depth: usize },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: TypeId, found: TypeId },
    #[error("invalid hole widths src={src} dst={dst}")]
    BadHole { src: u32, dst: u32 },
    #[error("no variable starts at source slot {addr}")]
    UnknownVariable { addr: u32 },
    #[error("opcode 0x{opcode:02x} is not simulated")]
    UnsupportedOpcode { opcode: u8 },
}

/// A violation with the context the rewriter needs to report it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{method} @{offset:?} (src depth {src_depth}, dst depth {dst_depth}): {violation}")]
pub struct SimError {
    pub method: String,
    /// Offset of the instruction being replayed, if the caller set one
    pub offset: Option<u32>,
    pub src_depth: u32,
    pub dst_depth: u32,
    pub violation: Violation,
}

pub type SimResult<T> = Result<T, SimError>;
