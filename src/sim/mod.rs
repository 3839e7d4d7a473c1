//! Two-layout slot simulation
//!
//! Every operation is applied to the original (source) layout and the
//! rewritten (destination) layout at once, so a rewriter can ask how deep
//! the stack is, where a local lives, or whether a dup still works after
//! value types change width.
//!
//! - **stack**: operand stack with dup/swap/pop in both layouts
//! - **vars**: local-variable map with independent slot addresses
//! - **frame**: snapshots and merge checks at branch targets
//! - **opcodes**: replaying stack-manipulation and load/store instructions
//! - **notation**: compact text form used by the CLI and tests
//! - **diag**: violation policy, counters and per-instance logging

pub mod diag;
pub mod error;
pub mod frame;
pub mod notation;
pub mod opcodes;
pub mod stack;
pub mod vars;

pub use diag::{Counters, Diagnostics, SimReport};
pub use error::{SimError, SimResult, Violation};
pub use frame::{describe_frame, Frame, VerificationType};
pub use notation::{format_stack, parse_into_stack, parse_into_vars};
pub use opcodes::{apply_local_op, apply_stack_op, decode_local_op, opcode_from_name, opcode_name, LocalFamily, LocalOp};
pub use stack::{Axis, OperandStack, StackEntry};
pub use vars::{VarEntry, VarMap};
