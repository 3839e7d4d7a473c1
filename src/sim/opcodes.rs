//! JVM opcodes the simulator replays
//!
//! Stack manipulation and local load/store only. Everything else changes
//! the stack in ways the rewriter already knows from descriptors, so it
//! drives the stack directly with pushes and pops.

use super::error::{SimResult, Violation};
use super::stack::OperandStack;
use super::vars::VarMap;
use crate::types::{Kind, TypeId};

// 0x15 - 0x2D: loads
pub const ILOAD: u8 = 0x15;
pub const LLOAD: u8 = 0x16;
pub const FLOAD: u8 = 0x17;
pub const DLOAD: u8 = 0x18;
pub const ALOAD: u8 = 0x19;
pub const ILOAD_0: u8 = 0x1a;
pub const LLOAD_0: u8 = 0x1e;
pub const FLOAD_0: u8 = 0x22;
pub const DLOAD_0: u8 = 0x26;
pub const ALOAD_0: u8 = 0x2a;

// 0x36 - 0x4E: stores
pub const ISTORE: u8 = 0x36;
pub const LSTORE: u8 = 0x37;
pub const FSTORE: u8 = 0x38;
pub const DSTORE: u8 = 0x39;
pub const ASTORE: u8 = 0x3a;
pub const ISTORE_0: u8 = 0x3b;
pub const LSTORE_0: u8 = 0x3f;
pub const FSTORE_0: u8 = 0x43;
pub const DSTORE_0: u8 = 0x47;
pub const ASTORE_0: u8 = 0x4b;

// 0x57 - 0x5F: stack manipulation
pub const POP: u8 = 0x57;
pub const POP2: u8 = 0x58;
pub const DUP: u8 = 0x59;
pub const DUP_X1: u8 = 0x5a;
pub const DUP_X2: u8 = 0x5b;
pub const DUP2: u8 = 0x5c;
pub const DUP2_X1: u8 = 0x5d;
pub const DUP2_X2: u8 = 0x5e;
pub const SWAP: u8 = 0x5f;

pub fn opcode_name(opcode: u8) -> &'static str {
    match opcode {
        ILOAD => "ILOAD",
        LLOAD => "LLOAD",
        FLOAD => "FLOAD",
        DLOAD => "DLOAD",
        ALOAD => "ALOAD",
        0x1a..=0x2d => "xLOAD_n",
        ISTORE => "ISTORE",
        LSTORE => "LSTORE",
        FSTORE => "FSTORE",
        DSTORE => "DSTORE",
        ASTORE => "ASTORE",
        0x3b..=0x4e => "xSTORE_n",
        POP => "POP",
        POP2 => "POP2",
        DUP => "DUP",
        DUP_X1 => "DUP_X1",
        DUP_X2 => "DUP_X2",
        DUP2 => "DUP2",
        DUP2_X1 => "DUP2_X1",
        DUP2_X2 => "DUP2_X2",
        SWAP => "SWAP",
        _ => "UNKNOWN",
    }
}

/// Parse a lowercase mnemonic as used by the CLI (`dup_x1`, `pop2`, ...)
pub fn opcode_from_name(name: &str) -> Option<u8> {
    let op = match name.to_ascii_lowercase().as_str() {
        "pop" => POP,
        "pop2" => POP2,
        "dup" => DUP,
        "dup_x1" => DUP_X1,
        "dup_x2" => DUP_X2,
        "dup2" => DUP2,
        "dup2_x1" => DUP2_X1,
        "dup2_x2" => DUP2_X2,
        "swap" => SWAP,
        _ => return None,
    };
    Some(op)
}

/// Apply one stack manipulation opcode with the JVM category rules
pub fn apply_stack_op(stack: &mut OperandStack, opcode: u8) -> SimResult<()> {
    match opcode {
        POP => stack.pop_words(1),
        POP2 => stack.pop_words(2),
        DUP => dup_words(stack, "dup", 1, 0),
        DUP_X1 => dup_words(stack, "dup_x1", 1, 1),
        DUP_X2 => dup_words(stack, "dup_x2", 1, 2),
        DUP2 => dup_words(stack, "dup2", 2, 0),
        DUP2_X1 => dup_words(stack, "dup2_x1", 2, 1),
        DUP2_X2 => dup_words(stack, "dup2_x2", 2, 2),
        SWAP => stack.swap(),
        _ => stack.reject(Violation::UnsupportedOpcode { opcode }),
    }
}

// Every dup form copies `top_words` past `skip_words`; each group must be
// one entry of that width or a run of single-word entries.
fn dup_words(stack: &mut OperandStack, op: &'static str, top_words: u32, skip_words: u32) -> SimResult<()> {
    let plan = stack.run_for_words(op, 0, top_words).and_then(|count| {
        let skip = if skip_words == 0 {
            0
        } else {
            stack.run_for_words(op, count, skip_words)?
        };
        Ok((skip, count))
    });
    match plan {
        Ok((skip, count)) => stack.dup_x(skip, count),
        Err(v) => stack.reject(v),
    }
}

/// Type family named by a load/store opcode letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalFamily {
    Int,
    Long,
    Float,
    Double,
    Ref,
}

impl LocalFamily {
    pub fn accepts(self, ty: TypeId) -> bool {
        if ty.is_array() {
            return self == LocalFamily::Ref;
        }
        match (self, ty.kind()) {
            (LocalFamily::Int, Kind::I32) => true,
            (LocalFamily::Long, Kind::I64) => true,
            (LocalFamily::Float, Kind::F32) => true,
            (LocalFamily::Double, Kind::F64) => true,
            (LocalFamily::Ref, Kind::ObjectRef | Kind::ValueType) => true,
            _ => false,
        }
    }

    fn representative(self) -> TypeId {
        match self {
            LocalFamily::Int => TypeId::I32,
            LocalFamily::Long => TypeId::I64,
            LocalFamily::Float => TypeId::F32,
            LocalFamily::Double => TypeId::F64,
            LocalFamily::Ref => TypeId::OBJECT,
        }
    }

    fn from_index(index: u8) -> LocalFamily {
        match index {
            0 => LocalFamily::Int,
            1 => LocalFamily::Long,
            2 => LocalFamily::Float,
            3 => LocalFamily::Double,
            _ => LocalFamily::Ref,
        }
    }
}

/// A decoded load or store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalOp {
    pub store: bool,
    pub family: LocalFamily,
    /// Source slot, `None` when it comes from the operand byte
    pub implicit_slot: Option<u32>,
}

pub fn decode_local_op(opcode: u8) -> Option<LocalOp> {
    match opcode {
        ILOAD..=ALOAD => Some(LocalOp {
            store: false,
            family: LocalFamily::from_index(opcode - ILOAD),
            implicit_slot: None,
        }),
        ILOAD_0..=0x2d => {
            let n = opcode - ILOAD_0;
            Some(LocalOp {
                store: false,
                family: LocalFamily::from_index(n / 4),
                implicit_slot: Some((n % 4) as u32),
            })
        }
        ISTORE..=ASTORE => Some(LocalOp {
            store: true,
            family: LocalFamily::from_index(opcode - ISTORE),
            implicit_slot: None,
        }),
        ISTORE_0..=0x4e => {
            let n = opcode - ISTORE_0;
            Some(LocalOp {
                store: true,
                family: LocalFamily::from_index(n / 4),
                implicit_slot: Some((n % 4) as u32),
            })
        }
        _ => None,
    }
}

/// Push the variable starting at `src_addr`
pub fn load(vars: &mut VarMap, stack: &mut OperandStack, family: LocalFamily, src_addr: u32) -> SimResult<()> {
    let Some(var) = vars.require_src_addr(src_addr)? else {
        return Ok(());
    };
    let (ty, name) = (var.type_id, var.name.clone());
    if !family.accepts(ty) {
        return stack.reject(Violation::TypeMismatch { expected: family.representative(), found: ty });
    }
    stack.push_type_id(ty, name)
}

/// Pop the top into the variable at `src_addr`
///
/// A store to the first free slot declares a new variable of the stored
/// type, named `name`.
pub fn store(
    vars: &mut VarMap,
    stack: &mut OperandStack,
    family: LocalFamily,
    src_addr: u32,
    name: &str,
) -> SimResult<()> {
    let Some(top) = stack.type_id_at(0) else {
        return stack.reject(Violation::Underflow { op: "store", needed: 1, available: 0 });
    };
    if !family.accepts(top) {
        return stack.reject(Violation::TypeMismatch { expected: family.representative(), found: top });
    }
    if src_addr == vars.top_src_addr() {
        stack.pop_many(1)?;
        return vars.add(top, name);
    }
    let Some(var) = vars.require_src_addr(src_addr)? else {
        return Ok(());
    };
    let expected = var.type_id;
    stack.pop_typed(expected)
}

/// Decode and apply a load/store; `operand` is the slot byte of the long forms
pub fn apply_local_op(
    vars: &mut VarMap,
    stack: &mut OperandStack,
    opcode: u8,
    operand: Option<u32>,
    name: &str,
) -> SimResult<()> {
    let Some(op) = decode_local_op(opcode) else {
        return stack.reject(Violation::UnsupportedOpcode { opcode });
    };
    let Some(slot) = op.implicit_slot.or(operand) else {
        return stack.reject(Violation::UnsupportedOpcode { opcode });
    };
    if op.store {
        store(vars, stack, op.family, slot, name)
    } else {
        load(vars, stack, op.family, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::Carrier;

    fn pair() -> (VarMap, OperandStack) {
        let config = Config::default();
        (VarMap::new("T.m()V", &config), OperandStack::new("T.m()V", &config))
    }

    #[test]
    fn decode_short_forms() {
        assert_eq!(
            decode_local_op(0x21),
            Some(LocalOp { store: false, family: LocalFamily::Long, implicit_slot: Some(3) })
        );
        assert_eq!(
            decode_local_op(ASTORE_0 + 1),
            Some(LocalOp { store: true, family: LocalFamily::Ref, implicit_slot: Some(1) })
        );
        assert_eq!(decode_local_op(DUP), None);
        assert_eq!(opcode_from_name("DUP2_X1"), Some(DUP2_X1));
        assert_eq!(opcode_name(SWAP), "SWAP");
    }

    #[test]
    fn store_declares_then_load_reads_back() {
        let vt = TypeId::value_type(0, Carrier::Wide).unwrap();
        let (mut vars, mut stack) = pair();
        stack.push_type_id(vt, "amount").unwrap();
        apply_local_op(&mut vars, &mut stack, ASTORE_0, None, "amount").unwrap();
        assert!(stack.is_empty());
        assert_eq!(vars.top_dst_addr(), 2);

        stack.push_type_id(TypeId::I64, "n").unwrap();
        apply_local_op(&mut vars, &mut stack, LSTORE, Some(1), "n").unwrap();
        assert_eq!(vars.src_to_dst(1), Some(2));

        apply_local_op(&mut vars, &mut stack, ALOAD_0, None, "").unwrap();
        assert_eq!(stack.type_id_at(0), Some(vt));
        assert_eq!(stack.name_at(0), Some("amount"));
    }

    #[test]
    fn family_mismatch_is_a_violation() {
        let (mut vars, mut stack) = pair();
        vars.add(TypeId::F32, "f").unwrap();
        let err = apply_local_op(&mut vars, &mut stack, ILOAD_0, None, "").unwrap_err();
        assert_eq!(err.violation, Violation::TypeMismatch { expected: TypeId::I32, found: TypeId::F32 });

        stack.push_type_id(TypeId::I32, "i").unwrap();
        assert!(apply_local_op(&mut vars, &mut stack, FSTORE_0, None, "").is_err());
        assert!(apply_local_op(&mut vars, &mut stack, ILOAD, Some(5), "").is_err());
    }

    #[test]
    fn dup2_x2_form_four() {
        let (_, mut stack) = pair();
        stack.push_type_id(TypeId::F64, "a").unwrap();
        stack.push_type_id(TypeId::I64, "b").unwrap();
        apply_stack_op(&mut stack, DUP2_X2).unwrap();
        let names: Vec<&str> = (0..stack.top()).rev().filter_map(|i| stack.name_at(i)).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
    }

    #[test]
    fn unsupported_opcode() {
        let (_, mut stack) = pair();
        let err = apply_stack_op(&mut stack, 0x60).unwrap_err();
        assert_eq!(err.violation, Violation::UnsupportedOpcode { opcode: 0x60 });
    }
}
