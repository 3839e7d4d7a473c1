//! Compact textual form for stacks and local maps
//!
//! `"3 2X 1"` is a stack of three entries, bottom first. Each token is a
//! label with an optional one-letter type suffix; the label becomes the
//! entry name. Used by the CLI and by tests to set up and compare states.

use crate::error::Result;
use crate::types::{Carrier, Kind, TypeId};
use super::stack::OperandStack;
use super::vars::VarMap;

fn suffix_type(suffix: char) -> Result<Option<TypeId>> {
    let ty = match suffix {
        'J' => TypeId::I64,
        'D' => TypeId::F64,
        'F' => TypeId::F32,
        'A' => TypeId::OBJECT,
        'X' => TypeId::value_type(0, Carrier::Wide)?,
        'Y' => TypeId::value_type(1, Carrier::Narrow)?,
        _ => return Ok(None),
    };
    Ok(Some(ty))
}

/// Split a token into label and type
pub fn parse_token(token: &str) -> Result<(&str, TypeId)> {
    if let Some(last) = token.chars().last() {
        if let Some(ty) = suffix_type(last)? {
            return Ok((&token[..token.len() - last.len_utf8()], ty));
        }
    }
    Ok((token, TypeId::I32))
}

/// Push every token, bottom first
pub fn parse_into_stack(notation: &str, stack: &mut OperandStack) -> Result<()> {
    for token in notation.split_whitespace() {
        let (label, ty) = parse_token(token)?;
        stack.push_type_id(ty, label)?;
    }
    Ok(())
}

/// Declare every token as a local, in slot order
pub fn parse_into_vars(notation: &str, vars: &mut VarMap) -> Result<()> {
    for token in notation.split_whitespace() {
        let (label, ty) = parse_token(token)?;
        vars.add(ty, label)?;
    }
    Ok(())
}

fn suffix_of(ty: TypeId) -> String {
    if ty.is_array() {
        return format!(":{}", ty);
    }
    match (ty.kind(), ty.value_type_index(), ty.carrier()) {
        (Kind::I32, ..) => String::new(),
        (Kind::I64, ..) => "J".to_string(),
        (Kind::F64, ..) => "D".to_string(),
        (Kind::F32, ..) => "F".to_string(),
        (Kind::ObjectRef, ..) => "A".to_string(),
        (Kind::ValueType, Some(0), Some(Carrier::Wide)) => "X".to_string(),
        (Kind::ValueType, Some(1), Some(Carrier::Narrow)) => "Y".to_string(),
        _ => format!(":{}", ty),
    }
}

/// Bottom-first rendering; inverse of `parse_into_stack` for the letter types
pub fn format_stack(stack: &OperandStack) -> String {
    stack
        .entries()
        .iter()
        .map(|e| format!("{}{}", e.name, suffix_of(e.type_id)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn suffixes_select_types() {
        assert_eq!(parse_token("7").unwrap(), ("7", TypeId::I32));
        assert_eq!(parse_token("2J").unwrap(), ("2", TypeId::I64));
        assert_eq!(parse_token("xD").unwrap(), ("x", TypeId::F64));
        let (label, ty) = parse_token("2X").unwrap();
        assert_eq!(label, "2");
        assert_eq!(ty.value_type_index(), Some(0));
        assert!(ty.is_dst64());
        let (_, ty) = parse_token("4Y").unwrap();
        assert_eq!(ty.value_type_index(), Some(1));
        assert!(!ty.is_dst64());
    }

    #[test]
    fn stack_text_survives_a_round_trip() {
        let mut stack = OperandStack::new("m", &Config::default());
        parse_into_stack("3 2X 1J 0A", &mut stack).unwrap();
        assert_eq!(stack.top32_src(), 5);
        assert_eq!(stack.top32_dst(), 6);
        assert_eq!(format_stack(&stack), "3 2X 1J 0A");
    }

    #[test]
    fn vars_take_slots_in_order() {
        let mut vars = VarMap::new("m", &Config::default());
        parse_into_vars("this 1J 2X 3", &mut vars).unwrap();
        assert_eq!(vars.num_vars(), 4);
        assert_eq!(vars.src_to_dst(4), Some(5));
        assert_eq!(vars.find("3"), Some(3));
    }
}
