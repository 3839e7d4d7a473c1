//! Frame snapshots at branch targets
//!
//! When the rewriter rebuilds StackMapTable frames it needs the locals and
//! stack at each target in both layouts, and it needs to know whether the
//! state flowing in from a jump merges with the state already recorded.

use crate::types::{check_frame_arrays, Cast, Kind, TypeArray, TypeId};
use super::stack::OperandStack;
use super::vars::VarMap;

/// Verification category of a slot (JVMS 4.10.1.2), without class detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Long,
    Double,
    Object,
}

impl VerificationType {
    /// Category in the original layout; value types are still references
    pub fn for_src(ty: TypeId) -> VerificationType {
        if ty.is_array() {
            return VerificationType::Object;
        }
        match ty.kind() {
            Kind::Void => VerificationType::Top,
            Kind::I32 => VerificationType::Integer,
            Kind::I64 => VerificationType::Long,
            Kind::F32 => VerificationType::Float,
            Kind::F64 => VerificationType::Double,
            Kind::ObjectRef | Kind::ValueType => VerificationType::Object,
        }
    }

    /// Category after decomposition; value types become their carrier
    pub fn for_dst(ty: TypeId) -> VerificationType {
        if ty.is_value_type() && !ty.is_array() {
            return if ty.is_dst64() { VerificationType::Long } else { VerificationType::Integer };
        }
        Self::for_src(ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub locals: TypeArray,
    /// Bottom to top
    pub stack: TypeArray,
    pub dst_locals: Vec<VerificationType>,
    pub dst_stack: Vec<VerificationType>,
}

impl Frame {
    pub fn capture(vars: &VarMap, stack: &OperandStack) -> Frame {
        let mut dst_locals = Vec::with_capacity(vars.num_vars());
        for entry in (0..vars.num_vars()).filter_map(|i| vars.entry_at(i)) {
            if entry.is_hole() {
                // one Top per reserved destination word
                dst_locals.extend(std::iter::repeat(VerificationType::Top).take(entry.dst_width as usize));
            } else {
                dst_locals.push(VerificationType::for_dst(entry.type_id));
            }
        }
        let stack_ids = stack.ids();
        let dst_stack = stack_ids.iter().map(VerificationType::for_dst).collect();
        Frame {
            locals: vars.copy_all(),
            stack: stack_ids,
            dst_locals,
            dst_stack,
        }
    }

    /// Whether this state can flow into `target` at a merge point
    pub fn can_merge_into(&self, target: &Frame) -> Cast {
        match check_frame_arrays(&self.stack, &target.stack) {
            Cast::Success => check_frame_arrays(&self.locals, &target.locals),
            Cast::Failure => Cast::Failure,
        }
    }

    pub fn src_locals(&self) -> Vec<VerificationType> {
        self.locals.iter().map(VerificationType::for_src).collect()
    }
}

/// One-line human-readable form, used in diagnostics
pub fn describe_frame(frame: &Frame) -> String {
    let locals: Vec<String> = frame.locals.iter().map(|t| t.to_string()).collect();
    let stack: Vec<String> = frame.stack.iter().map(|t| t.to_string()).collect();
    format!(
        "locals=[{}] stack=[{}] dst_locals={:?} dst_stack={:?}",
        locals.join(", "),
        stack.join(", "),
        frame.dst_locals,
        frame.dst_stack
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::Carrier;

    #[test]
    fn capture_expands_value_types_on_destination() {
        let config = Config::default();
        let vt = TypeId::value_type(0, Carrier::Wide).unwrap();
        let mut vars = VarMap::new("m", &config);
        let mut stack = OperandStack::new("m", &config);
        vars.add(vt, "v").unwrap();
        vars.dbg_add_hole(1, 2).unwrap();
        stack.push_type_id(vt.array_from().unwrap(), "arr").unwrap();

        let frame = Frame::capture(&vars, &stack);
        assert_eq!(
            frame.dst_locals,
            vec![VerificationType::Long, VerificationType::Top, VerificationType::Top]
        );
        assert_eq!(frame.src_locals(), vec![VerificationType::Object, VerificationType::Top]);
        assert_eq!(frame.dst_stack, vec![VerificationType::Object]);
        assert!(describe_frame(&frame).contains("[vt0/j"));
    }

    #[test]
    fn merge_uses_frame_cast_rule() {
        let config = Config::default();
        let mut vars = VarMap::new("m", &config);
        let stack = OperandStack::new("m", &config);
        vars.add(TypeId::I32, "i").unwrap();
        vars.add(TypeId::OBJECT, "o").unwrap();
        let incoming = Frame::capture(&vars, &stack);

        let mut target_vars = VarMap::new("m", &config);
        target_vars.add(TypeId::I32, "i").unwrap();
        target_vars.dbg_add_hole(1, 1).unwrap();
        let target = Frame::capture(&target_vars, &stack);

        assert_eq!(incoming.can_merge_into(&target), Cast::Success);
        assert_eq!(target.can_merge_into(&incoming), Cast::Failure);
    }
}
