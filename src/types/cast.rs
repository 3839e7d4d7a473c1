//! Cast compatibility between type ids
//!
//! These are decisions, not errors: the rewriter uses a `Failure` to pick a
//! different code path (insert a conversion, or give up on the method).

use super::type_id::{TypeArray, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Cast {
    Success,
    Failure,
}

impl Cast {
    pub fn is_success(self) -> bool {
        self == Cast::Success
    }

    fn from_bool(ok: bool) -> Cast {
        if ok {
            Cast::Success
        } else {
            Cast::Failure
        }
    }
}

/// Plain assignment: the ids must be identical
pub fn check(from: TypeId, to: TypeId) -> Cast {
    Cast::from_bool(from == to)
}

/// Argument passing; no widening rules are modelled, so this is `check`
pub fn check_arg(from: TypeId, to: TypeId) -> Cast {
    check(from, to)
}

/// Stack-map frame merge: a VOID destination slot accepts anything
pub fn check_cast_frame(from: TypeId, to: TypeId) -> Cast {
    if to.is_void() {
        Cast::Success
    } else {
        check(from, to)
    }
}

/// Elementwise `check_cast_frame`; arrays of different length never merge
pub fn check_frame_arrays(from: &TypeArray, to: &TypeArray) -> Cast {
    if from.len() != to.len() {
        return Cast::Failure;
    }
    Cast::from_bool(
        from.iter()
            .zip(to.iter())
            .all(|(f, t)| check_cast_frame(f, t).is_success()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: [TypeId; 6] = [
        TypeId::VOID,
        TypeId::I32,
        TypeId::I64,
        TypeId::F32,
        TypeId::F64,
        TypeId::OBJECT,
    ];

    #[test]
    fn strict_checks_are_identity_and_symmetric() {
        for a in BASIC {
            for b in BASIC {
                assert_eq!(check(a, b).is_success(), a == b, "check({}, {})", a, b);
                assert_eq!(check(a, b), check(b, a));
                assert_eq!(check_arg(a, b), check(a, b));
            }
        }
    }

    #[test]
    fn frame_merge_accepts_void_destination() {
        for a in BASIC {
            assert_eq!(check_cast_frame(a, TypeId::VOID), Cast::Success);
        }
        assert_eq!(check_cast_frame(TypeId::VOID, TypeId::I32), Cast::Failure);
        for a in BASIC.iter().copied().filter(|t| !t.is_void()) {
            for b in BASIC.iter().copied().filter(|t| !t.is_void()) {
                assert_eq!(check_cast_frame(a, b), check(a, b));
            }
        }
    }

    #[test]
    fn frame_arrays_merge_elementwise() {
        let from = TypeArray::new(vec![TypeId::I32, TypeId::OBJECT]);
        let to = TypeArray::new(vec![TypeId::I32, TypeId::VOID]);
        assert_eq!(check_frame_arrays(&from, &to), Cast::Success);
        assert_eq!(check_frame_arrays(&to, &from), Cast::Failure);
        let short = TypeArray::new(vec![TypeId::I32]);
        assert_eq!(check_frame_arrays(&from, &short), Cast::Failure);
    }
}
