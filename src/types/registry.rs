//! Value-type lookup
//!
//! The mapping loader that decides which classes are value types lives
//! outside this crate. Everything here only sees it through
//! [`ValueTypeLookup`], which must be deterministic and free of side effects
//! because the parser and formatter call it in the middle of a descriptor.

use std::collections::HashMap;

use super::error::{TypeIdError, TypeIdResult};
use crate::error::Error;
use super::type_id::{Carrier, TypeId};

/// How the rewriter implements one operation of a registered value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// The call is dropped, the decomposed value passes through
    Identity,
    /// Arrays of the value type are copied as arrays of the carrier
    CopyArray,
    /// Construction from a string literal, folded at rewrite time when possible
    FromString,
    ToString,
    Compare,
    Arithmetic,
}

impl std::str::FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" => Ok(Strategy::Identity),
            "copyArray" => Ok(Strategy::CopyArray),
            "fromString" => Ok(Strategy::FromString),
            "toString" => Ok(Strategy::ToString),
            "compare" => Ok(Strategy::Compare),
            "arithmetic" => Ok(Strategy::Arithmetic),
            other => Err(Error::config_error(format!("unknown value-type strategy '{}'", other))),
        }
    }
}

/// Caller-supplied mapping from class names to value types
pub trait ValueTypeLookup {
    /// Value type registered for an internal class name (`com/acme/Decimal`)
    fn value_type(&self, class_name: &str) -> Option<TypeId>;

    /// Internal class name of a registered value-type index
    fn class_name(&self, _index: u32) -> Option<&str> {
        None
    }

    /// Strategy registered for `owner.method(desc)`
    fn strategy(&self, _owner: &str, _method: &str, _desc: &str) -> Option<Strategy> {
        None
    }
}

/// Lookup that knows no value types; every `L...;` stays a reference
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValueTypes;

impl ValueTypeLookup for NoValueTypes {
    fn value_type(&self, _class_name: &str) -> Option<TypeId> {
        None
    }
}

impl<F> ValueTypeLookup for F
where
    F: Fn(&str) -> Option<TypeId>,
{
    fn value_type(&self, class_name: &str) -> Option<TypeId> {
        self(class_name)
    }
}

#[derive(Debug, Clone)]
pub struct ValueTypeDef {
    pub class_name: String,
    pub carrier: Carrier,
    pub type_id: TypeId,
}

/// In-memory lookup table, filled by the mapping loader before a pass starts
#[derive(Debug, Default, Clone)]
pub struct ValueTypeRegistry {
    defs: Vec<ValueTypeDef>,
    by_name: HashMap<String, usize>,
    ops: HashMap<(String, String, String), Strategy>,
}

impl ValueTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class_name` as the next value-type index
    ///
    /// Registering a name twice with the same carrier returns the id from the
    /// first registration; a different carrier is a `CarrierConflict`.
    pub fn register(&mut self, class_name: &str, carrier: Carrier) -> TypeIdResult<TypeId> {
        let name = internal_name(class_name);
        if let Some(&index) = self.by_name.get(&name) {
            let def = &self.defs[index];
            if def.carrier != carrier {
                return Err(TypeIdError::CarrierConflict {
                    class_name: name,
                    registered: def.carrier,
                    requested: carrier,
                });
            }
            return Ok(def.type_id);
        }
        let index = self.defs.len();
        let type_id = TypeId::value_type(index as u32, carrier)?;
        log::debug!("registered value type {} as {} ({:?})", name, type_id, carrier);
        self.by_name.insert(name.clone(), index);
        self.defs.push(ValueTypeDef { class_name: name, carrier, type_id });
        Ok(type_id)
    }

    pub fn register_op(&mut self, owner: &str, method: &str, desc: &str, strategy: Strategy) {
        self.ops.insert((internal_name(owner), method.to_string(), desc.to_string()), strategy);
    }

    /// Id of a registered index; unregistered indices are a contract violation
    pub fn type_id(&self, index: u32) -> TypeIdResult<TypeId> {
        self.defs
            .get(index as usize)
            .map(|def| def.type_id)
            .ok_or(TypeIdError::UnregisteredValueType { index })
    }

    pub fn def(&self, index: u32) -> Option<&ValueTypeDef> {
        self.defs.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl ValueTypeLookup for ValueTypeRegistry {
    fn value_type(&self, class_name: &str) -> Option<TypeId> {
        let index = if class_name.contains('.') {
            self.by_name.get(&internal_name(class_name))
        } else {
            self.by_name.get(class_name)
        };
        index.map(|&i| self.defs[i].type_id)
    }

    fn class_name(&self, index: u32) -> Option<&str> {
        self.def(index).map(|def| def.class_name.as_str())
    }

    fn strategy(&self, owner: &str, method: &str, desc: &str) -> Option<Strategy> {
        self.ops
            .get(&(internal_name(owner), method.to_string(), desc.to_string()))
            .copied()
    }
}

fn internal_name(class_name: &str) -> String {
    class_name.replace('.', "/")
}
