//! Value-type rewriter: type and slot simulation
//!
//! Support library for a bytecode rewriter that decomposes value types into
//! primitive carriers. It tracks every operand stack entry and local variable
//! in two layouts at once: the original one, where a value type is a single
//! reference slot, and the rewritten one, where it is an `int` or `long`.
//!
//! ## Architecture
//!
//! - **types**: `TypeId` encoding, value-type lookup, descriptors, cast rules
//! - **sim**: operand stack and local map simulators, frames, opcode replay
//! - **config**: logging level, violation policy, method descriptor cache
//! - **bin**: `vtr` command-line inspector
//!
//! ## Flow
//!
//! ```text
//! descriptor ──parse──> TypeId ──push/add──> OperandStack / VarMap
//!                                                 │
//!                              dup/swap/pop, load/store replay
//!                                                 ↓
//!                                 Frame snapshots, SimReport on finish()
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod sim;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};

use sim::{OperandStack, SimReport, VarMap};
use types::{MethodDescriptorCache, ValueTypeLookup};

/// Simulation state for one method of one rewriting pass
///
/// Seeds the locals from the method descriptor, the way a JVM frame starts.
#[derive(Debug)]
pub struct MethodSim {
    pub vars: VarMap,
    pub stack: OperandStack,
}

impl MethodSim {
    /// `owner` is only used for diagnostics; `is_static` decides whether
    /// slot 0 holds `this`.
    pub fn enter<L>(
        owner: &str,
        name: &str,
        desc: &str,
        is_static: bool,
        lookup: &L,
        cache: &mut MethodDescriptorCache,
        config: &Config,
    ) -> Result<MethodSim>
    where
        L: ValueTypeLookup + ?Sized,
    {
        let method = format!("{}.{}{}", owner, name, desc);
        let sig = cache.parse(desc, lookup)?;
        let mut vars = VarMap::new(method.clone(), config);
        if !is_static {
            vars.add(types::TypeId::OBJECT, "this")?;
        }
        for (i, arg) in sig.args.iter().enumerate() {
            vars.add(*arg, format!("arg{}", i))?;
        }
        log::debug!("entered {} with {} locals", method, vars.num_vars());
        Ok(MethodSim {
            vars,
            stack: OperandStack::new(method, config),
        })
    }

    pub fn set_offset(&mut self, offset: u32) {
        self.vars.set_offset(offset);
        self.stack.set_offset(offset);
    }

    /// Reports for the locals and the stack, in that order
    pub fn finish(self) -> (SimReport, SimReport) {
        (self.vars.finish(), self.stack.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Carrier, ValueTypeRegistry};

    #[test]
    fn enter_seeds_locals_from_descriptor() {
        let mut registry = ValueTypeRegistry::new();
        registry.register("demo/Money", Carrier::Wide).unwrap();
        let config = Config::default();
        let mut cache = MethodDescriptorCache::new(&config);

        let sim = MethodSim::enter("demo/Bank", "deposit", "(Ldemo/Money;J)V", false, &registry, &mut cache, &config)
            .unwrap();
        assert_eq!(sim.vars.num_vars(), 3);
        assert_eq!(sim.vars.top_src_addr(), 4);
        assert_eq!(sim.vars.top_dst_addr(), 5);
        let (vars, stack) = sim.finish();
        assert!(vars.is_clean() && stack.is_clean());
        assert_eq!(vars.method, "demo/Bank.deposit(Ldemo/Money;J)V");
    }
}
