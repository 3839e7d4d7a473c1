//! Local-variable map
//!
//! Variables are packed from slot 0 on two independent axes: `src_addr` in
//! the original local array and `dst_addr` in the rewritten one. A value type
//! with a wide carrier takes one source slot and two destination slots, so
//! the destination addresses drift ahead of the source ones.

use log::Level;

use crate::config::Config;
use crate::types::{TypeArray, TypeId};
use super::diag::{Diagnostics, SimReport};
use super::error::{SimResult, Violation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarEntry {
    /// `VOID` for holes
    pub type_id: TypeId,
    pub name: String,
    pub src_addr: u32,
    pub dst_addr: u32,
    pub src_width: u32,
    pub dst_width: u32,
}

impl VarEntry {
    pub fn is_hole(&self) -> bool {
        self.type_id.is_void()
    }
}

#[derive(Debug, Clone)]
pub struct VarMap {
    entries: Vec<VarEntry>,
    max_src_addr: u32,
    max_dst_addr: u32,
    diag: Diagnostics,
}

impl VarMap {
    pub fn new(method: impl Into<String>, config: &Config) -> Self {
        Self {
            entries: Vec::new(),
            max_src_addr: 0,
            max_dst_addr: 0,
            diag: Diagnostics::new(method, config),
        }
    }

    /// Append a variable after the last entry
    pub fn add(&mut self, type_id: TypeId, name: impl Into<String>) -> SimResult<()> {
        if type_id.is_void() {
            return self.reject(Violation::VoidEntry { what: "a local variable" });
        }
        let name = name.into();
        self.diag.log(Level::Trace, format_args!("var {} '{}'", type_id, name));
        self.append(type_id, name, type_id.src_width(), type_id.dst_width());
        Ok(())
    }

    /// Reserve slots that hold no value
    pub fn dbg_add_hole(&mut self, src_width: u32, dst_width: u32) -> SimResult<()> {
        let valid = (1..=2).contains(&src_width) && (1..=2).contains(&dst_width) && dst_width >= src_width;
        if !valid {
            return self.reject(Violation::BadHole { src: src_width, dst: dst_width });
        }
        self.append(TypeId::VOID, String::new(), src_width, dst_width);
        Ok(())
    }

    /// Remove the most recently added entry
    pub fn pop_var(&mut self) -> SimResult<()> {
        if self.entries.pop().is_none() {
            return self.reject(Violation::Underflow { op: "pop_var", needed: 1, available: 0 });
        }
        self.diag.counters.var_removes += 1;
        Ok(())
    }

    /// Drop every entry past the first `len`, e.g. when a scope closes
    pub fn truncate(&mut self, len: usize) {
        let removed = self.entries.len().saturating_sub(len);
        self.entries.truncate(len);
        self.diag.counters.var_removes += removed as u64;
    }

    /// Entry count, holes included
    pub fn num_vars(&self) -> usize {
        self.entries.len()
    }

    pub fn top_src_addr(&self) -> u32 {
        self.entries.last().map_or(0, |e| e.src_addr + e.src_width)
    }

    pub fn top_dst_addr(&self) -> u32 {
        self.entries.last().map_or(0, |e| e.dst_addr + e.dst_width)
    }

    /// Types in declaration order; holes show up as `VOID`
    pub fn copy_all(&self) -> TypeArray {
        self.entries.iter().map(|e| e.type_id).collect()
    }

    pub fn entry_at(&self, index: usize) -> Option<&VarEntry> {
        self.entries.get(index)
    }

    /// Most recent entry with the given name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().rposition(|e| !e.is_hole() && e.name == name)
    }

    /// Entry starting exactly at a source slot
    pub fn index_of_src_addr(&self, src_addr: u32) -> Option<usize> {
        self.entries.binary_search_by_key(&src_addr, |e| e.src_addr).ok()
    }

    /// Destination slot of the variable starting at `src_addr`
    pub fn src_to_dst(&self, src_addr: u32) -> Option<u32> {
        self.index_of_src_addr(src_addr).map(|i| self.entries[i].dst_addr)
    }

    /// Like `index_of_src_addr`, but a miss is a violation
    ///
    /// `Ok(None)` only happens when the violation was recorded.
    pub fn require_src_addr(&mut self, src_addr: u32) -> SimResult<Option<&VarEntry>> {
        match self.index_of_src_addr(src_addr) {
            Some(i) if !self.entries[i].is_hole() => Ok(self.entries.get(i)),
            _ => {
                self.reject(Violation::UnknownVariable { addr: src_addr })?;
                Ok(None)
            }
        }
    }

    pub fn set_offset(&mut self, offset: u32) {
        self.diag.set_offset(Some(offset));
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    /// End of the method; the report's depths are the local array sizes
    pub fn finish(self) -> SimReport {
        self.diag.into_report(self.max_src_addr, self.max_dst_addr)
    }

    fn append(&mut self, type_id: TypeId, name: String, src_width: u32, dst_width: u32) {
        let entry = VarEntry {
            type_id,
            name,
            src_addr: self.top_src_addr(),
            dst_addr: self.top_dst_addr(),
            src_width,
            dst_width,
        };
        self.entries.push(entry);
        self.max_src_addr = self.max_src_addr.max(self.top_src_addr());
        self.max_dst_addr = self.max_dst_addr.max(self.top_dst_addr());
        self.diag.counters.var_adds += 1;
    }

    pub(crate) fn reject(&mut self, violation: Violation) -> SimResult<()> {
        let (src, dst) = (self.top_src_addr(), self.top_dst_addr());
        self.diag.violation(violation, src, dst)
    }
}
