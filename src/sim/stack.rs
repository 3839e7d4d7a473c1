//! Operand stack simulation
//!
//! Mirrors the JVM operand stack while the rewriter replays a method. Each
//! entry has a source width (the original layout) and a destination width
//! (after value types are decomposed), and both depths are kept in step.
//! Index 0 in the accessors is the top of the stack; snapshots from `ids()`
//! run bottom to top.

use log::Level;

use crate::config::Config;
use crate::types::{check, TypeArray, TypeId};
use super::diag::{Diagnostics, SimReport};
use super::error::{SimResult, Violation};
use super::opcodes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    pub type_id: TypeId,
    /// Diagnostic label
    pub name: String,
}

impl StackEntry {
    pub fn src_width(&self) -> u32 {
        self.type_id.src_width()
    }

    pub fn dst_width(&self) -> u32 {
        self.type_id.dst_width()
    }
}

/// Layout a width question is asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Src,
    Dst,
}

impl Axis {
    fn width(self, ty: TypeId) -> u32 {
        match self {
            Axis::Src => ty.src_width(),
            Axis::Dst => ty.dst_width(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OperandStack {
    /// Bottom first
    entries: Vec<StackEntry>,
    src_depth: u32,
    dst_depth: u32,
    max_src_depth: u32,
    max_dst_depth: u32,
    diag: Diagnostics,
}

impl OperandStack {
    pub fn new(method: impl Into<String>, config: &Config) -> Self {
        Self {
            entries: Vec::new(),
            src_depth: 0,
            dst_depth: 0,
            max_src_depth: 0,
            max_dst_depth: 0,
            diag: Diagnostics::new(method, config),
        }
    }

    // ------------------------------------------------------------------
    // accessors
    // ------------------------------------------------------------------

    /// Number of logical entries
    pub fn top(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Depth in source words
    pub fn top32_src(&self) -> u32 {
        self.src_depth
    }

    /// Depth in destination words
    pub fn top32_dst(&self) -> u32 {
        self.dst_depth
    }

    pub fn max_src_depth(&self) -> u32 {
        self.max_src_depth
    }

    pub fn max_dst_depth(&self) -> u32 {
        self.max_dst_depth
    }

    pub fn entry_at(&self, depth: usize) -> Option<&StackEntry> {
        let index = self.entries.len().checked_sub(depth)?.checked_sub(1)?;
        self.entries.get(index)
    }

    pub fn type_id_at(&self, depth: usize) -> Option<TypeId> {
        self.entry_at(depth).map(|e| e.type_id)
    }

    pub fn name_at(&self, depth: usize) -> Option<&str> {
        self.entry_at(depth).map(|e| e.name.as_str())
    }

    /// Snapshot, bottom to top
    pub fn ids(&self) -> TypeArray {
        self.entries.iter().map(|e| e.type_id).collect()
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    /// Offset of the instruction being replayed, used in error context
    pub fn set_offset(&mut self, offset: u32) {
        self.diag.set_offset(Some(offset));
    }

    /// Empty the stack, e.g. at an exception handler entry; maxima are kept
    pub fn clear(&mut self) {
        self.entries.clear();
        self.src_depth = 0;
        self.dst_depth = 0;
    }

    /// End of the method: hand back counters and recorded violations
    pub fn finish(self) -> SimReport {
        self.diag.into_report(self.max_src_depth, self.max_dst_depth)
    }

    // ------------------------------------------------------------------
    // push / pop
    // ------------------------------------------------------------------

    pub fn push_type_id(&mut self, type_id: TypeId, name: impl Into<String>) -> SimResult<()> {
        if type_id.is_void() {
            return self.reject(Violation::VoidEntry { what: "a stack entry" });
        }
        let entry = StackEntry { type_id, name: name.into() };
        self.diag.log(Level::Trace, format_args!("push {} '{}'", entry.type_id, entry.name));
        self.push_entry(entry);
        self.diag.counters.pushes += 1;
        Ok(())
    }

    /// Pop one single-word entry
    pub fn pop32(&mut self) -> SimResult<()> {
        if let Err(v) = self.require_width("pop32", 0, 1) {
            return self.reject(v);
        }
        self.remove_top(1);
        Ok(())
    }

    /// Pop one two-word entry
    pub fn pop64(&mut self) -> SimResult<()> {
        if let Err(v) = self.require_width("pop64", 0, 2) {
            return self.reject(v);
        }
        self.remove_top(1);
        Ok(())
    }

    /// Pop two logical entries, whatever their widths
    pub fn pop2(&mut self) -> SimResult<()> {
        self.pop_many(2)
    }

    pub fn pop_many(&mut self, n: usize) -> SimResult<()> {
        if let Err(v) = self.require("pop", n) {
            return self.reject(v);
        }
        self.remove_top(n);
        Ok(())
    }

    /// Pop entries totalling exactly `words` source words
    ///
    /// This is the JVM `pop`/`pop2` rule; a request that would split an
    /// entry is a violation.
    pub fn pop_words(&mut self, words: u32) -> SimResult<()> {
        let mut taken = 0;
        let mut count = 0;
        while taken < words {
            let Some(entry) = self.entry_at(count) else {
                return self.reject(Violation::Underflow {
                    op: "pop_words",
                    needed: count + 1,
                    available: self.entries.len(),
                });
            };
            taken += entry.src_width();
            count += 1;
        }
        if taken != words {
            return self.reject(Violation::MisalignedPop { words, depth: count - 1 });
        }
        self.remove_top(count);
        Ok(())
    }

    /// Pop the top entry, checking it is exactly `expected`
    pub fn pop_typed(&mut self, expected: TypeId) -> SimResult<()> {
        let Some(found) = self.type_id_at(0) else {
            return self.reject(Violation::Underflow { op: "pop_typed", needed: 1, available: 0 });
        };
        if !check(found, expected).is_success() {
            return self.reject(Violation::TypeMismatch { expected, found });
        }
        self.remove_top(1);
        Ok(())
    }

    // ------------------------------------------------------------------
    // dup family / swap
    // ------------------------------------------------------------------

    pub fn dup32(&mut self) -> SimResult<()> {
        if let Err(v) = self.require_width("dup32", 0, 1) {
            return self.reject(v);
        }
        self.insert_copies(0, 1);
        Ok(())
    }

    pub fn dup64(&mut self) -> SimResult<()> {
        if let Err(v) = self.require_width("dup64", 0, 2) {
            return self.reject(v);
        }
        self.insert_copies(0, 1);
        Ok(())
    }

    /// JVM `dup2`: one two-word entry, or two single-word entries
    pub fn dup2(&mut self) -> SimResult<()> {
        let count = match self.run_for_words("dup2", 0, 2) {
            Ok(count) => count,
            Err(v) => return self.reject(v),
        };
        self.insert_copies(0, count);
        Ok(())
    }

    pub fn swap(&mut self) -> SimResult<()> {
        let checked = self
            .require_width("swap", 0, 1)
            .and_then(|_| self.require_width("swap", 1, 1));
        if let Err(v) = checked {
            return self.reject(v);
        }
        let len = self.entries.len();
        self.entries.swap(len - 1, len - 2);
        self.diag.counters.swaps += 1;
        self.diag.log(Level::Trace, format_args!("swap"));
        Ok(())
    }

    /// Copy the top `count` entries beneath the next `skip` entries
    ///
    /// Widths are not checked; every dup opcode reduces to this.
    pub fn dup_x(&mut self, skip: usize, count: usize) -> SimResult<()> {
        // an unrepresentable count can never be satisfied
        let needed = skip.checked_add(count).unwrap_or(usize::MAX);
        if let Err(v) = self.require("dup_x", needed) {
            return self.reject(v);
        }
        self.insert_copies(skip, count);
        Ok(())
    }

    /// The single dup instruction that copies the top entry past `skip`
    /// entries in the given layout, if one exists
    pub fn dup_x_opcode(&self, skip: usize, axis: Axis) -> Option<u8> {
        let top = self.type_id_at(0)?;
        let mut skipped = 0;
        for depth in 1..=skip {
            skipped += axis.width(self.type_id_at(depth)?);
        }
        match (axis.width(top), skipped) {
            (1, 0) => Some(opcodes::DUP),
            (1, 1) => Some(opcodes::DUP_X1),
            (1, 2) => Some(opcodes::DUP_X2),
            (2, 0) => Some(opcodes::DUP2),
            (2, 1) => Some(opcodes::DUP2_X1),
            (2, 2) => Some(opcodes::DUP2_X2),
            _ => None,
        }
    }

    /// `dup_x(skip, 1)` if one instruction realizes it in both layouts
    ///
    /// Returns false and leaves the stack alone when the source and
    /// destination layouts would need different instructions.
    pub fn try_dup_x(&mut self, skip: usize) -> SimResult<bool> {
        let needed = skip.checked_add(1).unwrap_or(usize::MAX);
        if let Err(v) = self.require("try_dup_x", needed) {
            self.reject(v)?;
            return Ok(false);
        }
        let src = self.dup_x_opcode(skip, Axis::Src);
        let dst = self.dup_x_opcode(skip, Axis::Dst);
        match (src, dst) {
            (Some(s), Some(d)) if s == d => {
                self.insert_copies(skip, 1);
                Ok(true)
            }
            _ => {
                self.diag.counters.dup_x_refused += 1;
                self.diag.log(
                    Level::Debug,
                    format_args!("dup past {} entries refused (src {:?}, dst {:?})", skip, src, dst),
                );
                Ok(false)
            }
        }
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    pub(crate) fn reject(&mut self, violation: Violation) -> SimResult<()> {
        self.diag.violation(violation, self.src_depth, self.dst_depth)
    }

    fn require(&self, op: &'static str, needed: usize) -> Result<(), Violation> {
        if self.entries.len() < needed {
            return Err(Violation::Underflow { op, needed, available: self.entries.len() });
        }
        Ok(())
    }

    fn require_width(&self, op: &'static str, depth: usize, expected: u32) -> Result<(), Violation> {
        self.require(op, depth + 1)?;
        let found = self.entry_at(depth).map_or(0, StackEntry::src_width);
        if found != expected {
            return Err(Violation::WidthMismatch { op, depth, expected, found });
        }
        Ok(())
    }

    /// Number of entries from `start` down that make up exactly `words`
    /// source words, following the JVM category rules: either one entry of
    /// that width or a run of single-word entries
    pub(crate) fn run_for_words(&self, op: &'static str, start: usize, words: u32) -> Result<usize, Violation> {
        self.require(op, start + 1)?;
        let first = self.entry_at(start).map_or(0, StackEntry::src_width);
        if first == words {
            return Ok(1);
        }
        let mut count = 0;
        while (count as u32) < words {
            self.require(op, start + count + 1)?;
            let width = self.entry_at(start + count).map_or(0, StackEntry::src_width);
            if width != 1 {
                return Err(Violation::WidthMismatch { op, depth: start + count, expected: 1, found: width });
            }
            count += 1;
        }
        Ok(count)
    }

    fn push_entry(&mut self, entry: StackEntry) {
        self.src_depth += entry.src_width();
        self.dst_depth += entry.dst_width();
        self.max_src_depth = self.max_src_depth.max(self.src_depth);
        self.max_dst_depth = self.max_dst_depth.max(self.dst_depth);
        self.entries.push(entry);
    }

    fn remove_top(&mut self, n: usize) {
        let keep = self.entries.len() - n;
        for entry in self.entries.drain(keep..) {
            self.src_depth -= entry.src_width();
            self.dst_depth -= entry.dst_width();
        }
        self.diag.counters.pops += n as u64;
        self.diag.log(Level::Trace, format_args!("pop {} entries", n));
    }

    fn insert_copies(&mut self, skip: usize, count: usize) {
        let len = self.entries.len();
        let copies: Vec<StackEntry> = self.entries[len - count..].to_vec();
        let at = len - count - skip;
        for entry in &copies {
            self.src_depth += entry.src_width();
            self.dst_depth += entry.dst_width();
        }
        self.max_src_depth = self.max_src_depth.max(self.src_depth);
        self.max_dst_depth = self.max_dst_depth.max(self.dst_depth);
        for (i, entry) in copies.into_iter().enumerate() {
            self.entries.insert(at + i, entry);
        }
        self.diag.counters.dups += 1;
        self.diag.log(Level::Trace, format_args!("dup {} entries past {}", count, skip));
    }
}
