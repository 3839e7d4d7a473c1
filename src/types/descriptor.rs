//! Descriptor parsing and rendering
//!
//! Parsing turns JVM field/method descriptors into `TypeId`s, substituting
//! value types for the classes the lookup knows about. Rendering goes the
//! other way; value types surface as their carrier (`J` or `I`) because that
//! is what the rewritten code stores.

use std::collections::HashMap;

use crate::config::Config;
use crate::consts::OBJECT_DESCRIPTOR;
use super::error::{DescriptorError, DescriptorResult};
use super::registry::ValueTypeLookup;
use super::type_id::{Carrier, Kind, TypeId};

/// Parsed method signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub ret: TypeId,
    pub args: Vec<TypeId>,
}

impl MethodSig {
    /// Source words the arguments take on the operand stack
    pub fn arg_src_words(&self) -> u32 {
        self.args.iter().map(|t| t.src_width()).sum()
    }

    pub fn arg_dst_words(&self) -> u32 {
        self.args.iter().map(|t| t.dst_width()).sum()
    }

    pub fn has_value_types(&self) -> bool {
        self.ret.is_value_type() || self.args.iter().any(|t| t.is_value_type())
    }
}

/// Parse exactly one type starting at `pos`
///
/// Returns the type and the position just past it. `V` is accepted here;
/// callers that parse fields or arguments reject it themselves.
pub fn parse_type<L>(desc: &str, pos: usize, lookup: &L) -> DescriptorResult<(TypeId, usize)>
where
    L: ValueTypeLookup + ?Sized,
{
    let bytes = desc.as_bytes();
    let mut p = pos;
    let mut depth: u32 = 0;
    while bytes.get(p) == Some(&b'[') {
        depth += 1;
        p += 1;
    }

    let code = *bytes.get(p).ok_or_else(|| DescriptorError::UnexpectedEnd {
        descriptor: desc.to_string(),
        position: p,
    })?;

    let base = match code {
        b'V' => {
            if depth > 0 {
                return Err(DescriptorError::MisplacedVoid { descriptor: desc.to_string(), position: p });
            }
            TypeId::VOID
        }
        b'I' | b'Z' | b'S' | b'B' | b'C' => TypeId::I32,
        b'J' => TypeId::I64,
        b'F' => TypeId::F32,
        b'D' => TypeId::F64,
        b'L' => {
            let start = p + 1;
            let len = desc
                .get(start..)
                .and_then(|rest| rest.find(';'))
                .ok_or_else(|| DescriptorError::UnterminatedClassName {
                    descriptor: desc.to_string(),
                    position: p,
                })?;
            if len == 0 {
                return Err(DescriptorError::EmptyClassName { descriptor: desc.to_string(), position: p });
            }
            let name = &desc[start..start + len];
            p = start + len;
            match lookup.value_type(name) {
                Some(vt) => vt.element(),
                None => TypeId::OBJECT,
            }
        }
        _ => {
            let shown = desc.get(p..).and_then(|s| s.chars().next()).unwrap_or(code as char);
            return Err(DescriptorError::UnknownTypeCode {
                descriptor: desc.to_string(),
                position: p,
                code: shown,
            });
        }
    };

    let ty = base.with_depth(depth).map_err(|source| DescriptorError::InvalidType {
        descriptor: desc.to_string(),
        source,
    })?;
    Ok((ty, p + 1))
}

/// Parse a complete field descriptor
pub fn parse_field<L>(desc: &str, lookup: &L) -> DescriptorResult<TypeId>
where
    L: ValueTypeLookup + ?Sized,
{
    let (ty, next) = parse_type(desc, 0, lookup)?;
    if ty.is_void() {
        return Err(DescriptorError::MisplacedVoid { descriptor: desc.to_string(), position: 0 });
    }
    if next != desc.len() {
        return Err(DescriptorError::TrailingCharacters { descriptor: desc.to_string(), position: next });
    }
    Ok(ty)
}

/// Parse `(args)ret` into `out`: return type first, then the arguments in order
///
/// Returns the argument count. On error `out` is left as it was.
pub fn parse_method_into<L>(out: &mut Vec<TypeId>, desc: &str, lookup: &L) -> DescriptorResult<usize>
where
    L: ValueTypeLookup + ?Sized,
{
    let start_len = out.len();
    let result = parse_method_tail(out, desc, lookup);
    if result.is_err() {
        out.truncate(start_len);
    }
    result
}

fn parse_method_tail<L>(out: &mut Vec<TypeId>, desc: &str, lookup: &L) -> DescriptorResult<usize>
where
    L: ValueTypeLookup + ?Sized,
{
    let bytes = desc.as_bytes();
    if bytes.first() != Some(&b'(') {
        return Err(DescriptorError::MissingOpenParen { descriptor: desc.to_string() });
    }

    let ret_slot = out.len();
    out.push(TypeId::VOID);

    let mut p = 1;
    let mut count = 0;
    loop {
        match bytes.get(p) {
            None => return Err(DescriptorError::MissingCloseParen { descriptor: desc.to_string() }),
            Some(b')') => break,
            Some(_) => {
                let (arg, next) = parse_type(desc, p, lookup)?;
                if arg.is_void() {
                    return Err(DescriptorError::MisplacedVoid { descriptor: desc.to_string(), position: p });
                }
                out.push(arg);
                count += 1;
                p = next;
            }
        }
    }

    let (ret, next) = parse_type(desc, p + 1, lookup)?;
    if next != desc.len() {
        return Err(DescriptorError::TrailingCharacters { descriptor: desc.to_string(), position: next });
    }
    out[ret_slot] = ret;
    Ok(count)
}

pub fn parse_method<L>(desc: &str, lookup: &L) -> DescriptorResult<MethodSig>
where
    L: ValueTypeLookup + ?Sized,
{
    let mut buf = Vec::with_capacity(desc.len());
    parse_method_into(&mut buf, desc, lookup)?;
    let ret = buf[0];
    buf.remove(0);
    Ok(MethodSig { ret, args: buf })
}

fn element_descriptor(ty: TypeId) -> &'static str {
    match ty.kind() {
        Kind::Void => "V",
        Kind::I32 => "I",
        Kind::I64 => "J",
        Kind::F32 => "F",
        Kind::F64 => "D",
        Kind::ObjectRef => OBJECT_DESCRIPTOR,
        Kind::ValueType => match ty.carrier() {
            Some(Carrier::Narrow) => "I",
            _ => "J",
        },
    }
}

/// Element descriptor with the array dimensions dropped
pub fn make_basic_type_descriptor(ty: TypeId) -> String {
    element_descriptor(ty).to_string()
}

/// Descriptor of `ty` with its array prefix
///
/// Source and destination renderings are the same string: primitives and
/// references are untouched by the transform, and value types already
/// surface in their carrier form.
pub fn make_descriptor(ty: TypeId) -> String {
    let mut desc = String::new();
    for _ in 0..ty.array_depth() {
        desc.push('[');
    }
    desc.push_str(element_descriptor(ty));
    desc
}

pub fn make_src_descriptor(ty: TypeId) -> String {
    make_descriptor(ty)
}

pub fn make_dst_descriptor(ty: TypeId) -> String {
    make_descriptor(ty)
}

pub fn make_method_descriptor(ret: TypeId, args: &[TypeId]) -> String {
    let mut d = String::new();
    d.push('(');
    for arg in args {
        d.push_str(&make_descriptor(*arg));
    }
    d.push(')');
    d.push_str(&make_descriptor(ret));
    d
}

/// Hit/miss counters of a [`MethodDescriptorCache`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizes method descriptor parsing for the lifetime of one pass
///
/// The cache assumes the same lookup is used for every call.
#[derive(Debug)]
pub struct MethodDescriptorCache {
    enabled: bool,
    entries: HashMap<String, MethodSig>,
    hits: u64,
    misses: u64,
}

impl MethodDescriptorCache {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.method_cache,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn parse<L>(&mut self, desc: &str, lookup: &L) -> DescriptorResult<MethodSig>
    where
        L: ValueTypeLookup + ?Sized,
    {
        if self.enabled {
            if let Some(sig) = self.entries.get(desc) {
                self.hits += 1;
                return Ok(sig.clone());
            }
        }
        self.misses += 1;
        let sig = parse_method(desc, lookup)?;
        if self.enabled {
            self.entries.insert(desc.to_string(), sig.clone());
        }
        Ok(sig)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats { hits: self.hits, misses: self.misses, entries: self.entries.len() }
    }

    /// End of pass: report usage and drop the entries
    pub fn finish(self) -> CacheStats {
        let stats = self.stats();
        log::debug!(
            "method descriptor cache: {} hits, {} misses, {} entries",
            stats.hits, stats.misses, stats.entries
        );
        stats
    }
}
