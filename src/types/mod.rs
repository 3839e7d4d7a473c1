//! Type ids, descriptors and cast decisions
//!
//! - **type_id**: tagged `u32` encoding of slot types and `TypeArray` snapshots
//! - **registry**: the value-type lookup contract and an in-memory registry
//! - **descriptor**: descriptor parsing, rendering and the per-pass method cache
//! - **cast**: compatibility predicates used when casts or frames are rebuilt

pub mod cast;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod type_id;

pub use cast::{check, check_arg, check_cast_frame, check_frame_arrays, Cast};
pub use descriptor::{
    make_basic_type_descriptor, make_descriptor, make_dst_descriptor, make_method_descriptor, make_src_descriptor,
    parse_field, parse_method, parse_method_into, parse_type, CacheStats, MethodDescriptorCache,
    MethodSig,
};
pub use error::{DescriptorError, TypeIdError};
pub use registry::{NoValueTypes, Strategy, ValueTypeDef, ValueTypeLookup, ValueTypeRegistry};
pub use type_id::{Carrier, Kind, TypeArray, TypeId};
