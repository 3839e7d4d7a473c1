// TypeId bit layout shared by the descriptor parser, formatter and cast checker

// Kind tag: bits 0..3
pub const KIND_BITS: u32 = 3;
pub const KIND_MASK: u32 = (1 << KIND_BITS) - 1;

// Wide carrier flag for value types: bit 3
pub const WIDE_CARRIER_BIT: u32 = 1 << 3;

// Array depth: bits 4..12 (the JVM caps array dimensions at 255)
pub const DEPTH_SHIFT: u32 = 4;
pub const DEPTH_BITS: u32 = 8;
pub const DEPTH_MASK: u32 = ((1 << DEPTH_BITS) - 1) << DEPTH_SHIFT;
pub const MAX_ARRAY_DEPTH: u32 = (1 << DEPTH_BITS) - 1;

// Value-type index: bits 12..32
pub const INDEX_SHIFT: u32 = DEPTH_SHIFT + DEPTH_BITS;
pub const MAX_VALUE_TYPE_INDEX: u32 = (1 << (32 - INDEX_SHIFT)) - 1;

// Descriptor rendered for object references, the TypeId carries no class name
pub const OBJECT_DESCRIPTOR: &str = "Ljava/lang/Object;";

// Environment variables read by Config::from_env
pub const ENV_LOG_LEVEL: &str = "VTR_LOG";
pub const ENV_VIOLATIONS: &str = "VTR_VIOLATIONS";
