//! Declaration kind flags and runtime record tags.

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Size in bytes of one storage word.
///
/// Struct field offsets, global slots and parameter blocks are all measured
/// in words.
pub const WORD_SIZE: u32 = 4;

bitflags! {
    /// What kind of binding a declaration introduces.
    ///
    /// Flags combine: a global constant is `GLOBAL | CONST`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeclFlags: u32 {
        /// Module-level variable with a static storage slot.
        const GLOBAL = 1 << 0;
        /// Function-local variable stored in the frame.
        const LOCAL = 1 << 1;
        /// Function parameter.
        const PARAM = 1 << 2;
        /// Struct field.
        const FIELD = 1 << 3;
        /// Compile-time constant.
        const CONST = 1 << 4;
        /// Function name.
        const FUNC = 1 << 5;
        /// Struct type name.
        const STRUCT = 1 << 6;
    }
}

impl DeclFlags {
    /// Whether this binding occupies storage at runtime.
    pub fn is_variable(self) -> bool {
        self.intersects(DeclFlags::GLOBAL | DeclFlags::LOCAL | DeclFlags::PARAM | DeclFlags::FIELD)
            && !self.contains(DeclFlags::CONST)
    }
}

/// Tags identifying static records read by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum DataTag {
    /// `Data` record holding an integer.
    Int = 1,
    /// `Data` record holding a float bit pattern.
    Float = 2,
    /// `Data` record holding a pointer to a string payload.
    String = 4,
    /// Struct type descriptor.
    StructType = 5,
    /// Fixed-size array type descriptor.
    VectorType = 6,
}
