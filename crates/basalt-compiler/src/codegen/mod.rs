//! The code generator contract.
//!
//! The compiler never produces machine code itself. It drives a [`Codegen`]
//! backend with data words, labels, function frames and [`IrNode`] trees.
//! [`Listing`] is a backend that records everything it is given.

mod ir;
mod listing;

pub use ir::IrNode;
pub use listing::{Emission, Listing};

use basalt_core::CodegenError;

/// Runtime symbol names the compiler refers to.
pub mod runtime {
    /// Descriptor of the Int type.
    pub const INT_TYPE: &str = "__bbIntType";
    /// Descriptor of the Float type.
    pub const FLOAT_TYPE: &str = "__bbFltType";
    /// Descriptor of the String type.
    pub const STRING_TYPE: &str = "__bbStrType";

    pub const DEBUG_ENTER: &str = "__bbDebugEnter";
    pub const DEBUG_LEAVE: &str = "__bbDebugLeave";

    pub const STR_CONST: &str = "__bbStrConst";
    pub const STR_RELEASE: &str = "__bbStrRelease";
    pub const STR_FROM_INT: &str = "__bbStrFromInt";
    pub const STR_FROM_FLOAT: &str = "__bbStrFromFloat";
    pub const STR_TO_INT: &str = "__bbStrToInt";
    pub const STR_TO_FLOAT: &str = "__bbStrToFloat";

    pub const OBJ_NEW: &str = "__bbObjNew";
    pub const OBJ_RELEASE: &str = "__bbObjRelease";

    pub const VEC_ALLOC: &str = "__bbVecAlloc";
    pub const VEC_FREE: &str = "__bbVecFree";
}

/// A code generator backend.
///
/// Data emission (`align_data`, `emit_word`, `emit_pointer`, `emit_string`)
/// goes to the static segment; `enter_function`, `emit_code`, `define_label`
/// and `leave_function` build executable code.
pub trait Codegen {
    /// Whether debug instrumentation should be emitted.
    fn debug(&self) -> bool;

    /// Pad the data segment to a multiple of `n` bytes.
    fn align_data(&mut self, n: u32) -> Result<(), CodegenError>;

    /// Emit one data word, optionally labelled.
    fn emit_word(&mut self, value: i32, label: Option<&str>) -> Result<(), CodegenError>;

    /// Emit a data word holding the address of `label`.
    fn emit_pointer(&mut self, label: &str) -> Result<(), CodegenError>;

    /// Emit a string payload under `label`.
    fn emit_string(&mut self, value: &str, label: &str) -> Result<(), CodegenError>;

    /// Define a code label at the current position.
    fn define_label(&mut self, name: &str) -> Result<(), CodegenError>;

    /// Start a function under `label` reserving `frame_size` bytes of locals.
    fn enter_function(&mut self, label: &str, frame_size: u32) -> Result<(), CodegenError>;

    /// Finish the current function: run `teardown`, then return popping
    /// `param_bytes` bytes of arguments.
    fn leave_function(
        &mut self,
        teardown: Option<IrNode>,
        param_bytes: u32,
    ) -> Result<(), CodegenError>;

    /// Emit executable code.
    fn emit_code(&mut self, tree: IrNode) -> Result<(), CodegenError>;
}
