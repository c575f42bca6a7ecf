//! Stack frame layout for function bodies.
//!
//! Every variable declared in a function scope or in any block nested inside
//! it gets a frame slot:
//!
//! ```text
//!   fp + 8 + 4*i   parameter i
//!   fp + 4         return address
//!   fp             saved frame pointer
//!   fp - 4*(n+1)   local n (declaration order, blocks depth-first)
//! ```
//!
//! Constant declarations take no slot.

use basalt_core::{DeclFlags, WORD_SIZE};
use basalt_registry::{Type, TypeId};
use rustc_hash::FxHashMap;

use crate::codegen::{IrNode, runtime};
use crate::context::CompilationContext;
use crate::scope::EnvId;

/// Offset of the first parameter above the frame pointer.
pub const PARAM_BASE: i32 = 8;

/// A variable's place in the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSlot {
    /// Scope that declares the variable.
    pub env: EnvId,
    /// Variable name.
    pub name: String,
    /// Variable type.
    pub ty: TypeId,
    /// Byte offset from the frame pointer.
    pub offset: i32,
    /// Whether this is a parameter rather than a local.
    pub is_param: bool,
}

/// The frame of one function.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    slots: Vec<FrameSlot>,
    offsets: FxHashMap<(EnvId, String), i32>,
    locals: u32,
    params: u32,
}

impl Frame {
    /// Lay out the frame of the function whose scope is `func_env`.
    pub fn layout(ctx: &CompilationContext, func_env: EnvId) -> Self {
        let mut frame = Frame::default();
        frame.visit(ctx, func_env);
        frame
    }

    fn visit(&mut self, ctx: &CompilationContext, env: EnvId) {
        let scope = ctx.env(env);
        for decl in scope.decls().iter() {
            if !decl.kind.is_variable() || matches!(ctx.ty(decl.ty), Some(Type::Const(_))) {
                continue;
            }
            let (offset, is_param) = if decl.kind.contains(DeclFlags::PARAM) {
                let offset = PARAM_BASE + (self.params * WORD_SIZE) as i32;
                self.params += 1;
                (offset, true)
            } else if decl.kind.contains(DeclFlags::LOCAL) {
                self.locals += 1;
                (-((self.locals * WORD_SIZE) as i32), false)
            } else {
                continue;
            };
            self.offsets.insert((env, decl.name.clone()), offset);
            self.slots.push(FrameSlot {
                env,
                name: decl.name.clone(),
                ty: decl.ty,
                offset,
                is_param,
            });
        }
        for &child in scope.children() {
            self.visit(ctx, child);
        }
    }

    /// Bytes of locals to reserve on entry.
    pub fn size(&self) -> u32 {
        self.locals * WORD_SIZE
    }

    /// Number of parameter slots.
    pub fn param_count(&self) -> u32 {
        self.params
    }

    /// All slots in layout order.
    pub fn slots(&self) -> &[FrameSlot] {
        &self.slots
    }

    /// Offset of a variable declared in `env`.
    pub fn offset(&self, env: EnvId, name: &str) -> Option<i32> {
        self.offsets.get(&(env, name.to_string())).copied()
    }

    fn locals(&self) -> impl Iterator<Item = &FrameSlot> {
        self.slots.iter().filter(|s| !s.is_param)
    }

    /// Code run on entry to give locals their initial values.
    ///
    /// Numeric and struct locals start as the zeroed frame; strings are
    /// cleared explicitly and arrays are allocated.
    pub fn init_code(&self, ctx: &CompilationContext) -> Option<IrNode> {
        let nodes = self
            .locals()
            .filter_map(|slot| match ctx.ty(slot.ty) {
                Some(Type::String) => Some(IrNode::store(IrNode::Local(slot.offset), IrNode::Const(0))),
                Some(Type::Vector(v)) => Some(IrNode::store(
                    IrNode::Local(slot.offset),
                    IrNode::call(runtime::VEC_ALLOC, vec![IrNode::Global(v.label.clone())]),
                )),
                _ => None,
            })
            .collect();
        IrNode::seq(nodes)
    }

    /// Code run on exit to release what locals hold.
    pub fn teardown_code(&self, ctx: &CompilationContext) -> Option<IrNode> {
        let nodes = self
            .locals()
            .filter_map(|slot| match ctx.ty(slot.ty) {
                Some(Type::String) => Some(IrNode::call(
                    runtime::STR_RELEASE,
                    vec![IrNode::Local(slot.offset)],
                )),
                Some(Type::Struct(_)) => Some(IrNode::call(
                    runtime::OBJ_RELEASE,
                    vec![IrNode::Local(slot.offset)],
                )),
                Some(Type::Vector(v)) => Some(IrNode::call(
                    runtime::VEC_FREE,
                    vec![IrNode::Local(slot.offset), IrNode::Global(v.label.clone())],
                )),
                _ => None,
            })
            .collect();
        IrNode::seq(nodes)
    }
}
