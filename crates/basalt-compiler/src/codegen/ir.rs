//! Intermediate code trees handed to the code generator.

use std::fmt;

/// A node of the linear intermediate code.
#[derive(Debug, Clone, PartialEq)]
pub enum IrNode {
    /// A 32-bit immediate (floats travel as their bit pattern).
    Const(i32),
    /// The word stored in the current frame at a byte offset.
    Local(i32),
    /// The address of a label.
    Global(String),
    /// The word stored at an address.
    Mem(Box<IrNode>),
    /// The current frame pointer.
    FramePointer,
    /// Store `value` into the location `target`.
    Store {
        target: Box<IrNode>,
        value: Box<IrNode>,
    },
    /// Call a runtime function.
    Call { name: String, args: Vec<IrNode> },
    /// Convert an integer to a float.
    IntToFloat(Box<IrNode>),
    /// Convert a float to an integer.
    FloatToInt(Box<IrNode>),
    /// Unconditional jump to a label.
    Jump(String),
    /// Evaluate nodes in order.
    Seq(Vec<IrNode>),
}

impl IrNode {
    /// Build a call node.
    pub fn call(name: impl Into<String>, args: Vec<IrNode>) -> Self {
        IrNode::Call {
            name: name.into(),
            args,
        }
    }

    /// Build a store node.
    pub fn store(target: IrNode, value: IrNode) -> Self {
        IrNode::Store {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// The word stored at a label.
    pub fn global_word(label: impl Into<String>) -> Self {
        IrNode::Mem(Box::new(IrNode::Global(label.into())))
    }

    /// Sequence a list of nodes; `None` when empty, the node itself when single.
    pub fn seq(mut nodes: Vec<IrNode>) -> Option<Self> {
        match nodes.len() {
            0 => None,
            1 => nodes.pop(),
            _ => Some(IrNode::Seq(nodes)),
        }
    }
}

impl fmt::Display for IrNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrNode::Const(v) => write!(f, "{v}"),
            IrNode::Local(off) => write!(f, "[fp{off:+}]"),
            IrNode::Global(label) => write!(f, "{label}"),
            IrNode::Mem(addr) => write!(f, "[{addr}]"),
            IrNode::FramePointer => write!(f, "fp"),
            IrNode::Store { target, value } => write!(f, "{target} := {value}"),
            IrNode::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            IrNode::IntToFloat(v) => write!(f, "float({v})"),
            IrNode::FloatToInt(v) => write!(f, "int({v})"),
            IrNode::Jump(label) => write!(f, "jmp {label}"),
            IrNode::Seq(nodes) => {
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{node}")?;
                }
                Ok(())
            }
        }
    }
}
