//! A recording code generator.
//!
//! [`Listing`] keeps every emission in order and renders them as an
//! assembly-like text. It checks the two things a real backend would refuse:
//! redefining a label and unbalanced function frames.

use std::fmt;

use basalt_core::CodegenError;
use rustc_hash::FxHashSet;

use super::{Codegen, IrNode};

/// One recorded emission.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// `align_data(n)`
    Align(u32),
    /// `emit_word(value, label)`
    Word { value: i32, label: Option<String> },
    /// `emit_pointer(label)`
    Pointer(String),
    /// `emit_string(value, label)`
    Str { value: String, label: String },
    /// `define_label(name)`
    Label(String),
    /// `enter_function(label, frame_size)`
    Enter { label: String, frame_size: u32 },
    /// `leave_function(teardown, param_bytes)`
    Leave {
        teardown: Option<IrNode>,
        param_bytes: u32,
    },
    /// `emit_code(tree)`
    Code(IrNode),
}

impl Emission {
    /// Shorthand for an unlabelled word.
    pub fn word(value: i32) -> Self {
        Emission::Word { value, label: None }
    }

    /// Shorthand for a labelled word.
    pub fn labelled_word(value: i32, label: &str) -> Self {
        Emission::Word {
            value,
            label: Some(label.to_string()),
        }
    }

    /// Shorthand for a pointer.
    pub fn pointer(label: &str) -> Self {
        Emission::Pointer(label.to_string())
    }
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emission::Align(n) => write!(f, "\t.align {n}"),
            Emission::Word {
                value,
                label: Some(label),
            } => write!(f, "{label}:\t.word {value}"),
            Emission::Word { value, label: None } => write!(f, "\t.word {value}"),
            Emission::Pointer(label) => write!(f, "\t.ptr {label}"),
            Emission::Str { value, label } => write!(f, "{label}:\t.string {value:?}"),
            Emission::Label(name) => write!(f, "{name}:"),
            Emission::Enter { label, frame_size } => write!(f, "{label}:\tenter {frame_size}"),
            Emission::Leave {
                teardown,
                param_bytes,
            } => {
                if let Some(t) = teardown {
                    writeln!(f, "\t{t}")?;
                }
                write!(f, "\tret {param_bytes}")
            }
            Emission::Code(tree) => write!(f, "\t{tree}"),
        }
    }
}

/// A backend that records emissions.
#[derive(Debug, Default)]
pub struct Listing {
    debug: bool,
    emissions: Vec<Emission>,
    defined: FxHashSet<String>,
    open_function: Option<String>,
}

impl Listing {
    /// Create a listing with debug instrumentation off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a listing with debug instrumentation switched on or off.
    pub fn with_debug(debug: bool) -> Self {
        Self {
            debug,
            ..Self::default()
        }
    }

    /// All emissions in order.
    pub fn emissions(&self) -> &[Emission] {
        &self.emissions
    }

    /// Number of emissions so far.
    pub fn len(&self) -> usize {
        self.emissions.len()
    }

    /// Whether nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }

    /// Emissions recorded since position `from`.
    pub fn since(&self, from: usize) -> &[Emission] {
        &self.emissions[from.min(self.emissions.len())..]
    }

    /// Whether `label` has been defined.
    pub fn is_defined(&self, label: &str) -> bool {
        self.defined.contains(label)
    }

    fn define(&mut self, label: &str) -> Result<(), CodegenError> {
        if !self.defined.insert(label.to_string()) {
            return Err(CodegenError::LabelRedefined(label.to_string()));
        }
        Ok(())
    }
}

impl Codegen for Listing {
    fn debug(&self) -> bool {
        self.debug
    }

    fn align_data(&mut self, n: u32) -> Result<(), CodegenError> {
        self.emissions.push(Emission::Align(n));
        Ok(())
    }

    fn emit_word(&mut self, value: i32, label: Option<&str>) -> Result<(), CodegenError> {
        if let Some(label) = label {
            self.define(label)?;
        }
        self.emissions.push(Emission::Word {
            value,
            label: label.map(str::to_string),
        });
        Ok(())
    }

    fn emit_pointer(&mut self, label: &str) -> Result<(), CodegenError> {
        self.emissions.push(Emission::Pointer(label.to_string()));
        Ok(())
    }

    fn emit_string(&mut self, value: &str, label: &str) -> Result<(), CodegenError> {
        self.define(label)?;
        self.emissions.push(Emission::Str {
            value: value.to_string(),
            label: label.to_string(),
        });
        Ok(())
    }

    fn define_label(&mut self, name: &str) -> Result<(), CodegenError> {
        self.define(name)?;
        self.emissions.push(Emission::Label(name.to_string()));
        Ok(())
    }

    fn enter_function(&mut self, label: &str, frame_size: u32) -> Result<(), CodegenError> {
        if let Some(open) = &self.open_function {
            return Err(CodegenError::UnbalancedFrame(format!(
                "'{label}' entered while '{open}' is open"
            )));
        }
        self.define(label)?;
        self.open_function = Some(label.to_string());
        self.emissions.push(Emission::Enter {
            label: label.to_string(),
            frame_size,
        });
        Ok(())
    }

    fn leave_function(
        &mut self,
        teardown: Option<IrNode>,
        param_bytes: u32,
    ) -> Result<(), CodegenError> {
        if self.open_function.take().is_none() {
            return Err(CodegenError::UnbalancedFrame(
                "leave without enter".to_string(),
            ));
        }
        self.emissions.push(Emission::Leave {
            teardown,
            param_bytes,
        });
        Ok(())
    }

    fn emit_code(&mut self, tree: IrNode) -> Result<(), CodegenError> {
        self.emissions.push(Emission::Code(tree));
        Ok(())
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for emission in &self.emissions {
            writeln!(f, "{emission}")?;
        }
        Ok(())
    }
}
