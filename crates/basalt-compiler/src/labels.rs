//! Unique label generation.

/// Generates unit-unique symbolic labels.
///
/// Labels are `_1`, `_2`, ... in generation order. The counter only grows,
/// so a label is never handed out twice within one compilation unit.
#[derive(Debug, Default)]
pub struct LabelGen {
    next: u32,
}

impl LabelGen {
    /// Create a generator starting at `_1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter and return the new label.
    pub fn next_label(&mut self) -> String {
        self.next += 1;
        format!("_{}", self.next)
    }

    /// Number of labels generated so far.
    pub fn generated(&self) -> u32 {
        self.next
    }
}
