//! Non-local control flow, as a tagged outcome instead of a thrown
//! signal.

use crate::value::Value;

/// The outcome of executing a statement or a statement sequence.
/// `Return` unwinds every enclosing block up to the method frame that
/// invoked it, which converts it back into a plain `Value`.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Value(Value),
    Return(Value),
}

impl Flow {
    /// True once a `RETURN` has fired and the rest of the current
    /// statement sequence must be skipped.
    pub fn is_return(&self) -> bool {
        matches!(self, Flow::Return(_))
    }

    /// Unwraps the carried value regardless of variant, for the method
    /// frame that stops propagation.
    pub fn into_value(self) -> Value {
        match self {
            Flow::Value(v) | Flow::Return(v) => v,
        }
    }
}
