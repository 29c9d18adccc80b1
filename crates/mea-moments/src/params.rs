use serde::{Deserialize, Serialize};

/// Options controlling the central-moment derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveOpts {
    /// Simplify every sub-term as soon as it is added to a row.
    pub simplify_each_term: bool,
    /// Highest central-moment order the engine accepts.
    pub max_order_guard: u32,
    /// Check that no central-moment symbol survives in the output.
    pub validate_closure: bool,
}

impl Default for DeriveOpts {
    fn default() -> Self {
        Self {
            simplify_each_term: true,
            max_order_guard: 6,
            validate_closure: true,
        }
    }
}

impl DeriveOpts {
    /// Returns a sanitised copy; the order guard never drops below two.
    pub fn sanitised(&self) -> Self {
        Self {
            simplify_each_term: self.simplify_each_term,
            max_order_guard: self.max_order_guard.max(2),
            validate_closure: self.validate_closure,
        }
    }
}
