//! Diagnostic codes with category prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The solver stage a diagnostic comes from, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Design input and feasibility checks, prefixed with `I`.
    Input,
    /// First-placement progress, prefixed with `P`.
    Placement,
    /// Disruption and backtracking, prefixed with `S`.
    Search,
    /// Iterative improvement rounds, prefixed with `O`.
    Improve,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Input => 'I',
            Category::Placement => 'P',
            Category::Search => 'S',
            Category::Improve => 'O',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `I001`, `P002`, `O010`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Input.prefix(), 'I');
        assert_eq!(Category::Placement.prefix(), 'P');
        assert_eq!(Category::Search.prefix(), 'S');
        assert_eq!(Category::Improve.prefix(), 'O');
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", DiagnosticCode::new(Category::Input, 1)), "I001");
        assert_eq!(
            format!("{}", DiagnosticCode::new(Category::Improve, 42)),
            "O042"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Search, 7);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
