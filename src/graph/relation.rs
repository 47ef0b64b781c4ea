//! Parent → child relation between two person labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A directed parent → child edge, by label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// The parent (source) label.
    pub parent: String,
    /// The child (target) label.
    pub child: String,
}

impl Relation {
    /// Create a relation from two labels.
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.parent, self.child)
    }
}

impl<P: Into<String>, C: Into<String>> From<(P, C)> for Relation {
    #[inline]
    fn from((parent, child): (P, C)) -> Self {
        Self::new(parent, child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_display() {
        let relation = Relation::new("Alice", "Bob");
        assert_eq!(format!("{}", relation), "Alice -> Bob");
    }

    #[test]
    fn test_relation_from_tuple() {
        let relation: Relation = ("Eve", "Frank").into();
        assert_eq!(relation, Relation::new("Eve", "Frank"));
    }
}
