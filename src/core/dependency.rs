//! Dependency declarations.
//!
//! A `DependencyDecl` is the declared form of an edge between two
//! projects; graph storage and traversal live in `crate::graph`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::target::TargetSpace;
use crate::util::InternedString;

/// Whether a dependency is re-exported to consumers.
///
/// A public dependency of A is visible to anything depending on A; a
/// private dependency is visible to A alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Public
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// A declared dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDecl {
    from: InternedString,
    to: InternedString,
    visibility: Visibility,
    filter: Option<TargetSpace>,
}

impl DependencyDecl {
    /// Declare a public dependency.
    pub fn public(from: impl Into<InternedString>, to: impl Into<InternedString>) -> Self {
        DependencyDecl {
            from: from.into(),
            to: to.into(),
            visibility: Visibility::Public,
            filter: None,
        }
    }

    /// Declare a private dependency.
    pub fn private(from: impl Into<InternedString>, to: impl Into<InternedString>) -> Self {
        DependencyDecl {
            from: from.into(),
            to: to.into(),
            visibility: Visibility::Private,
            filter: None,
        }
    }

    /// Restrict the edge to a subset of targets.
    pub fn with_filter(mut self, filter: TargetSpace) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn from(&self) -> InternedString {
        self.from
    }

    pub fn to(&self) -> InternedString {
        self.to
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn filter(&self) -> Option<&TargetSpace> {
        self.filter.as_ref()
    }

    /// True when the edge applies to `target` (no filter, or filter
    /// contains it).
    pub fn applies_to(&self, target: crate::core::target::Target) -> bool {
        self.filter.as_ref().map_or(true, |f| f.contains(target))
    }
}

impl fmt::Display for DependencyDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.visibility)
    }
}
