//! Atomic build targets and target spaces.
//!
//! A `Target` is one immutable (platform, toolchain, optimization) tuple.
//! Tuples are interned: identical tuples share one allocation, so equality
//! is a pointer comparison and a `Target` is a two-word copy handle, the
//! same scheme `util::interning` uses for names. Ordering follows tuple
//! value, not interning order.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{LazyLock, RwLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::dimension::{Optimization, Platform, Toolchain};
use crate::util::interning::intern;

static TARGETS: LazyLock<RwLock<HashSet<&'static TargetTuple>>> =
    LazyLock::new(|| RwLock::new(HashSet::new()));

/// The value form of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetTuple {
    pub platform: Platform,
    pub toolchain: Toolchain,
    pub optimization: Optimization,
}

/// An interned atomic target.
#[derive(Clone, Copy)]
pub struct Target {
    inner: &'static TargetTuple,
}

impl Target {
    /// Intern the tuple (platform, toolchain, optimization).
    pub fn new(platform: Platform, toolchain: Toolchain, optimization: Optimization) -> Self {
        let tuple = TargetTuple {
            platform,
            toolchain,
            optimization,
        };
        Target {
            inner: intern(&TARGETS, &tuple),
        }
    }

    pub fn platform(&self) -> Platform {
        self.inner.platform
    }

    pub fn toolchain(&self) -> Toolchain {
        self.inner.toolchain
    }

    pub fn optimization(&self) -> Optimization {
        self.inner.optimization
    }

    /// The underlying tuple value.
    pub fn tuple(&self) -> &TargetTuple {
        self.inner
    }
}

impl PartialEq for Target {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.inner, other.inner)
    }
}

impl Eq for Target {}

impl PartialOrd for Target {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Target {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(other.inner)
    }
}

impl Hash for Target {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Interning makes pointer identity equal value identity.
        std::ptr::hash(self.inner, state)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({})", self)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.inner.platform, self.inner.toolchain, self.inner.optimization
        )
    }
}

impl std::str::FromStr for Target {
    type Err = crate::errors::GenError;

    /// Parse the display form, e.g. `win64-msvc2019-debug`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let (Some(p), Some(t), Some(o)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(crate::errors::GenError::Configuration {
                message: format!(
                    "invalid target `{}`, expected platform-toolchain-optimization",
                    s
                ),
            });
        };
        Ok(Target::new(p.parse()?, t.parse()?, o.parse()?))
    }
}

impl Serialize for Target {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.inner.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tuple = TargetTuple::deserialize(deserializer)?;
        Ok(Target::new(
            tuple.platform,
            tuple.toolchain,
            tuple.optimization,
        ))
    }
}

/// A declared set of dimension values, prior to expansion.
///
/// Each list is kept in declaration order. An empty list acts as a
/// wildcard when the declaration is used as a filter; for expansion every
/// dimension must name at least one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TargetDecl {
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub toolchains: Vec<Toolchain>,
    #[serde(default)]
    pub optimizations: Vec<Optimization>,
}

impl TargetDecl {
    pub fn new() -> Self {
        TargetDecl::default()
    }

    /// Append a platform, keeping declaration order.
    pub fn platform(mut self, p: Platform) -> Self {
        self.platforms.push(p);
        self
    }

    /// Append a toolchain.
    pub fn toolchain(mut self, t: Toolchain) -> Self {
        self.toolchains.push(t);
        self
    }

    /// Append an optimization profile.
    pub fn optimization(mut self, o: Optimization) -> Self {
        self.optimizations.push(o);
        self
    }

    /// Expand the declaration into atomic targets: the Cartesian product
    /// across dimensions in declaration order, duplicates removed by value
    /// equality. Identical declarations always expand to the same list.
    pub fn expand(&self) -> Vec<Target> {
        let mut out = Vec::new();
        for &p in &self.platforms {
            for &t in &self.toolchains {
                for &o in &self.optimizations {
                    let target = Target::new(p, t, o);
                    if !out.contains(&target) {
                        out.push(target);
                    }
                }
            }
        }
        out
    }

    /// True if no dimension lists any value.
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty() && self.toolchains.is_empty() && self.optimizations.is_empty()
    }

    /// Filter semantics: a target matches when every non-empty dimension
    /// list contains its value.
    pub fn matches(&self, target: Target) -> bool {
        (self.platforms.is_empty() || self.platforms.contains(&target.platform()))
            && (self.toolchains.is_empty() || self.toolchains.contains(&target.toolchain()))
            && (self.optimizations.is_empty()
                || self.optimizations.contains(&target.optimization()))
    }
}

/// An ordered, deduplicated set of atomic targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSpace {
    targets: Vec<Target>,
}

impl TargetSpace {
    pub fn empty() -> Self {
        TargetSpace::default()
    }

    /// Expand one declaration into a space.
    pub fn from_decl(decl: &TargetDecl) -> Self {
        TargetSpace {
            targets: decl.expand(),
        }
    }

    /// Expand a further declaration into this space. Later declarations
    /// append after earlier ones; duplicates are dropped.
    pub fn add_decl(&mut self, decl: &TargetDecl) {
        for target in decl.expand() {
            self.push(target);
        }
    }

    /// Add one target, preserving first-occurrence order.
    pub fn push(&mut self, target: Target) {
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }
    }

    pub fn contains(&self, target: Target) -> bool {
        self.targets.contains(&target)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn iter(&self) -> impl Iterator<Item = Target> + '_ {
        self.targets.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// True if every target of `self` is in `other`.
    pub fn is_subset_of(&self, other: &TargetSpace) -> bool {
        self.targets.iter().all(|t| other.contains(*t))
    }
}

impl FromIterator<Target> for TargetSpace {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        let mut space = TargetSpace::empty();
        for t in iter {
            space.push(t);
        }
        space
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interned_identity() {
        let a = Target::new(Platform::Win64, Toolchain::Msvc2019, Optimization::Debug);
        let b = Target::new(Platform::Win64, Toolchain::Msvc2019, Optimization::Debug);
        let c = Target::new(Platform::Win64, Toolchain::Msvc2019, Optimization::Release);

        assert_eq!(a, b);
        assert!(std::ptr::eq(a.inner, b.inner));
        assert_ne!(a, c);
    }

    #[test]
    fn test_union_of_three_profiles_expands_to_three_targets() {
        let decl = TargetDecl::new()
            .platform(Platform::Win64)
            .toolchain(Toolchain::Msvc2019)
            .optimization(Optimization::Debug)
            .optimization(Optimization::Release)
            .optimization(Optimization::Retail);

        let targets = decl.expand();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].optimization(), Optimization::Debug);
        assert_eq!(targets[1].optimization(), Optimization::Release);
        assert_eq!(targets[2].optimization(), Optimization::Retail);
    }

    #[test]
    fn test_expansion_dedups_by_value() {
        let decl = TargetDecl::new()
            .platform(Platform::Linux64)
            .toolchain(Toolchain::Gcc)
            .optimization(Optimization::Debug)
            .optimization(Optimization::Debug);

        assert_eq!(decl.expand().len(), 1);
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let decl = TargetDecl::new()
            .platform(Platform::Win64)
            .platform(Platform::Linux64)
            .toolchain(Toolchain::Clang)
            .toolchain(Toolchain::Gcc)
            .optimization(Optimization::Release);

        assert_eq!(decl.expand(), decl.expand());
        // Declaration order, platform-major.
        let targets = decl.expand();
        assert_eq!(targets[0].platform(), Platform::Win64);
        assert_eq!(targets[0].toolchain(), Toolchain::Clang);
        assert_eq!(targets[1].toolchain(), Toolchain::Gcc);
        assert_eq!(targets[2].platform(), Platform::Linux64);
    }

    #[test]
    fn test_decl_as_filter() {
        let filter = TargetDecl::new().platform(Platform::Win64);
        let win = Target::new(Platform::Win64, Toolchain::Msvc2019, Optimization::Debug);
        let linux = Target::new(Platform::Linux64, Toolchain::Gcc, Optimization::Debug);

        assert!(filter.matches(win));
        assert!(!filter.matches(linux));
        assert!(TargetDecl::new().matches(linux));
    }

    #[test]
    fn test_space_subset() {
        let big = TargetSpace::from_decl(
            &TargetDecl::new()
                .platform(Platform::Win64)
                .toolchain(Toolchain::Msvc2019)
                .optimization(Optimization::Debug)
                .optimization(Optimization::Release),
        );
        let small = TargetSpace::from_decl(
            &TargetDecl::new()
                .platform(Platform::Win64)
                .toolchain(Toolchain::Msvc2019)
                .optimization(Optimization::Debug),
        );

        assert!(small.is_subset_of(&big));
        assert!(!big.is_subset_of(&small));
    }

    #[test]
    fn test_display_form() {
        let t = Target::new(Platform::Win64, Toolchain::Msvc2019, Optimization::Retail);
        assert_eq!(t.to_string(), "win64-msvc2019-retail");
    }
}
