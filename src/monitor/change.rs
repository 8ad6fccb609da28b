//! Sensor membership change detection.

use std::collections::BTreeSet;

/// Names that joined and left the sensor table between two cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    /// Names present now but not before, in document order.
    pub added: Vec<String>,
    /// Names present before but not now, in lexical order.
    pub removed: Vec<String>,
}

impl MembershipDiff {
    /// Returns true if membership did not change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Computes the true set difference between `previous` and `current`.
///
/// `current` is taken in document order so additions are reported in the
/// order the controller lists them. Set sizes play no part: a same-size
/// swap of names is reported as one removal and one addition.
///
/// # Example
///
/// ```
/// use ohs_monitor::monitor::diff;
/// use std::collections::BTreeSet;
///
/// let previous: BTreeSet<String> = ["A", "B"].map(String::from).into();
/// let changes = diff(&previous, &["B", "C"]);
///
/// assert_eq!(changes.added, vec!["C"]);
/// assert_eq!(changes.removed, vec!["A"]);
/// ```
#[must_use]
pub fn diff(previous: &BTreeSet<String>, current: &[&str]) -> MembershipDiff {
    let current_set: BTreeSet<&str> = current.iter().copied().collect();

    let mut added: Vec<String> = Vec::new();
    for name in current {
        if !previous.contains(*name) && !added.iter().any(|a| a == name) {
            added.push((*name).to_string());
        }
    }

    let removed = previous
        .iter()
        .filter(|name| !current_set.contains(name.as_str()))
        .cloned()
        .collect();

    MembershipDiff { added, removed }
}

/// The set of sensor names known as of the last successful cycle.
///
/// Only ever replaced wholesale through [`SeenSet::replace`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    names: BTreeSet<String>,
}

impl SeenSet {
    /// Creates an empty set; nothing is known before the first poll.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Diffs `current` against the stored names, then replaces them with `current`.
    pub fn replace(&mut self, current: &[&str]) -> MembershipDiff {
        let changes = diff(&self.names, current);
        self.names = current.iter().map(|name| (*name).to_string()).collect();
        changes
    }

    /// Returns true if `name` is known.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns the number of known sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no sensor is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over the known names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
