//! Helpers for parsing composite structures: child cardinality checks and
//! the unknown-child policy.

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::{Result, TlvError};
use crate::tag::Tag;

/// Counts child types seen while walking a composite.
#[derive(Debug, Default)]
pub struct ChildCounter {
    parent: u32,
    counts: BTreeMap<u32, usize>,
}

impl ChildCounter {
    /// Counter for the composite of type `parent`.
    pub fn new(parent: u32) -> Self {
        Self {
            parent,
            counts: BTreeMap::new(),
        }
    }

    /// Record one child of type `child`.
    pub fn add(&mut self, child: u32) {
        *self.counts.entry(child).or_insert(0) += 1;
    }

    /// Number of children of type `child`.
    pub fn count(&self, child: u32) -> usize {
        self.counts.get(&child).copied().unwrap_or(0)
    }

    /// `child` must appear exactly once.
    pub fn exactly_one(&self, child: u32) -> Result<()> {
        self.check(child, "exactly once", |n| n == 1)
    }

    /// `child` may appear at most once.
    pub fn at_most_one(&self, child: u32) -> Result<()> {
        self.check(child, "at most once", |n| n <= 1)
    }

    /// `child` must appear at least once.
    pub fn at_least_one(&self, child: u32) -> Result<()> {
        self.check(child, "at least once", |n| n >= 1)
    }

    /// `child` must appear exactly once; returns its parsed value.
    pub fn required<T>(&self, child: u32, value: Option<T>) -> Result<T> {
        self.exactly_one(child)?;
        value.ok_or(TlvError::Cardinality {
            parent: self.parent,
            child,
            rule: "exactly once",
            count: 0,
        })
    }

    /// `child` may appear at most once; returns its parsed value if present.
    pub fn optional<T>(&self, child: u32, value: Option<T>) -> Result<Option<T>> {
        self.at_most_one(child)?;
        Ok(value)
    }

    fn check(&self, child: u32, rule: &'static str, ok: impl Fn(usize) -> bool) -> Result<()> {
        let count = self.count(child);
        if ok(count) {
            Ok(())
        } else {
            Err(TlvError::Cardinality {
                parent: self.parent,
                child,
                rule,
                count,
            })
        }
    }
}

/// Accept an unrecognised child only if it is marked non-critical.
pub fn unknown_child(parent: u32, child: &Tag) -> Result<()> {
    if !child.non_critical() {
        return Err(TlvError::UnknownCriticalTag {
            parent,
            tag_type: child.tag_type(),
        });
    }
    debug!(parent, tag_type = child.tag_type(), "Skipping unknown non-critical tag");
    Ok(())
}
