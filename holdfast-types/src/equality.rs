//! Structural equality for persisted records.
//!
//! Records describe their meaningful fields once, in
//! [`StructuralEq::compare_fields`], by feeding pairs of values into a
//! [`Comparison`]. The same description then serves two purposes:
//!
//! - [`StructuralEq::check_equal`] stops at the first mismatch and returns a
//!   bool (used to short-circuit redundant writes and in round-trip checks);
//! - [`StructuralEq::diff`] walks every field and returns the full list of
//!   [`FieldDiff`]s (used by drift verification).

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// One field that differs between two records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    /// Dotted path to the field, with `[i]` for sequence elements.
    pub field: String,
    /// Value on the left-hand (receiver) side.
    pub left: String,
    /// Value on the right-hand (argument) side.
    pub right: String,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} != {}", self.field, self.left, self.right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    FirstMismatch,
    Exhaustive,
}

/// Accumulates field mismatches while a record describes itself.
#[derive(Debug)]
pub struct Comparison {
    mode: Mode,
    path: Vec<String>,
    diffs: Vec<FieldDiff>,
}

impl Comparison {
    /// A comparison that records only the first mismatch and ignores the rest.
    pub fn first_mismatch() -> Self {
        Self {
            mode: Mode::FirstMismatch,
            path: Vec::new(),
            diffs: Vec::new(),
        }
    }

    /// A comparison that records every mismatch.
    pub fn exhaustive() -> Self {
        Self {
            mode: Mode::Exhaustive,
            path: Vec::new(),
            diffs: Vec::new(),
        }
    }

    /// Returns true once no further fields need to be looked at.
    pub fn is_settled(&self) -> bool {
        self.mode == Mode::FirstMismatch && !self.diffs.is_empty()
    }

    /// Returns true if no mismatch has been recorded.
    pub fn is_equal(&self) -> bool {
        self.diffs.is_empty()
    }

    /// Compares a plain value.
    pub fn field<V>(&mut self, name: &str, left: &V, right: &V) -> &mut Self
    where
        V: PartialEq + fmt::Debug + ?Sized,
    {
        if !self.is_settled() && left != right {
            self.push(name, format!("{left:?}"), format!("{right:?}"));
        }
        self
    }

    /// Compares a nested sub-record field by field.
    pub fn record<R: StructuralEq>(&mut self, name: &str, left: &R, right: &R) -> &mut Self {
        if self.is_settled() {
            return self;
        }
        self.path.push(name.to_string());
        left.compare_fields(right, self);
        self.path.pop();
        self
    }

    /// Compares an optional sub-record. A present/absent mismatch is reported
    /// on the field itself.
    pub fn optional_record<R: StructuralEq>(
        &mut self,
        name: &str,
        left: Option<&R>,
        right: Option<&R>,
    ) -> &mut Self {
        match (left, right) {
            (Some(l), Some(r)) => self.record(name, l, r),
            (None, None) => self,
            (l, r) => {
                if !self.is_settled() {
                    self.push(name, presence(l.is_some()), presence(r.is_some()));
                }
                self
            }
        }
    }

    /// Compares two ordered sequences of sub-records element-wise.
    pub fn sequence<R: StructuralEq>(&mut self, name: &str, left: &[R], right: &[R]) -> &mut Self {
        if self.is_settled() {
            return self;
        }
        if left.len() != right.len() {
            self.push(
                &format!("{name}.len"),
                left.len().to_string(),
                right.len().to_string(),
            );
            return self;
        }
        for (i, (l, r)) in left.iter().zip(right).enumerate() {
            if self.is_settled() {
                break;
            }
            self.path.push(format!("{name}[{i}]"));
            l.compare_fields(r, self);
            self.path.pop();
        }
        self
    }

    /// Compares two ordered sequences of plain values element-wise.
    pub fn values<V>(&mut self, name: &str, left: &[V], right: &[V]) -> &mut Self
    where
        V: PartialEq + fmt::Debug,
    {
        if self.is_settled() {
            return self;
        }
        if left.len() != right.len() {
            self.push(
                &format!("{name}.len"),
                left.len().to_string(),
                right.len().to_string(),
            );
            return self;
        }
        for (i, (l, r)) in left.iter().zip(right).enumerate() {
            if self.is_settled() {
                break;
            }
            if l != r {
                self.push(&format!("{name}[{i}]"), format!("{l:?}"), format!("{r:?}"));
            }
        }
        self
    }

    /// Returns the first recorded mismatch, if any.
    pub fn first(&self) -> Option<&FieldDiff> {
        self.diffs.first()
    }

    /// Consumes the comparison, returning every recorded mismatch.
    pub fn into_diffs(self) -> Vec<FieldDiff> {
        self.diffs
    }

    fn push(&mut self, name: &str, left: String, right: String) {
        let field = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path.join("."), name)
        };
        self.diffs.push(FieldDiff { field, left, right });
    }
}

fn presence(present: bool) -> String {
    if present { "Some(..)" } else { "None" }.to_string()
}

/// Deep field-by-field equality, as opposed to reference identity.
pub trait StructuralEq {
    /// Feeds every semantically meaningful field into `cmp`.
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison);

    /// Returns true if every meaningful field matches. Stops at the first
    /// mismatch and logs it at debug level.
    fn check_equal(&self, other: &Self) -> bool {
        let mut cmp = Comparison::first_mismatch();
        self.compare_fields(other, &mut cmp);
        match cmp.first() {
            Some(diff) => {
                debug!(
                    record = std::any::type_name::<Self>(),
                    field = %diff.field,
                    left = %diff.left,
                    right = %diff.right,
                    "value changed"
                );
                false
            }
            None => true,
        }
    }

    /// Returns every field that differs.
    fn diff(&self, other: &Self) -> Vec<FieldDiff> {
        let mut cmp = Comparison::exhaustive();
        self.compare_fields(other, &mut cmp);
        cmp.into_diffs()
    }
}

/// Compares two ordered sequences pairwise by index.
///
/// Sequences of different length are unequal; otherwise the first index whose
/// elements fail [`StructuralEq::check_equal`] makes them unequal.
pub fn check_equality<T: StructuralEq>(left: &[T], right: &[T]) -> bool {
    if left.len() != right.len() {
        debug!(
            record = std::any::type_name::<T>(),
            left = left.len(),
            right = right.len(),
            "count changed"
        );
        return false;
    }

    for (index, (l, r)) in left.iter().zip(right).enumerate() {
        if !l.check_equal(r) {
            debug!(
                record = std::any::type_name::<T>(),
                index, "value changed at index"
            );
            return false;
        }
    }

    true
}

/// Like [`check_equality`] but returns the index of the first mismatch
/// (`Some(min_len)` when only the lengths differ).
pub fn first_mismatch<T: StructuralEq>(left: &[T], right: &[T]) -> Option<usize> {
    let mismatch = left
        .iter()
        .zip(right)
        .position(|(l, r)| !l.check_equal(r));
    match mismatch {
        Some(i) => Some(i),
        None if left.len() != right.len() => Some(left.len().min(right.len())),
        None => None,
    }
}
