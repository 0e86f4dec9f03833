#![forbid(unsafe_code)]

//! Typed filter and sort vocabulary.
//!
//! Mirrors the operator set of Mango-style document selectors, evaluated
//! in process against [`StorageItem`] fields. A [`FilterConfig`] is a
//! flat chain of column comparisons joined left to right by and/or, the
//! shape a filter bar naturally produces.

use std::cmp::Ordering;

use crate::item::{Field, StorageItem};

/// Comparison applied by a single [`FilterSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    NotEq,
    GreaterThan,
    GreaterThanOrEq,
    LessThan,
    LessThanOrEq,
    Contains,
    ContainsIgnoreCase,
    StartsWith,
}

/// One column comparison.
///
/// The substring operators (`Contains`, `ContainsIgnoreCase`,
/// `StartsWith`) only match when both the field and the filter value are
/// text; they treat the value as a literal, never as a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub column: String,
    pub op: FilterOp,
    pub value: Field,
}

impl FilterSpec {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<Field>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn matches<T: StorageItem>(&self, item: &T) -> bool {
        let field = item.field(&self.column);
        match self.op {
            FilterOp::Eq => field == self.value,
            FilterOp::NotEq => field != self.value,
            FilterOp::GreaterThan => field.compare(&self.value) == Ordering::Greater,
            FilterOp::GreaterThanOrEq => field.compare(&self.value) != Ordering::Less,
            FilterOp::LessThan => field.compare(&self.value) == Ordering::Less,
            FilterOp::LessThanOrEq => field.compare(&self.value) != Ordering::Greater,
            FilterOp::Contains => self.text_pair(&field).is_some_and(|(h, n)| h.contains(n)),
            FilterOp::ContainsIgnoreCase => self
                .text_pair(&field)
                .is_some_and(|(h, n)| h.to_lowercase().contains(&n.to_lowercase())),
            FilterOp::StartsWith => self.text_pair(&field).is_some_and(|(h, n)| h.starts_with(n)),
        }
    }

    fn text_pair<'a>(&'a self, field: &'a Field) -> Option<(&'a str, &'a str)> {
        Some((field.as_text()?, self.value.as_text()?))
    }
}

/// How two adjacent entries of a [`FilterConfig`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterJoin {
    And,
    Or,
}

/// A chain of specs joined left to right, so `a AND b OR c` evaluates as
/// `(a AND b) OR c`. An empty config matches everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterConfig {
    specs: Vec<FilterSpec>,
    joins: Vec<FilterJoin>,
}

impl FilterConfig {
    #[must_use]
    pub fn new(first: FilterSpec) -> Self {
        Self {
            specs: vec![first],
            joins: Vec::new(),
        }
    }

    #[must_use]
    pub fn and(mut self, spec: FilterSpec) -> Self {
        self.joins.push(FilterJoin::And);
        self.specs.push(spec);
        self
    }

    #[must_use]
    pub fn or(mut self, spec: FilterSpec) -> Self {
        self.joins.push(FilterJoin::Or);
        self.specs.push(spec);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    #[must_use]
    pub fn matches<T: StorageItem>(&self, item: &T) -> bool {
        let Some(first) = self.specs.first() else {
            return true;
        };
        let mut result = first.matches(item);
        for (join, spec) in self.joins.iter().zip(&self.specs[1..]) {
            result = match join {
                FilterJoin::And => result && spec.matches(item),
                FilterJoin::Or => result || spec.matches(item),
            };
        }
        result
    }
}

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Orders two items by this key alone.
    #[must_use]
    pub fn compare<T: StorageItem>(&self, a: &T, b: &T) -> Ordering {
        let ord = a.field(&self.column).compare(&b.field(&self.column));
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}
