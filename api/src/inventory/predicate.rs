//! Compiled filter predicates consumed by a `QueryExecutor`

use super::capacity::descriptor_total_gb;
use crate::database::servers::ServerListing;

/// Listing columns a predicate may reference. Closed set: nothing derived
/// from client-supplied key names ever becomes a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Ram,
    Hdd,
    Location,
}

impl Column {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Column::Ram => "ram",
            Column::Hdd => "hdd",
            Column::Location => "location",
        }
    }

    pub fn value<'a>(&self, listing: &'a ServerListing) -> &'a str {
        match self {
            Column::Ram => &listing.ram,
            Column::Hdd => &listing.hdd,
            Column::Location => &listing.location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Case-insensitive substring match. Only ASCII letters are folded, as with
    /// SQLite's `LOWER`: `münchen` does not match `MÜNCHEN`.
    Contains,
    /// Total capacity of the column's disk descriptor is at most the operand
    TotalCapacityAtMost,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    CapacityGb(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: Column,
    pub operator: Operator,
    pub operand: Operand,
}

impl Predicate {
    pub fn contains(column: Column, text: impl Into<String>) -> Self {
        Self {
            column,
            operator: Operator::Contains,
            operand: Operand::Text(text.into()),
        }
    }

    pub fn total_capacity_at_most(column: Column, capacity_gb: f64) -> Self {
        Self {
            column,
            operator: Operator::TotalCapacityAtMost,
            operand: Operand::CapacityGb(capacity_gb),
        }
    }

    /// Evaluates the predicate against a single listing.
    ///
    /// Text matching folds ASCII case only, which is what SQLite's `LOWER` does,
    /// so in-memory and SQL evaluation agree.
    pub fn matches(&self, listing: &ServerListing) -> bool {
        let value = self.column.value(listing);
        match (&self.operator, &self.operand) {
            (Operator::Contains, Operand::Text(needle)) => value
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase()),
            (Operator::TotalCapacityAtMost, Operand::CapacityGb(target)) => {
                descriptor_total_gb(value) <= *target
            }
            // Constructors never pair these; treat as non-matching.
            _ => false,
        }
    }

    /// Whether the predicate can be pushed into SQL as-is.
    pub fn is_text_match(&self) -> bool {
        matches!(
            (&self.operator, &self.operand),
            (Operator::Contains, Operand::Text(_))
        )
    }
}

/// Ordered, ANDed set of predicates. Order follows the builder's field table,
/// so identical criteria always compile to identical sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, listing: &ServerListing) -> bool {
        self.predicates.iter().all(|p| p.matches(listing))
    }
}

impl<'a> IntoIterator for &'a PredicateSet {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates.iter()
    }
}
