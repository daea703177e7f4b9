use super::capacity::{parse_capacity, CapacityError};
use super::predicate::{Column, Predicate, PredicateSet};
use std::collections::BTreeMap;
use thiserror::Error;

/// Raw filter input: recognized field name -> client-supplied value.
pub type FilterCriteria = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("invalid value for filter field `{field}`: {source}")]
    InvalidFilterValue {
        field: &'static str,
        #[source]
        source: CapacityError,
    },
}

#[derive(Debug, Clone, Copy)]
enum FieldRule {
    Contains(Column),
    TotalCapacityAtMost(Column),
}

/// Recognized filter fields and how each compiles. The table order is the
/// order predicates are emitted in.
const FIELD_RULES: &[(&str, FieldRule)] = &[
    ("ram", FieldRule::Contains(Column::Ram)),
    ("hdd", FieldRule::Contains(Column::Hdd)),
    ("location", FieldRule::Contains(Column::Location)),
    ("storage", FieldRule::TotalCapacityAtMost(Column::Hdd)),
];

/// Field names accepted by `build_predicates`.
pub fn recognized_fields() -> impl Iterator<Item = &'static str> {
    FIELD_RULES.iter().map(|(name, _)| *name)
}

/// Compiles filter criteria into an ordered predicate set.
///
/// Unknown keys and empty values are skipped. Only `storage` can fail, since it is
/// the only field whose value is parsed.
pub fn build_predicates(criteria: &FilterCriteria) -> Result<PredicateSet, FilterError> {
    let mut predicates = PredicateSet::new();

    for (field, rule) in FIELD_RULES {
        let value = match criteria.get(*field) {
            Some(v) if !v.trim().is_empty() => v,
            _ => continue,
        };

        let predicate = match *rule {
            FieldRule::Contains(column) => Predicate::contains(column, value.as_str()),
            FieldRule::TotalCapacityAtMost(column) => {
                let capacity_gb = parse_capacity(value).map_err(|source| {
                    FilterError::InvalidFilterValue {
                        field: *field,
                        source,
                    }
                })?;
                Predicate::total_capacity_at_most(column, capacity_gb)
            }
        };
        predicates.push(predicate);
    }

    Ok(predicates)
}
