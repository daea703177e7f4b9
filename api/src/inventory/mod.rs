mod builder;
mod capacity;
mod executor;
mod predicate;
mod service;

pub use builder::{build_predicates, FilterCriteria, FilterError};
pub use capacity::{descriptor_total_gb, parse_capacity, CapacityError};
pub use executor::{MemoryExecutor, QueryExecutor, Window};
pub use predicate::{Column, Operand, Operator, Predicate, PredicateSet};
pub use service::{ListingService, ServiceError};
