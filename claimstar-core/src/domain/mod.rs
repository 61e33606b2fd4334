pub mod audit;
pub mod dimension;
pub mod error;
pub mod gold;
pub mod graph;
pub mod keys;
pub mod raw;
pub mod silver;
pub mod table;

pub use error::DomainError;
