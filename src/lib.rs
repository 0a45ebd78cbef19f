pub mod cmp;
pub mod config;
pub mod consistency;
pub mod constraint;
pub mod domain;
pub mod error;
pub mod search;
pub mod solver;
pub mod value_selector;

pub use solver::solve;
