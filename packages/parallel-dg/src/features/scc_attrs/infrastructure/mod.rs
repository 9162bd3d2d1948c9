//! Classifier infrastructure: pattern matchers, attribute storage, oracle adapters

pub mod dag_attrs;
pub mod iteration_domain;
pub mod patterns;

pub use dag_attrs::SccDagAttrs;
pub use iteration_domain::{DisjointAccesses, NoIterationDomain};
