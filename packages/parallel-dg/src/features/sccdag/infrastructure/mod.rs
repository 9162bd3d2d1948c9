//! SCCDAG infrastructure: SCC search and the condensation graph

pub mod scc_finder;
pub mod sccdag;

pub use scc_finder::{strongly_connected_components, ComponentNodes, SccFinder};
pub use sccdag::SccDag;
