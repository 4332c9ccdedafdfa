//! Engine: catalog, pools, kernels, dispatch and persistence.

pub mod catalog;
pub mod executor;
pub mod kernels;
pub mod persist;
pub mod plan;
pub mod pools;
pub mod scan;


pub use catalog::Engine;
pub use executor::{Reply, execute};
pub use kernels::{ExtremeKind, VectorKind};
pub use plan::DbOperator;
pub use pools::{ResourceId, ResourcePool, Session, VarPool};
pub use scan::{Clause, CompareKind, Comparator, Junction};
