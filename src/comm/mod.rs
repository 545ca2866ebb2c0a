//! Communication between mesh partitions.
//!
//! - [`NodeCommMap`]: which global nodes are shared with which neighbour,
//!   and which partition owns them
//! - [`HaloExchange`]: crossbeam channels between partition workers with
//!   nodal partial sums and global reductions
//! - [`PartitionWorker`]: advances a CG system on one partition thread

mod halo;
mod node_comm;
mod worker;

pub use halo::{DEFAULT_TIMEOUT, HaloExchange, HaloPayload};
pub use node_comm::NodeCommMap;
pub use worker::{PartitionOutcome, PartitionWorker, run_partitioned};
