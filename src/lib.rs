pub mod coordinator;
pub mod error;
pub mod logging;
pub mod paging;
pub mod shared;
pub mod sync;
pub mod txn;

pub use coordinator::{Coordinator, SimulationReport};
pub use error::{Error, Result};
pub use shared::SimConfig;
