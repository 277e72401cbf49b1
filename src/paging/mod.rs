pub mod frame;
pub mod nru;
pub mod ownership;
pub mod ticker;

pub use frame::{Frame, FrameTable, FrameTableApi, FrameTableCtx};
pub use nru::{NruClass, NruPolicy, ReplacementPolicy, Victim};
pub use ownership::OwnershipTracker;
pub use ticker::ClockTicker;
