pub mod entity;
pub mod expansion;
pub mod partition;
pub mod portfolio;
pub mod position;
pub mod timeline;

pub use entity::{EntityId, TimelineEntity};
pub use expansion::{ExpansionCache, FetchRequest, RowState, Toggle};
pub use partition::TaskPartition;
pub use portfolio::Portfolio;
pub use position::{position, BarPosition, Tier};
pub use timeline::{TimelineRange, TimelineViewport};
