pub use crate::builder::{DEFAULT_CAPACITY, Engine, EngineBuilder, Policy};
pub use crate::ds::{Chain, LinkedSlots, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::event::{Event, EventKind, Position, Promotion, Trace};
pub use crate::policy::lfu::LfuEngine;
pub use crate::policy::lru::LruEngine;
pub use crate::sim::{Op, Simulator, Step, parse_script};
pub use crate::snapshot::{FrequencyGroup, LfuSnapshot, LruSnapshot, Snapshot};
pub use crate::stats::TraceStats;
pub use crate::traits::CacheEngine;
