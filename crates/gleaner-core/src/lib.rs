//! gleaner-core: change model and harvest algorithm for incremental
//! catalog synchronization.
//!
//! This crate provides:
//! - `RawChange`: what the entity sources report: creations,
//!   modifications and tombstones of recordings and collections
//! - `Item`/`normalize`: the wire-ready representation of one change
//! - `Harvester`: the merge and watermark computation behind one harvest
//! - `ChangeSource`: the adapter contract the backing stores implement

pub mod change;
pub mod clock;
pub mod error;
pub mod harvester;
pub mod item;
pub mod source;

pub use change::{Acl, ChangeBody, ChangeKind, CollectionRecord, RawChange, RecordingRecord, Track};
pub use clock::{Clock, SystemClock};
pub use error::{CoreError, Result};
pub use harvester::{DEFAULT_BUFFER_SECS, HarvestResult, Harvester};
pub use item::{DeletedItem, EventItem, Item, SeriesItem, normalize};
pub use source::{ChangeSource, memory::MemorySource};
