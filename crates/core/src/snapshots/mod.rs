//! Asset snapshot module.
//!
//! - [`model`] - Queries, windows, snapshots and skip reasons
//! - [`normalize`] - Pure fallback, filtering and rounding rules
//! - [`settings`] - Lookbacks and window resolution
//! - [`builder`] - Per-ticker acquisition and the lazy batch stream
//! - [`sink`] - Sink and identifier source traits
//! - [`service`] - Run orchestration
//!
//! ```text
//! IdentifierSource → SnapshotService → SnapshotBuilder → MarketDataProvider
//!                          ↓
//!                     SnapshotSink (SQLite / hosted database)
//! ```

pub mod builder;
pub mod model;
pub mod normalize;
pub mod service;
pub mod settings;
pub mod sink;


pub use builder::SnapshotBuilder;
pub use model::{
    parse_iso_date, AssetQuery, AssetSnapshot, DividendPoint, PricePoint, SkipReason,
    SnapshotOutcome, SnapshotWindow,
};
pub use service::{RunReport, SnapshotService};
pub use settings::{SnapshotBounds, SnapshotSettings};
pub use sink::{clean_identifiers, resolve_identifiers, IdentifierSource, SnapshotSink};
