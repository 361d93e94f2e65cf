//! # cadence-core
//!
//! Core library for cadence - a personal coding-time tracker.
//!
//! This library provides:
//! - Domain types for subjects, duration series, targets, and checkpoints
//! - Period boundary resolution and duration aggregation
//! - The incremental streak engine with persisted checkpoint compression
//! - Fixed-window statistics rollups
//! - A SQLite-backed checkpoint store
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! The engine is a pure reader over immutable snapshots. External
//! collaborators (import pipelines, UIs) sit behind the traits in [`store`]:
//! a series source hands the engine a fresh snapshot per call, a target
//! source supplies the user-editable qualification rules, and a checkpoint
//! store persists streak resume points so history is never rescanned.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cadence_core::metrics::{local_today, MetricsTracker};
//! use cadence_core::store::{MemorySeriesSource, SqliteCheckpointStore};
//! use cadence_core::{Config, PeriodKind, Subject};
//!
//! let config = Config::load().expect("failed to load config");
//! let checkpoints =
//!     SqliteCheckpointStore::open(&Config::database_path()).expect("failed to open store");
//! let series = MemorySeriesSource::new(); // filled by an import pipeline
//!
//! let tracker = MetricsTracker::new(&series, &config, &checkpoints);
//! let streak = tracker
//!     .current_streak(&Subject::Aggregate, PeriodKind::Day, local_today())
//!     .expect("failed to compute streak");
//! println!("{} day(s)", streak.count);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use metrics::{MetricsTracker, Rollup, StreakStatus};
pub use store::{CheckpointStore, SeriesSource, SqliteCheckpointStore, TargetSource};
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod store;
pub mod types;
