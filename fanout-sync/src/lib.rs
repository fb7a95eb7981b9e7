//! # fanout-sync
//!
//! Pushes local files to the same directory on a set of remote hosts.
//!
//! Call [`resolve::plan`] to expand source patterns and scope the targets,
//! then [`pipeline::run`] with an [`Operator`] to drive the conflict check,
//! the confirmation gates and the copies. [`audit::append_at`] writes the
//! resulting records to a log file.

pub mod audit;
pub mod conflict;
pub mod copy;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod resolve;
pub mod share;

pub use conflict::{ConflictState, TargetCheck};
pub use error::SyncError;
pub use pipeline::{run, Halt, Operator, PromptStage, SyncEvent, SyncOptions, SyncReport};
pub use resolve::{plan, Plan};
pub use share::ShareLayout;
