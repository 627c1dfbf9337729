//! IR optimization passes for the Silica HDL midend.
//!
//! The flagship pass promotes simple signals — storage cells whose usage
//! is provably equivalent to a single SSA value — to direct values,
//! removing probes and drives and preserving delayed-write semantics
//! through explicit delay wrappers.
//!
//! # Usage
//!
//! ```ignore
//! use silica_opt::{run_passes, TraceSink};
//! let trace = TraceSink::new();
//! let changed = run_passes(&mut design, &interner, &trace);
//! ```

#![warn(missing_docs)]

pub mod pass;
pub mod promote;
pub mod trace;

pub use pass::{run_passes, OptPass};
pub use promote::{PromotePass, SkipReason};
pub use trace::TraceSink;
