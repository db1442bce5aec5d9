//! Pipeline Module
//!
//! Batches of commands sent to the store in one round trip.
//!
//! ## Lifecycle
//! ```text
//!   Open ──push()──► Open ──execute()──► (Executing) ──► Closed
//! ```
//! A batch is open while it is borrowed from its client. `execute` takes
//! the batch by value, so nothing can be queued once execution starts and a
//! batch can run only once.
//!
//! ## Modes
//! - Atomic: the store applies every command or none; any failure aborts
//!   the batch with the offending command's index
//! - Non-atomic: commands run independently in order; a failure is an
//!   error entry at its position unless raise-on-error is requested

mod batch;

pub use batch::{Batch, BatchResults, Pending};
