//! Page controllers and terminal front end for Nano Banana.
//!
//! [`GenerateController`] and [`EditController`] hold the page-level state
//! of the generate and edit flows on top of a
//! [`SlotOrchestrator`](banana_jobs::SlotOrchestrator). The `banana`
//! binary drives them from the command line.

pub mod cli;
pub mod edit;
pub mod error;
pub mod follow;
pub mod generate;
pub mod render;

pub use edit::{EditController, EditInput};
pub use error::PageError;
pub use follow::{follow_slots, FollowEnd};
pub use generate::GenerateController;
