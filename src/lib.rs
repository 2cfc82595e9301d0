//! Extraction of class schedules and grade tables from the FEU Tech student
//! portal, with CSV export, a JSON payload for the schedule viewer, and GWA
//! computation.

pub mod actions;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod grades;
pub mod html;
pub mod sanitize;
pub mod timetable;
pub mod utils;

pub use actions::{dispatch, run, Action, Outcome, Response};
pub use config::Config;
pub use error::{Error, Result};
pub use timetable::time::Anchor;
