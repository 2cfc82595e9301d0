use std::panic::{self, AssertUnwindSafe};

use scraper::Html;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::export;
use crate::grades::{
    self,
    models::{GradeSummary, GradeTable, GwaResult},
};
use crate::html;
use crate::timetable::{self, models::ScheduleSummary, time::Anchor};

/// Requests the extension surfaces send to the page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum Action {
    #[serde(rename = "extractSchedule")]
    ExtractSchedule,
    #[serde(rename = "extractScheduleForSchedinator")]
    ExtractScheduleForSchedinator,
    #[serde(rename = "calculateGWA")]
    CalculateGwa,
}

/// Typed result of an action
#[derive(Debug)]
pub enum Outcome {
    Csv(String),
    Schedule(ScheduleSummary),
    Gwa {
        result: GwaResult,
        /// Grade table with the new summary row
        table: GradeTable,
    },
}

/// What goes back to the caller: data or a readable error
#[derive(Debug)]
pub enum Response {
    Completed(serde_json::Value),
    Failed(String),
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Completed<'a> {
            status: &'static str,
            data: &'a serde_json::Value,
        }
        #[derive(Serialize)]
        struct Failed<'a> {
            error: &'a str,
        }

        match self {
            Self::Completed(data) => Completed {
                status: "completed",
                data,
            }
            .serialize(serializer),
            Self::Failed(error) => Failed {
                error: error.as_str(),
            }
            .serialize(serializer),
        }
    }
}

impl Outcome {
    fn data(&self) -> Result<serde_json::Value> {
        let value = match self {
            Self::Csv(csv) => serde_json::to_value(csv.lines().collect::<Vec<_>>())?,
            Self::Schedule(summary) => serde_json::to_value(summary.payload())?,
            Self::Gwa { result, .. } => serde_json::to_value(GradeSummary::from(result))?,
        };
        Ok(value)
    }
}

impl From<Result<Outcome>> for Response {
    fn from(outcome: Result<Outcome>) -> Self {
        match outcome.and_then(|o| o.data()) {
            Ok(data) => Self::Completed(data),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown failure".to_owned()
    }
}

/// Run `f`, turning a panic into `Error::Unexpected`
pub fn guard<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(%message, "Extraction failed");
            Err(Error::Unexpected(message))
        }
    }
}

/// Run an action against a parsed page
pub fn run(action: Action, document: &Html, anchor: &Anchor, config: &Config) -> Result<Outcome> {
    info!(?action, "Running action");
    guard(|| match action {
        Action::ExtractSchedule => {
            let table = html::schedule_table(document, config)?;
            Ok(Outcome::Csv(export::to_csv(&table)?))
        }
        Action::ExtractScheduleForSchedinator => {
            let table = html::schedule_table(document, config)?;
            Ok(Outcome::Schedule(timetable::extract_schedule(
                &table, anchor, config,
            )?))
        }
        Action::CalculateGwa => {
            let mut table = html::grade_table(document, config)?;
            let result = grades::calculate_gwa(&mut table)?;
            Ok(Outcome::Gwa { result, table })
        }
    })
}

/// Answer a `{"action": ...}` message
///
/// The action names are the page listener's, but every action replies in
/// the same envelope: `{"status": "completed", "data": ...}` or
/// `{"error": ...}` carrying the `Error` message. There is no per-action
/// shape such as a flat `{midtermGWA, finalGWA}` or a `scheduleData` key.
pub fn dispatch(message: &str, document: &Html, anchor: &Anchor, config: &Config) -> Response {
    let outcome = serde_json::from_str::<Action>(message)
        .map_err(Error::from)
        .and_then(|action| run(action, document, anchor, config));

    Response::from(outcome)
}
