//! Scheduler projection.
//!
//! Read and write: `timing`, `day`, `task`, `time`.

use super::{required, PayloadReader, ValidationErrors, WriteMode};
use crate::model::scheduler::{
    format_time, parse_time, validate_timing_rule, Day, NewScheduler, Scheduler, Timing,
};
use crate::model::task::TaskId;
use chrono::NaiveTime;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerView {
    pub timing: Timing,
    pub day: Option<Day>,
    pub task: TaskId,
    /// `HH:MM:SS`.
    pub time: String,
}

impl SchedulerView {
    pub fn project(scheduler: &Scheduler) -> Self {
        Self {
            timing: scheduler.timing,
            day: scheduler.day,
            task: scheduler.task_id,
            time: format_time(scheduler.time),
        }
    }
}

pub fn read_scheduler_create(payload: &Value) -> Result<NewScheduler, ValidationErrors> {
    let mut reader = PayloadReader::new(payload, WriteMode::Create)?;
    let timing = read_timing(&mut reader);
    let day = read_day(&mut reader);
    let task_id = reader.primary_key("task", true);
    let time = read_time(&mut reader);
    if let Some(timing) = timing {
        if !reader.rejected("day") {
            reader.check(validate_timing_rule(timing, day.flatten()));
        }
    }
    reader.finish()?;

    Ok(NewScheduler {
        timing: required("timing", timing)?,
        day: day.flatten(),
        time: required("time", time)?,
        task_id: required("task", task_id)?,
    })
}

pub fn read_scheduler_update(
    payload: &Value,
    mode: WriteMode,
    existing: &Scheduler,
) -> Result<Scheduler, ValidationErrors> {
    let mut reader = PayloadReader::new(payload, mode)?;
    let mut scheduler = existing.clone();
    if let Some(timing) = read_timing(&mut reader) {
        scheduler.timing = timing;
    }
    if let Some(day) = read_day(&mut reader) {
        scheduler.day = day;
    }
    if let Some(task_id) = reader.primary_key("task", true) {
        scheduler.task_id = task_id;
    }
    if let Some(time) = read_time(&mut reader) {
        scheduler.time = time;
    }
    if !reader.rejected("day") {
        reader.check(validate_timing_rule(scheduler.timing, scheduler.day));
    }
    reader.finish()?;
    Ok(scheduler)
}

fn read_timing(reader: &mut PayloadReader<'_>) -> Option<Timing> {
    let value = reader.text("timing", true)?;
    let timing = Timing::parse(&value);
    if timing.is_none() {
        reader.reject("timing", format!("\"{value}\" is not a valid choice."));
    }
    timing
}

/// `Some(None)` when the payload clears the day explicitly.
fn read_day(reader: &mut PayloadReader<'_>) -> Option<Option<Day>> {
    match reader.nullable_text("day", false)? {
        None => Some(None),
        Some(value) => match Day::parse(&value) {
            Some(day) => Some(Some(day)),
            None => {
                reader.reject("day", format!("\"{value}\" is not a valid choice."));
                None
            }
        },
    }
}

fn read_time(reader: &mut PayloadReader<'_>) -> Option<NaiveTime> {
    let value = reader.text("time", true)?;
    let time = parse_time(&value);
    if time.is_none() {
        reader.reject(
            "time",
            "Time has wrong format. Use one of these formats instead: hh:mm[:ss[.uuuuuu]].",
        );
    }
    time
}
