//! Daily trigger computation and the long-running scheduler loop.

use std::thread;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use log::{error, info};

use crate::error::{error_chain, ReportError, Result};

const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Fires once per day at a fixed local wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
}

impl DailySchedule {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    /// Parses `HH:MM` or `HH:MM:SS`.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
            .map(Self::new)
            .ok_or_else(|| {
                ReportError::Config(format!(
                    "schedule time {value:?} is not a valid HH:MM time of day"
                ))
            })
    }

    /// Time of day the schedule fires.
    pub fn at(&self) -> NaiveTime {
        self.at
    }

    /// First trigger strictly after `now`.
    ///
    /// If the wall-clock time is skipped on some day (a DST gap) the trigger
    /// moves forward by an hour; if it occurs twice, the earlier one wins.
    pub fn next_run<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let timezone = now.timezone();
        let mut day = now.date_naive();
        loop {
            if let Some(candidate) = resolve_local(&timezone, day.and_time(self.at)) {
                if candidate > *now {
                    return candidate;
                }
            }
            day = day + Duration::days(1);
        }
    }
}

fn resolve_local<Tz: TimeZone>(timezone: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match timezone.from_local_datetime(&local) {
        LocalResult::Single(instant) => Some(instant),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => timezone
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest(),
    }
}

/// Source of the current time and of blocking waits.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// Blocks the calling thread until `deadline` has passed.
    fn sleep_until(&self, deadline: DateTime<Local>);
}

/// Wall clock backed by the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep_until(&self, deadline: DateTime<Local>) {
        // sleep may return early; loop until the deadline is reached
        while let Ok(remaining) = (deadline - Local::now()).to_std() {
            if remaining.is_zero() {
                break;
            }
            thread::sleep(remaining);
        }
    }
}

/// Runs a job once per day according to a [`DailySchedule`].
///
/// Only one run is ever in flight: the next trigger is computed after the
/// previous run returns, and triggers missed while a run was executing (or
/// while the process was down) are not caught up.
pub struct Scheduler<C = SystemClock> {
    schedule: DailySchedule,
    clock: C,
    started_runs: u64,
}

impl Scheduler<SystemClock> {
    pub fn new(schedule: DailySchedule) -> Self {
        Self::with_clock(schedule, SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn with_clock(schedule: DailySchedule, clock: C) -> Self {
        Self {
            schedule,
            clock,
            started_runs: 0,
        }
    }

    pub fn schedule(&self) -> DailySchedule {
        self.schedule
    }

    /// Number of runs started so far, failed ones included.
    pub fn started_runs(&self) -> u64 {
        self.started_runs
    }

    /// Next instant the job will fire.
    pub fn next_trigger(&self) -> DateTime<Local> {
        self.schedule.next_run(&self.clock.now())
    }

    /// Waits for the next trigger, runs `job` with the trigger's local date,
    /// and returns its result. Failures are logged here.
    pub fn run_next<T, F>(&mut self, job: F) -> Result<T>
    where
        F: FnOnce(NaiveDate) -> Result<T>,
    {
        let trigger = self.next_trigger();
        info!("Next report run scheduled for {}", trigger.format("%Y-%m-%d %H:%M:%S %:z"));
        self.clock.sleep_until(trigger);

        self.started_runs += 1;
        let result = job(trigger.date_naive());
        match &result {
            Ok(_) => info!("Report run #{} finished", self.started_runs),
            Err(err) => error!(
                "Report run #{} failed: {}",
                self.started_runs,
                error_chain(err)
            ),
        }
        result
    }

    /// Runs `job` at every trigger, forever. A failed run is logged and the
    /// loop waits for the following day.
    pub fn run_forever<F>(&mut self, mut job: F) -> !
    where
        F: FnMut(NaiveDate) -> Result<()>,
    {
        info!("Scheduler started; reports run daily at {}", self.schedule.at());
        loop {
            let _ = self.run_next(&mut job);
        }
    }
}
