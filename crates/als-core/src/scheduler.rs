//! Cron scheduler for the report run.
//!
//! - Standard 5-field cron syntax (min hour dom mon dow), local time
//! - Optional immediate run at startup
//! - Runs execute one at a time inside a single loop, so they never overlap
//! - Stops on cancellation; a run in progress is allowed to finish

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Datelike, Local, Timelike};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{pipeline::DigestRun, Error, Result};

/// Twice daily, 09:00 and 21:00.
pub const DEFAULT_REPORT_CRON: &str = "0 9,21 * * *";

pub struct ReportScheduler {
    expr: CronExpr,
    run: Arc<DigestRun>,
    run_on_startup: bool,
}

impl ReportScheduler {
    pub fn new(cron: &str, run: Arc<DigestRun>, run_on_startup: bool) -> Result<Self> {
        let expr = CronExpr::parse(cron)
            .map_err(|e| Error::Config(format!("invalid REPORT_CRON {cron:?}: {e}")))?;
        Ok(Self {
            expr,
            run,
            run_on_startup,
        })
    }

    pub fn next_run_after(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        self.expr.next_after(now)
    }

    pub async fn run_until_cancelled(&self, cancel: CancellationToken) {
        if self.run_on_startup && !cancel.is_cancelled() {
            self.run.run_once().await;
        }

        loop {
            let now = Local::now();
            let Some(next) = self.expr.next_after(now) else {
                warn!("schedule has no next run (stopping)");
                break;
            };
            info!(next = %next.format("%Y-%m-%d %H:%M"), "next report scheduled");

            let dur = (next - now).to_std().unwrap_or(Duration::from_secs(0));

            tokio::select! {
              _ = cancel.cancelled() => break,
              _ = sleep(dur) => {
                self.run.run_once().await;
              }
            }
        }

        info!("scheduler stopped");
    }
}

// === Cron expression engine ===

#[derive(Clone, Debug)]
struct CronExpr {
    minute: Field,
    hour: Field,
    day_of_month: Field,
    month: Field,
    day_of_week: Field,
}

/// Allowed values of one cron field as a bitmask (bit n = value n).
#[derive(Clone, Copy, Debug)]
struct Field {
    bits: u64,
    /// `*` or a list covering the whole range.
    any: bool,
}

impl CronExpr {
    fn parse(expr: &str) -> Result<Self> {
        let parts: Vec<&str> = expr.split_whitespace().collect();
        let [minute, hour, dom, month, dow] = parts.as_slice() else {
            return Err(Error::Config(format!(
                "expected 5 fields, got {}",
                parts.len()
            )));
        };

        Ok(Self {
            minute: Field::parse(minute, 0, 59)?,
            hour: Field::parse(hour, 0, 23)?,
            day_of_month: Field::parse(dom, 1, 31)?,
            month: Field::parse(month, 1, 12)?,
            day_of_week: Field::parse(dow, 0, 7)?.fold_sunday_alias(),
        })
    }

    fn matches(&self, dt: DateTime<Local>) -> bool {
        if !self.minute.contains(dt.minute())
            || !self.hour.contains(dt.hour())
            || !self.month.contains(dt.month())
        {
            return false;
        }

        // Standard cron semantics: if both DOM and DOW are restricted, match when EITHER matches.
        let dom = self.day_of_month.contains(dt.day());
        let dow = self
            .day_of_week
            .contains(dt.weekday().num_days_from_sunday());
        match (self.day_of_month.any, self.day_of_week.any) {
            (true, true) => true,
            (true, false) => dow,
            (false, true) => dom,
            (false, false) => dom || dow,
        }
    }

    fn next_after(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let mut t = (now + chrono::Duration::minutes(1))
            .with_second(0)?
            .with_nanosecond(0)?;

        // One year of minutes bounds impossible expressions (e.g. Feb 31).
        for _ in 0..366 * 24 * 60 {
            if self.matches(t) {
                return Some(t);
            }
            t += chrono::Duration::minutes(1);
        }
        None
    }
}

impl Field {
    fn parse(raw: &str, min: u32, max: u32) -> Result<Self> {
        let mut bits = 0u64;
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (range, step) = match part.split_once('/') {
                Some((r, s)) => {
                    let step = parse_u32(s)?;
                    if step == 0 {
                        return Err(Error::Config("step must be > 0".to_string()));
                    }
                    (r, step)
                }
                None => (part, 1),
            };

            let (start, end) = match range {
                "*" => (min, max),
                r => match r.split_once('-') {
                    Some((a, b)) => (parse_u32(a)?, parse_u32(b)?),
                    // `5/15` means "from 5 every 15".
                    None if part.contains('/') => (parse_u32(r)?, max),
                    None => {
                        let v = parse_u32(r)?;
                        (v, v)
                    }
                },
            };

            if start < min || end > max || start > end {
                return Err(Error::Config(format!(
                    "value out of range {min}-{max}: {part}"
                )));
            }
            for v in (start..=end).step_by(step as usize) {
                bits |= 1u64 << v;
            }
        }

        if bits == 0 {
            return Err(Error::Config(format!("empty cron field: {raw:?}")));
        }

        let full = (min..=max).fold(0u64, |acc, v| acc | (1u64 << v));
        Ok(Self {
            bits,
            any: bits == full,
        })
    }

    /// Day-of-week 7 is an alias for Sunday (0).
    fn fold_sunday_alias(self) -> Self {
        const WEEK: u64 = 0b111_1111;
        let mut bits = self.bits;
        if bits & (1u64 << 7) != 0 {
            bits = (bits & !(1u64 << 7)) | 1;
        }
        Self {
            bits,
            any: bits == WEEK,
        }
    }

    fn contains(&self, v: u32) -> bool {
        v < 64 && self.bits & (1u64 << v) != 0
    }
}

fn parse_u32(s: &str) -> Result<u32> {
    s.trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid number: {s}")))
}

// === Tests ===
