//! Working-time shading behind the plot.
//!
//! A schedule is written as `d-d,hh:mm-hh:mm` entries separated by `;`, days numbered
//! 1 (Monday) to 7 (Sunday), e.g. `1-5,09:00-18:00;6-6,10:00-14:00`.

use std::str::FromStr;

use chrono::{Datelike, Days, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::context::{RenderContext, to_px};

/// Windows longer than three 31-day months are too dense to shade.
pub const WORK_PERIOD_MAX_PERIOD: i64 = 3 * 31 * 24 * 3600;

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid work period {entry:?}: {reason}")]
pub struct ParseWorkPeriodError {
    entry: String,
    reason: &'static str,
}

/// One `d-d,hh:mm-hh:mm` entry; times are minutes after local midnight, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkPeriod {
    pub first_day: u32,
    pub last_day: u32,
    pub start_minute: u32,
    pub end_minute: u32,
}

impl WorkPeriod {
    pub fn covers(&self, weekday: u32) -> bool {
        (self.first_day..=self.last_day).contains(&weekday)
    }
}

impl FromStr for WorkPeriod {
    type Err = ParseWorkPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseWorkPeriodError { entry: s.to_string(), reason };
        let (days, times) = s.trim().split_once(',').ok_or_else(|| err("missing ','"))?;
        let (first, last) = days.split_once('-').ok_or_else(|| err("missing day range"))?;
        let (start, end) = times.split_once('-').ok_or_else(|| err("missing time range"))?;

        let day = |d: &str| {
            d.trim()
                .parse::<u32>()
                .ok()
                .filter(|d| (1..=7).contains(d))
                .ok_or_else(|| err("day must be 1-7"))
        };
        let minute = |t: &str| {
            let (h, m) = t.trim().split_once(':').ok_or_else(|| err("time must be hh:mm"))?;
            let (h, m) = match (h.parse::<u32>(), m.parse::<u32>()) {
                (Ok(hv), Ok(mv)) if h.len() <= 2 && m.len() <= 2 && mv < 60 => (hv, mv),
                _ => return Err(err("time must be hh:mm")),
            };
            let total = h * 60 + m;
            if total > MINUTES_PER_DAY {
                return Err(err("time past 24:00"));
            }
            Ok(total)
        };

        let period = WorkPeriod {
            first_day: day(first)?,
            last_day: day(last)?,
            start_minute: minute(start)?,
            end_minute: minute(end)?,
        };
        if period.first_day > period.last_day {
            return Err(err("day range is reversed"));
        }
        if period.start_minute >= period.end_minute {
            return Err(err("time range is empty"));
        }
        Ok(period)
    }
}

/// A full working-time schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSchedule {
    pub periods: Vec<WorkPeriod>,
}

impl FromStr for WorkSchedule {
    type Err = ParseWorkPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let periods = s
            .split(';')
            .filter(|entry| !entry.trim().is_empty())
            .map(WorkPeriod::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        if periods.is_empty() {
            return Err(ParseWorkPeriodError { entry: s.to_string(), reason: "empty schedule" });
        }
        Ok(Self { periods })
    }
}

impl WorkSchedule {
    /// Working intervals `[start, end)` in unix seconds, clipped to `[from, to)`,
    /// sorted, with touching or overlapping intervals merged.
    pub fn intervals<Tz: TimeZone>(&self, from: i64, to: i64, tz: &Tz) -> Vec<(i64, i64)> {
        let (Some(first), Some(last)) = (local_date(from, tz), local_date(to, tz)) else {
            return Vec::new();
        };

        let mut raw = Vec::new();
        let mut day = first.checked_sub_days(Days::new(1)).unwrap_or(first);
        while day <= last {
            let weekday = day.weekday().number_from_monday();
            for p in self.periods.iter().filter(|p| p.covers(weekday)) {
                let (Some(start), Some(end)) =
                    (instant(day, p.start_minute, tz), instant(day, p.end_minute, tz))
                else {
                    continue;
                };
                let (start, end) = (start.max(from), end.min(to));
                if start < end {
                    raw.push((start, end));
                }
            }
            match day.checked_add_days(Days::new(1)) {
                Some(next) => day = next,
                None => break,
            }
        }

        raw.sort_unstable();
        let mut merged: Vec<(i64, i64)> = Vec::with_capacity(raw.len());
        for (start, end) in raw {
            match merged.last_mut() {
                Some(prev) if start <= prev.1 => prev.1 = prev.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        merged
    }

    /// Working intervals as pixel spans `[x1, x2)` inside the plot: starts round to the nearest
    /// column, ends round up.
    pub fn pixel_spans<Tz: TimeZone>(&self, ctx: &RenderContext, tz: &Tz) -> Vec<(i32, i32)> {
        let window = &ctx.window;
        let width = Decimal::from(ctx.layout.size_x);
        let period = Decimal::from(window.period.max(1));
        let left = ctx.layout.plot_left();
        let to_col = |t: i64| Decimal::from(t - window.from) * width / period;

        self.intervals(window.from, window.to(), tz)
            .into_iter()
            .map(|(start, end)| {
                let x1 = left + to_px(to_col(start));
                let x2 = left + to_px(to_col(end).ceil());
                (x1, x2)
            })
            .collect()
    }
}

fn local_date<Tz: TimeZone>(t: i64, tz: &Tz) -> Option<NaiveDate> {
    tz.timestamp_opt(t, 0).earliest().map(|dt| dt.date_naive())
}

fn instant<Tz: TimeZone>(day: NaiveDate, minute: u32, tz: &Tz) -> Option<i64> {
    let (date, minute) = if minute >= MINUTES_PER_DAY {
        (day.checked_add_days(Days::new(1))?, minute - MINUTES_PER_DAY)
    } else {
        (day, minute)
    };
    let time = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)?;
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.timestamp()),
        // Skipped by a forward DST jump: the wall clock reads one hour later.
        LocalResult::None => tz
            .from_local_datetime(&(naive + TimeDelta::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn parses_multiple_entries() {
        let s: WorkSchedule = "1-5,09:00-18:00;6-6,10:00-14:30".parse().unwrap();
        assert_eq!(s.periods.len(), 2);
        assert_eq!(s.periods[1].first_day, 6);
        assert_eq!(s.periods[1].end_minute, 14 * 60 + 30);
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!("8-9,09:00-18:00".parse::<WorkSchedule>().is_err());
        assert!("5-1,09:00-18:00".parse::<WorkSchedule>().is_err());
        assert!("1-5,18:00-09:00".parse::<WorkSchedule>().is_err());
        assert!("1-5,9-18".parse::<WorkSchedule>().is_err());
        assert!("".parse::<WorkSchedule>().is_err());
        assert!("1-7,00:00-24:00".parse::<WorkSchedule>().is_ok());
    }

    #[test]
    fn weekday_intervals_in_utc() {
        // 2024-01-05 is a Friday.
        let from = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap().timestamp();
        let to = from + 3 * 86400;
        let s: WorkSchedule = "1-5,09:00-18:00".parse().unwrap();
        let got = s.intervals(from, to, &Utc);
        // Friday, then nothing on the weekend, then Monday is past `to`.
        assert_eq!(got, vec![(from + 9 * 3600, from + 18 * 3600)]);
    }

    #[test]
    fn full_days_merge_and_clip() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap().timestamp();
        let to = from + 2 * 86400;
        let s: WorkSchedule = "1-7,00:00-24:00".parse().unwrap();
        assert_eq!(s.intervals(from, to, &Utc), vec![(from, to)]);
    }

    #[test]
    fn follows_the_local_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp();
        let s: WorkSchedule = "1-1,09:00-10:00".parse().unwrap();
        let got = s.intervals(from, from + 86400, &tz);
        assert_eq!(got, vec![(from + 7 * 3600, from + 8 * 3600)]);
    }
}
