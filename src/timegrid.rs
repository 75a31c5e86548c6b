//! Time axis: interval selection and calendar-aware tick placement.
//!
//! The sub interval closest to `30 px` worth of time is picked from [`INTERVALS`]. Ticks of
//! month-scale and year-scale intervals advance through the calendar (1st of month,
//! quarter starts, Jan 1) in the render time zone; shorter intervals advance by fixed
//! seconds aligned to the local clock.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::context::{GRID_PIXELS, RenderContext, to_px};

pub const SEC_PER_MIN: i64 = 60;
pub const SEC_PER_HOUR: i64 = 3600;
pub const SEC_PER_DAY: i64 = 86400;
pub const SEC_PER_WEEK: i64 = 7 * SEC_PER_DAY;
pub const SEC_PER_MONTH: i64 = 30 * SEC_PER_DAY;
pub const SEC_PER_YEAR: i64 = 365 * SEC_PER_DAY;

/// `(main, sub)` interval pairs in seconds, finest first.
pub const INTERVALS: [(i64, i64); 29] = [
    (SEC_PER_MIN / 2, 1),
    (SEC_PER_MIN, 5),
    (SEC_PER_MIN * 5, 10),
    (SEC_PER_MIN * 15, 30),
    (SEC_PER_HOUR, SEC_PER_MIN),
    (SEC_PER_HOUR, SEC_PER_MIN * 2),
    (SEC_PER_HOUR, SEC_PER_MIN * 5),
    (SEC_PER_HOUR, SEC_PER_MIN * 15),
    (SEC_PER_HOUR, SEC_PER_MIN * 30),
    (SEC_PER_DAY, SEC_PER_HOUR),
    (SEC_PER_DAY, SEC_PER_HOUR * 3),
    (SEC_PER_DAY, SEC_PER_HOUR * 6),
    (SEC_PER_DAY, SEC_PER_HOUR * 12),
    (SEC_PER_WEEK, SEC_PER_DAY),
    (SEC_PER_WEEK * 2, SEC_PER_WEEK),
    (SEC_PER_MONTH, SEC_PER_DAY * 15),
    (SEC_PER_MONTH * 6, SEC_PER_MONTH),
    (SEC_PER_YEAR, SEC_PER_MONTH),
    (SEC_PER_YEAR, SEC_PER_MONTH * 3),
    (SEC_PER_YEAR, SEC_PER_MONTH * 4),
    (SEC_PER_YEAR, SEC_PER_MONTH * 6),
    (SEC_PER_YEAR * 5, SEC_PER_YEAR),
    (SEC_PER_YEAR * 10, SEC_PER_YEAR * 2),
    (SEC_PER_YEAR * 15, SEC_PER_YEAR * 3),
    (SEC_PER_YEAR * 20, SEC_PER_YEAR * 5),
    (SEC_PER_YEAR * 30, SEC_PER_YEAR * 10),
    (SEC_PER_YEAR * 40, SEC_PER_YEAR * 20),
    (SEC_PER_YEAR * 60, SEC_PER_YEAR * 30),
    (SEC_PER_YEAR * 80, SEC_PER_YEAR * 40),
];

/// Font size of sub tick labels.
pub const SUB_LABEL_PX: u32 = 7;
/// Font size of main tick and start/end labels.
pub const MAIN_LABEL_PX: u32 = 8;

/// Horizontal extent of a label rotated by 90 degrees: one line of text.
pub fn rotated_label_extent(font_px: u32) -> Decimal {
    (Decimal::from(font_px) * Decimal::new(12, 1)).ceil()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabelFormat {
    Year,
    Month,
    MonthDay,
    HourMinute,
    HourMinuteSecond,
}

impl LabelFormat {
    /// `chrono` format string.
    pub fn pattern(self) -> &'static str {
        match self {
            LabelFormat::Year => "%Y",
            LabelFormat::Month => "%b",
            LabelFormat::MonthDay => "%m-%d",
            LabelFormat::HourMinute => "%H:%M",
            LabelFormat::HourMinuteSecond => "%H:%M:%S",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeTick {
    pub time: i64,
    /// Offset from the plot's left edge in pixels.
    pub position: i32,
    pub label: String,
    pub format: LabelFormat,
    pub main: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridPlan {
    pub main_interval: i64,
    pub sub_interval: i64,
    pub main_offset: i64,
    pub sub_offset: i64,
    pub main_interval_px: Decimal,
    pub sub_interval_px: Decimal,
    pub ticks: Vec<TimeTick>,
}

/// Pick the `(main, sub)` pair whose sub interval is closest to `30 * period / width`.
pub fn choose_intervals(period: i64, width: usize) -> (i64, i64) {
    let ideal = Decimal::from(GRID_PIXELS) * Decimal::from(period) / Decimal::from(width.max(1));
    let mut distance = Decimal::from(SEC_PER_YEAR * 5);
    let mut chosen = (0, 0);
    for (main, sub) in INTERVALS {
        let d = (Decimal::from(sub) - ideal).abs();
        if d < distance {
            distance = d;
            chosen = (main, sub);
        }
    }
    chosen
}

pub struct TimeGridPlanner<'a, Tz: TimeZone> {
    ctx: &'a RenderContext,
    tz: &'a Tz,
}

impl<'a, Tz> TimeGridPlanner<'a, Tz>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    pub fn new(ctx: &'a RenderContext, tz: &'a Tz) -> Self {
        Self { ctx, tz }
    }

    pub fn plan(&self) -> GridPlan {
        let window = &self.ctx.window;
        let width = Decimal::from(window.pixel_width);
        let period = Decimal::from(window.period.max(1));
        let (main, sub) = choose_intervals(window.period, window.pixel_width);

        let sub_offset = self.offset(sub, false);
        let main_offset = self.offset(main, true);
        let mut plan = GridPlan {
            main_interval: main,
            sub_interval: sub,
            main_offset,
            sub_offset,
            main_interval_px: Decimal::from(main) * width / period,
            sub_interval_px: Decimal::from(sub) * width / period,
            ticks: Vec::new(),
        };

        if sub <= 0
            || sub == main
            || plan.main_interval_px
                < (Decimal::from(main) / Decimal::from(sub) * plan.sub_interval_px).floor()
        {
            debug!("time grid skipped: main={main} sub={sub}");
            return plan;
        }

        plan.ticks = self.ticks(main, sub, sub_offset);
        debug!("time grid main={main}s sub={sub}s ticks={}", plan.ticks.len());
        plan
    }

    fn local(&self, t: i64) -> Option<DateTime<Tz>> {
        self.tz.timestamp_opt(t, 0).single()
    }

    fn utc_offset(&self, t: i64) -> i64 {
        self.local(t)
            .map(|dt| {
                let naive = dt.naive_local();
                naive.and_utc().timestamp() - t
            })
            .unwrap_or(0)
    }

    /// Local midnight of `year-month-day`; months past 12 roll into the next year.
    fn midnight(&self, year: i32, month: u32, day: u32) -> Option<i64> {
        let (year, month) = if month > 12 {
            (year + (month as i32 - 1) / 12, (month - 1) % 12 + 1)
        } else {
            (year, month)
        };
        self.tz
            .with_ymd_and_hms(year, month, day, 0, 0, 0)
            .earliest()
            .or_else(|| self.tz.with_ymd_and_hms(year, month, day, 1, 0, 0).earliest())
            .map(|dt| dt.timestamp())
    }

    /// Seconds from `from` to the first aligned tick of `interval`.
    fn offset(&self, interval: i64, main: bool) -> i64 {
        let window = &self.ctx.window;
        let from = window.from;
        if interval > SEC_PER_DAY {
            // Next local Sunday midnight.
            let days_to_sunday = self
                .local(from)
                .map(|dt| 7 - i64::from(dt.weekday().num_days_from_sunday()))
                .unwrap_or(7);
            let next = from + days_to_sunday * SEC_PER_DAY + window.tz_offset_diff;
            return self
                .local(next)
                .and_then(|dt| self.midnight(dt.year(), dt.month(), dt.day()))
                .map(|m| m - from)
                .unwrap_or(days_to_sunday * SEC_PER_DAY);
        }
        if interval <= 0 {
            return 0;
        }
        let offset = interval - (from + self.utc_offset(from)).rem_euclid(interval);
        if main { offset + window.tz_offset_diff } else { offset }
    }

    /// Next tick time after `previous`; `step` counts generated steps.
    fn next_time(&self, sub: i64, step: i64, previous: i64, sub_offset: i64) -> Option<i64> {
        let from = self.ctx.window.from;
        if sub >= SEC_PER_YEAR && sub % SEC_PER_YEAR == 0 {
            let years = (sub / SEC_PER_YEAR) as i32;
            let prev = self.local(previous)?;
            return self.midnight(prev.year() + years, 1, 1);
        }

        let calendar_months: Option<&[u32]> = match sub {
            s if s == SEC_PER_MONTH * 6 => Some(&[7, 13]),
            s if s == SEC_PER_MONTH * 4 => Some(&[5, 9, 13]),
            s if s == SEC_PER_MONTH * 3 => Some(&[4, 7, 10, 13]),
            _ => None,
        };
        if let Some(starts) = calendar_months {
            // The first step may land on the current period start; 13 is January next year.
            let prev = self.local(previous)?;
            let target = if step == 0 {
                let month = self.local(from)?.month();
                starts.iter().copied().find(|m| *m >= month)
            } else {
                starts.iter().copied().find(|m| *m > prev.month())
            };
            return self.midnight(prev.year(), target.unwrap_or(13), 1);
        }

        if sub == SEC_PER_MONTH {
            let prev = self.local(previous)?;
            return self.midnight(prev.year(), prev.month() + 1, 1);
        }

        if sub == SEC_PER_DAY * 15 {
            let prev = self.local(previous)?;
            let reference_day = if step == 0 { self.local(from)?.day() } else { prev.day() };
            let next_month = if step == 0 { reference_day > 16 } else { reference_day != 1 };
            return if next_month {
                self.midnight(prev.year(), prev.month() + 1, 1)
            } else {
                self.midnight(prev.year(), prev.month(), 16)
            };
        }

        Some(from + step * sub + sub_offset)
    }

    fn ticks(&self, main: i64, sub: i64, sub_offset: i64) -> Vec<TimeTick> {
        let window = &self.ctx.window;
        let (from, to) = (window.from, window.to());
        let width = Decimal::from(window.pixel_width);
        let period = Decimal::from(window.period.max(1));
        let first_skip = rotated_label_extent(SUB_LABEL_PX) / Decimal::TWO;
        let last_limit = width - rotated_label_extent(MAIN_LABEL_PX) / Decimal::TWO - Decimal::TWO;

        let mut ticks = Vec::new();
        let mut previous = from;
        let mut step: i64 = 0;
        while from + step * sub + sub_offset < to {
            let Some(time) = self.next_time(sub, step, previous, sub_offset) else {
                break;
            };
            if time < from && step != 0 {
                break;
            }
            let prev_time = previous;
            previous = time;
            let position = Decimal::from(time - from) * width / period;

            if time < 0 || (step == 0 && position < first_skip) || time >= to {
                step += 1;
                continue;
            }
            if position > last_limit {
                break;
            }
            step += 1;

            let Some(local) = self.local(time) else {
                continue;
            };
            let format = self.label_format(&local, sub);
            let main_tick = format == LabelFormat::Year || self.is_main(&local, prev_time, main, sub);
            ticks.push(TimeTick {
                time,
                position: to_px(position),
                label: local.format(format.pattern()).to_string(),
                format,
                main: main_tick,
            });
        }
        ticks
    }

    fn label_format(&self, t: &DateTime<Tz>, sub: i64) -> LabelFormat {
        let midnight = t.hour() == 0 && t.minute() == 0;
        let month_scale = [SEC_PER_MONTH, SEC_PER_MONTH * 3, SEC_PER_MONTH * 4, SEC_PER_MONTH * 6]
            .contains(&sub);
        if t.day() == 1 && t.month() == 1 && midnight {
            LabelFormat::Year
        } else if t.day() == 1 && midnight && month_scale {
            LabelFormat::Month
        } else if midnight || sub > SEC_PER_HOUR * 12 {
            LabelFormat::MonthDay
        } else if t.second() == 0 && sub >= SEC_PER_MIN {
            LabelFormat::HourMinute
        } else {
            LabelFormat::HourMinuteSecond
        }
    }

    fn is_main(&self, t: &DateTime<Tz>, previous: i64, main: i64, sub: i64) -> bool {
        let local_secs = t.naive_local().and_utc().timestamp();
        let midnight = t.hour() == 0 && t.minute() == 0;
        (main < SEC_PER_DAY && local_secs.rem_euclid(main) == 0)
            || (sub < SEC_PER_MIN && t.second() == 0)
            || (main == SEC_PER_DAY && midnight)
            || (main == SEC_PER_WEEK && t.weekday() == Weekday::Sun)
            || (main == SEC_PER_MONTH && t.day() == 1)
            || (main == SEC_PER_WEEK * 2
                && self.local(previous).is_some_and(|p| p.month() != t.month()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn interval_choice() {
        assert_eq!(choose_intervals(86400, 900), (SEC_PER_DAY, SEC_PER_HOUR));
        assert_eq!(choose_intervals(3600, 900), (SEC_PER_HOUR, SEC_PER_MIN * 2));
        assert_eq!(choose_intervals(SEC_PER_YEAR, 900), (SEC_PER_MONTH, SEC_PER_DAY * 15));
    }

    #[test]
    fn monthly_ticks_land_on_first_of_month() {
        let from = Utc.with_ymd_and_hms(2023, 1, 10, 0, 0, 0).unwrap().timestamp();
        let ctx = crate::context::RenderContext::for_plot(
            crate::models::GraphType::Normal,
            from,
            SEC_PER_YEAR,
            360,
            100,
        );
        let plan = TimeGridPlanner::new(&ctx, &Utc).plan();
        assert_eq!(plan.sub_interval, SEC_PER_MONTH);
        assert!(!plan.ticks.is_empty());
        for t in &plan.ticks {
            let dt = Utc.timestamp_opt(t.time, 0).unwrap();
            assert_eq!((dt.day(), dt.hour()), (1, 0));
        }
    }
}
