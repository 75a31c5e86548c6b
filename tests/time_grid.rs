mod common;

use chrono::{Datelike, FixedOffset, TimeZone, Timelike, Utc};
use common::CentralEurope;
use linegraph::context::RenderContext;
use linegraph::models::GraphType;
use linegraph::timegrid::{
    GridPlan, LabelFormat, SEC_PER_DAY, SEC_PER_HOUR, SEC_PER_MONTH, SEC_PER_YEAR, TimeGridPlanner,
    choose_intervals,
};
use linegraph::workperiod::WorkSchedule;

fn monday() -> i64 {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp()
}

#[test]
fn one_day_at_900_px_ticks_every_hour() {
    assert_eq!(choose_intervals(SEC_PER_DAY, 900), (SEC_PER_DAY, SEC_PER_HOUR));

    let from = monday();
    let ctx = RenderContext::for_plot(GraphType::Normal, from, SEC_PER_DAY, 900, 100);
    let plan = TimeGridPlanner::new(&ctx, &Utc).plan();

    assert_eq!(plan.sub_interval, SEC_PER_HOUR);
    assert_eq!(plan.ticks.len(), 23);
    assert!(plan.ticks.iter().all(|t| t.time % SEC_PER_HOUR == 0));
    assert!(plan.ticks.iter().all(|t| t.format == LabelFormat::HourMinute && !t.main));
    assert_eq!(plan.ticks[0].label, "01:00");
    assert_eq!(plan.ticks[0].position, 38);
    assert!(plan.ticks.windows(2).all(|w| w[0].position < w[1].position));
}

#[test]
fn labels_follow_the_render_time_zone() {
    let from = monday();
    let ctx = RenderContext::for_plot(GraphType::Normal, from, SEC_PER_DAY, 900, 100);
    let tz = FixedOffset::east_opt(2 * 3600).unwrap();
    let plan = TimeGridPlanner::new(&ctx, &tz).plan();

    assert_eq!(plan.ticks[0].time, from + SEC_PER_HOUR);
    assert_eq!(plan.ticks[0].label, "03:00");
    // Local midnight falls inside the window and is a main tick.
    let midnight = plan.ticks.iter().find(|t| t.label == "01-02").unwrap();
    assert!(midnight.main);
    assert_eq!(midnight.time, from + 22 * SEC_PER_HOUR);
}

#[test]
fn work_hours_are_shaded_per_local_day() {
    let from = monday();
    let schedule: WorkSchedule = "1-5,09:00-18:00".parse().unwrap();
    let week = schedule.intervals(from, from + 7 * SEC_PER_DAY, &Utc);

    assert_eq!(week.len(), 5);
    assert_eq!(week[0], (from + 9 * SEC_PER_HOUR, from + 18 * SEC_PER_HOUR));
    assert!(week.iter().all(|(s, e)| e - s == 9 * SEC_PER_HOUR));
}

fn utc(y: i32, m: u32, d: u32, h: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp()
}

/// Plan a UTC window; 2023-02-10 is a Friday.
fn plan_utc(from: i64, period: i64, width: i32) -> GridPlan {
    let ctx = RenderContext::for_plot(GraphType::Normal, from, period, width, 100);
    TimeGridPlanner::new(&ctx, &Utc).plan()
}

fn head(plan: &GridPlan, n: usize) -> Vec<(i64, bool)> {
    plan.ticks.iter().take(n).map(|t| (t.time, t.main)).collect()
}

#[test]
fn quarterly_ticks_start_each_quarter() {
    let plan = plan_utc(utc(2023, 2, 10, 0), 30 * SEC_PER_MONTH, 300);
    assert_eq!((plan.main_interval, plan.sub_interval), (SEC_PER_YEAR, 3 * SEC_PER_MONTH));
    assert_eq!(
        head(&plan, 4),
        vec![
            (utc(2023, 4, 1, 0), false),
            (utc(2023, 7, 1, 0), false),
            (utc(2023, 10, 1, 0), false),
            (utc(2024, 1, 1, 0), true),
        ]
    );
    assert_eq!(plan.ticks[0].label, "Apr");
    assert_eq!(plan.ticks[3].label, "2024");
    for t in &plan.ticks {
        let dt = Utc.timestamp_opt(t.time, 0).unwrap();
        assert_eq!((dt.day(), dt.hour()), (1, 0));
        assert!([1, 4, 7, 10].contains(&dt.month()));
        assert_eq!(t.main, dt.month() == 1);
    }
}

#[test]
fn four_month_ticks_follow_may_and_september() {
    let plan = plan_utc(utc(2023, 2, 10, 0), 40 * SEC_PER_MONTH, 300);
    assert_eq!(plan.sub_interval, 4 * SEC_PER_MONTH);
    assert_eq!(
        head(&plan, 4),
        vec![
            (utc(2023, 5, 1, 0), false),
            (utc(2023, 9, 1, 0), false),
            (utc(2024, 1, 1, 0), true),
            (utc(2024, 5, 1, 0), false),
        ]
    );
    assert_eq!(plan.ticks[1].format, LabelFormat::Month);
}

#[test]
fn half_year_ticks_alternate_july_and_january() {
    let plan = plan_utc(utc(2023, 2, 10, 0), 60 * SEC_PER_MONTH, 300);
    assert_eq!(plan.sub_interval, 6 * SEC_PER_MONTH);
    assert_eq!(
        head(&plan, 3),
        vec![(utc(2023, 7, 1, 0), false), (utc(2024, 1, 1, 0), true), (utc(2024, 7, 1, 0), false)]
    );
    assert_eq!(plan.ticks[0].label, "Jul");
}

#[test]
fn yearly_ticks_land_on_new_year() {
    let plan = plan_utc(utc(2023, 2, 10, 0), 10 * SEC_PER_YEAR, 300);
    assert_eq!((plan.main_interval, plan.sub_interval), (5 * SEC_PER_YEAR, SEC_PER_YEAR));
    assert_eq!(
        head(&plan, 3),
        vec![(utc(2024, 1, 1, 0), true), (utc(2025, 1, 1, 0), true), (utc(2026, 1, 1, 0), true)]
    );
    assert!(plan.ticks.iter().all(|t| t.format == LabelFormat::Year && t.main));
    assert_eq!(plan.ticks[1].label, "2025");
}

#[test]
fn half_month_ticks_cross_a_leap_february() {
    // 2024-01-20 is a Saturday; 2024 is a leap year.
    let plan = plan_utc(utc(2024, 1, 20, 0), 150 * SEC_PER_DAY, 300);
    assert_eq!((plan.main_interval, plan.sub_interval), (SEC_PER_MONTH, 15 * SEC_PER_DAY));
    assert_eq!(
        head(&plan, 3),
        vec![(utc(2024, 2, 1, 0), true), (utc(2024, 2, 16, 0), false), (utc(2024, 3, 1, 0), true)]
    );
    let labels: Vec<&str> = plan.ticks.iter().take(3).map(|t| t.label.as_str()).collect();
    assert_eq!(labels, ["02-01", "02-16", "03-01"]);
    assert_eq!(plan.ticks[2].time - plan.ticks[1].time, 14 * SEC_PER_DAY);
}

#[test]
fn hourly_ticks_skip_the_missing_dst_hour() {
    // Clocks jump from 02:00 to 03:00 local on 2024-03-31.
    let from = utc(2024, 3, 30, 12);
    let ctx = RenderContext::for_plot(GraphType::Normal, from, SEC_PER_DAY, 900, 100);
    let plan = TimeGridPlanner::new(&ctx, &CentralEurope).plan();

    assert_eq!(plan.sub_interval, SEC_PER_HOUR);
    assert_eq!(plan.ticks.len(), 23);
    assert_eq!((plan.ticks[0].time, plan.ticks[0].label.as_str()), (from + SEC_PER_HOUR, "14:00"));

    let midnight = plan.ticks.iter().find(|t| t.main).unwrap();
    assert_eq!((midnight.time, midnight.label.as_str()), (utc(2024, 3, 30, 23), "03-31"));
    assert_eq!(plan.ticks.iter().filter(|t| t.main).count(), 1);

    let labels: Vec<&str> = plan.ticks.iter().map(|t| t.label.as_str()).collect();
    assert!(!labels.contains(&"02:00"));
    let one = labels.iter().position(|l| *l == "01:00").unwrap();
    assert_eq!(labels[one + 1], "03:00");
    assert_eq!(plan.ticks[one + 1].time - plan.ticks[one].time, SEC_PER_HOUR);
}

#[test]
fn too_coarse_windows_plan_no_ticks() {
    assert_eq!(choose_intervals(100 * SEC_PER_YEAR, 30), (0, 0));
    let plan = plan_utc(utc(2023, 2, 10, 0), 100 * SEC_PER_YEAR, 30);
    assert_eq!(plan.sub_interval, 0);
    assert!(plan.ticks.is_empty());
}

#[test]
fn work_hours_follow_dst_changes() {
    let sunday_night: WorkSchedule = "7-7,01:00-04:00".parse().unwrap();

    // Spring forward: three wall-clock hours last two real hours.
    let from = utc(2024, 3, 30, 0);
    let spring = sunday_night.intervals(from, from + 3 * SEC_PER_DAY, &CentralEurope);
    assert_eq!(spring, vec![(utc(2024, 3, 31, 0), utc(2024, 3, 31, 2))]);

    // Fall back: the same wall-clock hours last four real hours.
    let from = utc(2024, 10, 26, 0);
    let autumn = sunday_night.intervals(from, from + 3 * SEC_PER_DAY, &CentralEurope);
    assert_eq!(autumn, vec![(utc(2024, 10, 26, 23), utc(2024, 10, 27, 3))]);
}

#[test]
fn work_hours_starting_in_a_dst_gap_or_overlap() {
    // 02:30 does not exist on 2024-03-31 and reads as 03:30 local.
    let gap: WorkSchedule = "7-7,02:30-05:00".parse().unwrap();
    let from = utc(2024, 3, 30, 0);
    assert_eq!(
        gap.intervals(from, from + 3 * SEC_PER_DAY, &CentralEurope),
        vec![(utc(2024, 3, 31, 1) + 1800, utc(2024, 3, 31, 3))]
    );

    // 02:30 happens twice on 2024-10-27; the earlier one is used.
    let overlap: WorkSchedule = "7-7,02:30-03:00".parse().unwrap();
    let from = utc(2024, 10, 26, 0);
    assert_eq!(
        overlap.intervals(from, from + 3 * SEC_PER_DAY, &CentralEurope),
        vec![(utc(2024, 10, 27, 0) + 1800, utc(2024, 10, 27, 2))]
    );
}
