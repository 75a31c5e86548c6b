#![allow(dead_code)]

use chrono::{
    Datelike, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Weekday,
};

const WINTER: i32 = 3600;
const SUMMER: i32 = 2 * 3600;

/// Central European time: UTC+1, UTC+2 from the last Sunday of March to the last Sunday of
/// October, switching at 01:00 UTC.
#[derive(Debug, Clone, Copy)]
pub struct CentralEurope;

fn last_sunday(year: i32, month: u32) -> NaiveDate {
    let mut day = NaiveDate::from_ymd_opt(year, month, 31).unwrap();
    while day.weekday() != Weekday::Sun {
        day = day.pred_opt().unwrap();
    }
    day
}

fn offset_at_utc(utc: &NaiveDateTime) -> i32 {
    let switch = NaiveTime::from_hms_opt(1, 0, 0).unwrap();
    let start = last_sunday(utc.year(), 3).and_time(switch);
    let end = last_sunday(utc.year(), 10).and_time(switch);
    if *utc >= start && *utc < end { SUMMER } else { WINTER }
}

fn fixed(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap()
}

impl TimeZone for CentralEurope {
    type Offset = FixedOffset;

    fn from_offset(_offset: &FixedOffset) -> Self {
        CentralEurope
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
        self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
        let valid: Vec<i32> = [SUMMER, WINTER]
            .into_iter()
            .filter(|off| offset_at_utc(&(*local - TimeDelta::seconds(i64::from(*off)))) == *off)
            .collect();
        match valid.as_slice() {
            [] => LocalResult::None,
            [one] => LocalResult::Single(fixed(*one)),
            [first, second, ..] => LocalResult::Ambiguous(fixed(*first), fixed(*second)),
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        fixed(offset_at_utc(utc))
    }
}
