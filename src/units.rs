//! Human-readable values for axis labels and the legend.
//!
//! - metric prefixes `K`..`Y`, base 1000, or base 1024 for `B`/`Bps` and byte axes
//! - `s` is spelled out as `1d 2h 3m`
//! - `%`, `ms`, `rpm` and `RPM` are never prefixed
//! - an axis shares one prefix power ([`common_pow`]) and one fraction length ([`fraction_len`])

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const PREFIXES: [&str; 9] = ["", "K", "M", "G", "T", "P", "E", "Z", "Y"];
const UNPREFIXED: [&str; 4] = ["%", "ms", "rpm", "RPM"];

const SEC_PER_MIN: i64 = 60;
const SEC_PER_HOUR: i64 = 3600;
const SEC_PER_DAY: i64 = 86400;
const SEC_PER_MONTH: i64 = 30 * SEC_PER_DAY;
const SEC_PER_YEAR: i64 = 365 * SEC_PER_DAY;

/// How a value is turned into text.
#[derive(Debug, Clone, Default)]
pub struct FormatOptions<'a> {
    pub units: &'a str,
    /// Force base 1024 regardless of `units` (the axis carries byte series).
    pub byte_step: bool,
    /// Fixed prefix power instead of the value's own.
    pub pow: Option<u32>,
    /// Drop the millisecond part of `s` values.
    pub ignore_millis: bool,
    /// Fixed number of fraction digits.
    pub length: Option<usize>,
    /// Prefix values even when `units` is empty (axis labels do, the legend does not).
    pub prefix_without_units: bool,
}

impl<'a> FormatOptions<'a> {
    pub fn new(units: &'a str) -> Self {
        Self { units, ..Self::default() }
    }
}

/// `1000`, or `1024` for byte units.
pub fn unit_base(units: &str, byte_step: bool) -> u32 {
    if byte_step || matches!(units, "B" | "Bps") {
        1024
    } else {
        1000
    }
}

/// Format `value` with units, e.g. `6442450944` `B` -> `6 GB`.
pub fn format_value(value: Decimal, opts: &FormatOptions<'_>) -> String {
    let units = opts.units.trim();
    if units == "s" {
        return format_seconds(value, opts.ignore_millis);
    }
    if UNPREFIXED.contains(&units) || (units.is_empty() && !opts.prefix_without_units) {
        return join(&plain_number(value), units);
    }

    let base = Decimal::from(unit_base(units, opts.byte_step));
    if value.abs() < Decimal::ONE {
        let v = round_half_up(value, 4);
        let text = match opts.length {
            Some(len) if !v.is_zero() => format!("{v:.len$}"),
            _ => trim_number(v),
        };
        return join(&text, units);
    }

    let pow = match opts.pow {
        Some(p) if !value.is_zero() => p.min(8),
        _ => pow_of(value, base),
    };
    let scaled = value / pow_decimal(base, pow);
    let rounded = round_half_up(scaled, 2);
    let text = match opts.length {
        Some(len) => format!("{rounded:.len$}"),
        None => trim_number(rounded),
    };
    join(&text, &format!("{}{}", PREFIXES[pow as usize], units))
}

/// Seconds as `1y 2m 3d`, `4d 5h 6m`, `7h 8m 9s` or `10m 11s 12ms`.
pub fn format_seconds(value: Decimal, ignore_millis: bool) -> String {
    let mut secs = round_half_up(value * Decimal::from(1000), 2) / Decimal::from(1000);
    let negative = secs < Decimal::ZERO;
    if negative {
        secs = -secs;
    }

    let mut take = |unit: i64| -> i64 {
        let n = (secs / Decimal::from(unit)).floor();
        secs -= n * Decimal::from(unit);
        n.to_i64().unwrap_or(0)
    };

    // Precision level of the largest unit present: 4=years, 3=months, 2=days, 1=hours.
    let mut level = 0;
    let mut parts: Vec<String> = Vec::new();

    let mut years = take(SEC_PER_YEAR);
    if years != 0 {
        level = 4;
    }
    let months = take(SEC_PER_MONTH);
    let mut months_part = None;
    if months == 12 {
        years += 1;
        level = level.max(4);
    } else if months != 0 {
        months_part = Some(months);
        if level == 0 {
            level = 3;
        }
    }
    if years != 0 {
        parts.push(format!("{years}y"));
    }
    if let Some(m) = months_part {
        parts.push(format!("{m}m"));
    }
    let days = take(SEC_PER_DAY);
    if days != 0 {
        parts.push(format!("{days}d"));
        if level == 0 {
            level = 2;
        }
    }
    if level < 4 {
        let hours = take(SEC_PER_HOUR);
        if hours != 0 {
            parts.push(format!("{hours}h"));
            if level == 0 {
                level = 1;
            }
        }
    }
    if level < 3 {
        let minutes = take(SEC_PER_MIN);
        if minutes != 0 {
            parts.push(format!("{minutes}m"));
        }
    }
    let mut whole = Decimal::ZERO;
    if level < 2 {
        whole = secs.floor();
        secs -= whole;
    }
    if level < 1 {
        if ignore_millis {
            whole += round_half_up(secs, 2);
        } else {
            let ms = round_half_up(secs * Decimal::from(1000), 2);
            if !whole.is_zero() {
                parts.push(format!("{}s", trim_number(whole)));
            }
            if !ms.is_zero() {
                parts.push(format!("{}ms", trim_number(ms)));
            }
            return finish_seconds(parts, negative);
        }
    }
    if !whole.is_zero() {
        parts.push(format!("{}s", trim_number(whole)));
    }
    finish_seconds(parts, negative)
}

fn finish_seconds(parts: Vec<String>, negative: bool) -> String {
    if parts.is_empty() {
        return "0".to_string();
    }
    let text = parts.join(" ");
    if negative { format!("-{text}") } else { text }
}

/// Largest prefix power whose magnitude `value` reaches.
pub fn pow_of(value: Decimal, base: Decimal) -> u32 {
    let abs = value.abs();
    let mut pow = 0;
    let mut threshold = base;
    while pow < 8 && abs >= threshold {
        pow += 1;
        threshold *= base;
    }
    pow
}

/// One prefix power for every label of an axis spanning `min..max`.
/// The larger power wins unless it would print the other bound with more than 4 digits.
pub fn common_pow(min: Decimal, max: Decimal, byte_step: bool) -> u32 {
    let base = Decimal::from(if byte_step { 1024 } else { 1000 });
    let max_pow = pow_of(max, base);
    let min_pow = pow_of(min, base);
    let thousand = Decimal::from(1000);

    if max_pow > min_pow && !max.is_zero() {
        if (min / pow_decimal(base, max_pow)).abs() > thousand {
            return min_pow;
        }
        return max_pow;
    }
    if min_pow > max_pow && !min.is_zero() {
        if (max / pow_decimal(base, min_pow)).abs() > thousand {
            return max_pow;
        }
        return min_pow;
    }
    max_pow
}

/// Longest fraction among already formatted labels, if any has one.
pub fn fraction_len<S: AsRef<str>>(labels: &[S]) -> Option<usize> {
    labels
        .iter()
        .filter_map(|s| {
            let number = s.as_ref().split_whitespace().next()?;
            number.split_once('.').map(|(_, frac)| frac.len())
        })
        .max()
}

/// Round half away from zero.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn pow_decimal(base: Decimal, pow: u32) -> Decimal {
    (0..pow).fold(Decimal::ONE, |acc, _| acc * base)
}

/// Unprefixed number: two decimals above 0.01, otherwise up to six.
fn plain_number(value: Decimal) -> String {
    let dp = if value.abs() >= Decimal::new(1, 2) { 2 } else { 6 };
    let v = round_half_up(value, dp);
    trim_number(v)
}

fn trim_number(value: Decimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    value.normalize().to_string()
}

fn join(number: &str, suffix: &str) -> String {
    format!("{number} {suffix}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn bytes_use_1024() {
        assert_eq!(format_value(dec!(6442450944), &FormatOptions::new("B")), "6 GB");
        assert_eq!(format_value(dec!(1536), &FormatOptions::new("Bps")), "1.5 KBps");
    }

    #[test]
    fn metric_prefixes() {
        assert_eq!(format_value(dec!(2500000), &FormatOptions::new("bps")), "2.5 Mbps");
        assert_eq!(format_value(dec!(0.12345), &FormatOptions::new("V")), "0.1235 V");
    }

    #[test]
    fn unprefixed_units() {
        assert_eq!(format_value(dec!(99.999), &FormatOptions::new("%")), "100 %");
        assert_eq!(format_value(dec!(1234567), &FormatOptions::new("")), "1234567");
        let axis = FormatOptions { prefix_without_units: true, ..FormatOptions::new("") };
        assert_eq!(format_value(dec!(1234567), &axis), "1.23 M");
    }

    #[test]
    fn seconds_spelled_out() {
        assert_eq!(format_seconds(dec!(93784), true), "1d 2h 3m");
        assert_eq!(format_seconds(dec!(61.5), false), "1m 1s 500ms");
        assert_eq!(format_seconds(dec!(0), false), "0");
    }

    #[test]
    fn common_pow_prefers_the_larger() {
        assert_eq!(common_pow(dec!(0), dec!(2000000), false), 2);
        assert_eq!(common_pow(dec!(500), dec!(2000), false), 1);
    }

    #[test]
    fn fixed_pow_and_length() {
        let opts = FormatOptions { pow: Some(1), length: Some(1), ..FormatOptions::new("B") };
        assert_eq!(format_value(dec!(512), &opts), "0.5 KB");
    }
}
