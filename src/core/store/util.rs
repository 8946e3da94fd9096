use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::well_known::Rfc3339,
    macros::format_description,
};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 7;
const SECONDS_PER_DAY: f64 = 86_400.0;

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Record id: base36 millisecond timestamp followed by a random base36 suffix.
pub fn generate_id(now: OffsetDateTime) -> String {
    let millis = (now.unix_timestamp_nanos() / 1_000_000).max(0) as u128;
    let random = Uuid::new_v4();
    let suffix: String = random
        .as_bytes()
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| BASE36[(*b as usize) % 36] as char)
        .collect();
    format!("{}{}", to_base36(millis), suffix)
}

pub fn format_timestamp(ts: OffsetDateTime) -> String {
    // Rfc3339 only rejects years outside 0..=9999
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

/// Parse either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (UTC midnight).
pub fn parse_iso(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(ts) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(ts);
    }
    let date = Date::parse(value, format_description!("[year]-[month]-[day]")).ok()?;
    Some(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

/// Money amounts are stored as JSON numbers, which cannot hold NaN or
/// infinities. Non-finite input becomes 0.
pub fn finite_or_zero(amount: f64) -> f64 {
    if amount.is_finite() { amount } else { 0.0 }
}

/// Deserialize an amount, reading `null` (how NaN was once written) as 0.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(0.0, finite_or_zero))
}

/// Whole nights between two ISO values, rounded up and never negative.
/// Unparsable input counts as zero nights.
pub fn nights_between(start: &str, end: &str) -> u32 {
    match (parse_iso(start), parse_iso(end)) {
        (Some(start), Some(end)) => {
            let days = (end - start).as_seconds_f64() / SECONDS_PER_DAY;
            days.ceil().max(0.0) as u32
        }
        _ => 0,
    }
}
