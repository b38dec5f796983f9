//! Interval parsing

/// Convert an interval label (`1m`, `5m`, `15m`, `1h`, `4h`, `1d`) to milliseconds
pub fn parse_interval_millis(interval: &str) -> Option<i64> {
    let interval = interval.trim();
    let (split, unit) = interval.char_indices().last()?;
    let count: i64 = interval[..split].parse().ok().filter(|c| *c > 0)?;
    let unit_ms: i64 = match unit {
        'm' => 60_000,
        'h' => 3_600_000,
        'd' => 86_400_000,
        'w' => 604_800_000,
        _ => return None,
    };
    count.checked_mul(unit_ms)
}
