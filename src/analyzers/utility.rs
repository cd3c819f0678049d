/// Percentage of `part` in `total`. Returns 0.0 when `total` is not positive.
pub fn pct(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        (part / total) * 100.0
    }
}

/// Rounds to one decimal place, the precision every displayed figure uses.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
