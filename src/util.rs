/// Returns `value` if it is strictly above `floor`, otherwise `floor`.
/// NaN falls to `floor`.
pub fn floor_at(value: f64, floor: f64) -> f64 {
    if value > floor {
        value
    } else {
        floor
    }
}

/// Overwrites `slot` with `value` only when `value` is finite.
pub fn store_if_finite(slot: &mut f64, value: f64) -> bool {
    if value.is_finite() {
        *slot = value;
        true
    } else {
        false
    }
}

/// Overwrites both slots only when both values are finite.
pub fn store_pair_if_finite(slots: (&mut f64, &mut f64), values: (f64, f64)) -> bool {
    if values.0.is_finite() && values.1.is_finite() {
        *slots.0 = values.0;
        *slots.1 = values.1;
        true
    } else {
        false
    }
}

/// Usable sample period: strictly positive and finite.
pub fn is_valid_period(period_seconds: f64) -> bool {
    period_seconds.is_finite() && period_seconds > 0.0
}
