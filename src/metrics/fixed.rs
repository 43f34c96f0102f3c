/// Parses a non-negative decimal such as `0.05` or `1300.5` into an integer
/// scaled by `10^decimals`. Digits beyond `decimals` are rejected rather than
/// rounded.
pub(crate) fn parse_scaled(text: &str, decimals: u32) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().all(|ch| ch.is_ascii_digit())
        || !fraction.chars().all(|ch| ch.is_ascii_digit())
    {
        return None;
    }
    let fraction_len = u32::try_from(fraction.len()).ok()?;
    if fraction_len > decimals {
        return None;
    }

    let scale = 10u64.checked_pow(decimals)?;
    let whole_value: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().ok()?
    };
    let fraction_value: u64 = if fraction.is_empty() {
        0
    } else {
        let padding = 10u64.checked_pow(decimals.checked_sub(fraction_len)?)?;
        fraction.parse::<u64>().ok()?.checked_mul(padding)?
    };

    whole_value.checked_mul(scale)?.checked_add(fraction_value)
}
