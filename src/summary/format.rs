use crate::metrics::Measurement;

const US_PER_MS: u64 = 1_000;
const US_PER_SEC: u64 = 1_000_000;
/// Parts per million in one hundredth of a percent.
const PPM_PER_BASIS_POINT: u64 = 100;

/// Renders microseconds as `850µs`, `123.45ms` or `2.50s`.
#[must_use]
pub fn format_micros(micros: u64) -> String {
    if micros < US_PER_MS {
        return format!("{}µs", micros);
    }
    let (unit, scale) = if micros < US_PER_SEC {
        ("ms", US_PER_MS)
    } else {
        ("s", US_PER_SEC)
    };
    let whole = micros.checked_div(scale).unwrap_or(0);
    let hundredths = micros
        .checked_rem(scale)
        .and_then(|rest| rest.checked_div(scale.checked_div(100)?))
        .unwrap_or(0);
    format!("{}.{:02}{}", whole, hundredths, unit)
}

/// Renders a parts-per-million rate as a percentage with two decimals.
#[must_use]
pub fn format_ppm(ppm: u64) -> String {
    let basis_points = ppm.checked_div(PPM_PER_BASIS_POINT).unwrap_or(0);
    format!(
        "{}.{:02}%",
        basis_points.checked_div(100).unwrap_or(0),
        basis_points.checked_rem(100).unwrap_or(0)
    )
}

#[must_use]
pub fn format_measurement(measurement: &Measurement) -> String {
    match measurement {
        Measurement::NoData => "no data".to_owned(),
        Measurement::Micros(micros) => format_micros(*micros),
        Measurement::Rate(rate) => format!(
            "{} ({}/{})",
            format_ppm(rate.rate_ppm()),
            rate.trues,
            rate.total
        ),
        Measurement::Count(count) => count.to_string(),
    }
}
