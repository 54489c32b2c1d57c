/// What to do with inputs that fall outside the interpolation domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extrapolate {
    Clamp,
    Extend,
}

/// Piecewise-linear mapping of `value` from `domain` onto `range`.
///
/// `domain` must be ascending and the same length as `range`. Degenerate
/// inputs (fewer than two stops, mismatched lengths) map to the first range
/// value, or 0.0 when `range` is empty.
pub fn interpolate(value: f64, domain: &[f64], range: &[f64], mode: Extrapolate) -> f64 {
    let stops = domain.len().min(range.len());
    if stops < 2 || domain.len() != range.len() {
        return range.first().copied().unwrap_or(0.0);
    }

    let last = stops - 1;
    if mode == Extrapolate::Clamp {
        if value <= domain[0] {
            return range[0];
        }
        if value >= domain[last] {
            return range[last];
        }
    }

    // Segment whose upper stop is the first one above `value`; the edge
    // segments are reused for extrapolation.
    let upper = domain
        .iter()
        .skip(1)
        .position(|&stop| value < stop)
        .map(|i| i + 1)
        .unwrap_or(last);
    let lower = upper - 1;

    let span = domain[upper] - domain[lower];
    if span.abs() <= f64::EPSILON {
        return range[upper];
    }
    let t = (value - domain[lower]) / span;
    range[lower] + t * (range[upper] - range[lower])
}
