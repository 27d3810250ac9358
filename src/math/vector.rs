//! Element-wise arithmetic on `[y, x]` pairs

/// Element-wise sum
pub fn add(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] + b[0], a[1] + b[1]]
}

/// Element-wise difference `a - b`
pub fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

/// Element-wise maximum
pub fn max(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0].max(b[0]), a[1].max(b[1])]
}

/// Element-wise minimum
pub fn min(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0].min(b[0]), a[1].min(b[1])]
}

/// Negate both components
pub fn neg(a: [f64; 2]) -> [f64; 2] {
    [-a[0], -a[1]]
}

/// Widen a pixel extent for mixed arithmetic
pub fn from_extent(extent: [usize; 2]) -> [f64; 2] {
    [extent[0] as f64, extent[1] as f64]
}

/// Split into integer part and fractional remainder, both truncated toward zero
///
/// `-1.3` splits into `(-1, -0.3)`, so the remainder keeps the sign of the input.
pub fn split_fraction(a: [f64; 2]) -> ([i64; 2], [f64; 2]) {
    let whole = [a[0].trunc(), a[1].trunc()];
    ([whole[0] as i64, whole[1] as i64], sub(a, whole))
}
