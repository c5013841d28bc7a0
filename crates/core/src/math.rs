//! Scalar helpers shared by the mapper, the layers and the controller.

/// Inclusive point-in-range test.
pub fn point_in_range(point: f64, x0: f64, x1: f64) -> bool {
    point >= x0 && point <= x1
}

/// Inclusive range intersection.
///
/// The endpoints of the narrower range are tested against the wider one, so
/// touching ranges (`a1 == b0`) intersect and the result does not depend on
/// argument order.
pub fn ranges_intersect(a0: f64, a1: f64, b0: f64, b1: f64) -> bool {
    if a1 - a0 > b1 - b0 {
        point_in_range(b0, a0, a1) || point_in_range(b1, a0, a1)
    } else {
        point_in_range(a0, b0, b1) || point_in_range(a1, b0, b1)
    }
}

/// Position of `value` inside `[x0, x1]`, measured from the numerically
/// smaller bound so either orientation works.
pub fn ratio(value: f64, x0: f64, x1: f64) -> f64 {
    let domain = (x1 - x0).abs();
    if x0 < x1 {
        (value - x0) / domain
    } else {
        (value - x1) / domain
    }
}

/// Map `value` from `[src0, src1]` to `[dst0, dst1]`.
///
/// `warp` reshapes the normalized ratio for non-linear scales; pass
/// [`identity`] for a linear mapping. A degenerate source interval yields a
/// non-finite ratio; callers that feed drawing code go through
/// [`convert_or_zero`].
pub fn convert_domain(
    value: f64,
    src0: f64,
    src1: f64,
    dst0: f64,
    dst1: f64,
    warp: impl Fn(f64) -> f64,
) -> f64 {
    let dst_domain = (dst1 - dst0).abs();
    let r = ratio(value, src0, src1);
    if dst0 < dst1 {
        dst0 + warp(r) * dst_domain
    } else {
        dst1 + warp(1.0 - r) * dst_domain
    }
}

/// Linear [`convert_domain`] that returns `0.0` instead of NaN/inf.
pub fn convert_or_zero(value: f64, src0: f64, src1: f64, dst0: f64, dst1: f64) -> f64 {
    let v = convert_domain(value, src0, src1, dst0, dst1, identity);
    if v.is_finite() { v } else { 0.0 }
}

pub fn identity(x: f64) -> f64 {
    x
}

/// Restrict `value` to `[min, max]`. The upper bound is checked first, so an
/// inverted pair (`min > max`) yields `max`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value > max {
        return max;
    }
    if value < min {
        return min;
    }
    value
}

/// Round `value` down to a multiple of `step` (toward zero for negatives).
pub fn align_number(value: f64, step: f64) -> f64 {
    value - value % step
}

/// `|value - target| <= epsilon`.
pub fn inexact_equal(value: f64, target: f64, epsilon: f64) -> bool {
    value >= target - epsilon && value <= target + epsilon
}
