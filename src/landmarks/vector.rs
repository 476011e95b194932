//! Small fixed-size vector helpers for landmark geometry

pub type Vec2 = [f64; 2];
pub type Vec3 = [f64; 3];

pub fn sub2(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] - b[0], a[1] - b[1]]
}

pub fn dot2(a: Vec2, b: Vec2) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

pub fn length2(v: Vec2) -> f64 {
    dot2(v, v).sqrt()
}

pub fn distance2(a: Vec2, b: Vec2) -> f64 {
    length2(sub2(a, b))
}

/// Cosine of the angle between `a` and `b`, with `epsilon` guarding the
/// denominator. Zero-length inputs give 0.
pub fn cosine_similarity2(a: Vec2, b: Vec2, epsilon: f64) -> f64 {
    dot2(a, b) / (length2(a) * length2(b) + epsilon)
}

pub fn sub3(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn cross3(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn length3(v: Vec3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Scale `v` to unit length. `epsilon` is added to the length, so a
/// degenerate input yields the zero vector instead of NaN.
pub fn normalize3(v: Vec3, epsilon: f64) -> Vec3 {
    let len = length3(v) + epsilon;
    [v[0] / len, v[1] / len, v[2] / len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_product_axes() {
        assert_eq!(cross3([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        assert_eq!(cross3([0.0, 1.0, 0.0], [1.0, 0.0, 0.0]), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_normalize_degenerate_is_zero() {
        let n = normalize3([0.0, 0.0, 0.0], 1e-6);
        assert_eq!(n, [0.0, 0.0, 0.0]);

        let n = normalize3([3.0, 0.0, 4.0], 1e-6);
        assert!((length3(n) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity2([0.0, 2.0], [0.0, 3.0], 1e-6) - 1.0).abs() < 1e-5);
        assert!((cosine_similarity2([0.0, 2.0], [0.0, -3.0], 1e-6) + 1.0).abs() < 1e-5);
        assert_eq!(cosine_similarity2([0.0, 0.0], [1.0, 0.0], 1e-6), 0.0);
    }
}
