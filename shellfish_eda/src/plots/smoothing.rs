//! LOWESS trend line for scatter panels.
//!
//! Tricube-weighted local linear regression without robustness iterations.
//! Only used to draw a guide line over scatter plots.

/// Fraction of points in each local fit.
pub const DEFAULT_SPAN: f64 = 2.0 / 3.0;

/// Upper bound on the number of points evaluated along the curve.
pub const MAX_CURVE_POINTS: usize = 100;

/// Bandwidth factor applied when no point falls strictly inside the window.
const WIDEN: f64 = 1.000001;

fn tricube(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        let t = 1.0 - u * u * u;
        t * t * t
    }
}

/// Weighted sums (w, wx, wy, wxx, wxy) of a tricube window of half-width
/// `h` around `x0`.
fn window_sums(points: &[(f64, f64)], x0: f64, h: f64) -> (f64, f64, f64, f64, f64) {
    let (mut sw, mut swx, mut swy, mut swxx, mut swxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(x, y) in points {
        let d = (x - x0).abs();
        let w = if h > 0.0 {
            tricube(d / h)
        } else if d == 0.0 {
            1.0
        } else {
            0.0
        };
        sw += w;
        swx += w * x;
        swy += w * y;
        swxx += w * x * x;
        swxy += w * x * y;
    }
    (sw, swx, swy, swxx, swxy)
}

/// Local linear estimate at `x0` from `points`, using the `r` nearest
/// neighbours.
fn fit_at(points: &[(f64, f64)], x0: f64, r: usize) -> f64 {
    let mut distances: Vec<f64> = points.iter().map(|(x, _)| (x - x0).abs()).collect();
    let nth = r.saturating_sub(1).min(distances.len() - 1);
    let (_, h, _) = distances.select_nth_unstable_by(nth, |a, b| a.total_cmp(b));
    let h = *h;

    let mut sums = window_sums(points, x0, h);
    if sums.0 == 0.0 {
        // Every neighbour sits exactly at the window edge, where tricube
        // weight is zero. Widen the window just enough to include them.
        sums = window_sums(points, x0, h * WIDEN);
    }
    let (sw, swx, swy, swxx, swxy) = sums;

    let denom = sw * swxx - swx * swx;
    if denom.abs() <= f64::EPSILON * sw * swxx.max(1.0) {
        // All weight on a single x: fall back to the local mean.
        return swy / sw;
    }
    let slope = (sw * swxy - swx * swy) / denom;
    let intercept = (swy - slope * swx) / sw;
    intercept + slope * x0
}

/// Smoothed curve through `points`, evaluated at up to `MAX_CURVE_POINTS`
/// evenly spaced x positions across the data range. Returns an empty curve
/// for fewer than three points.
pub fn lowess_curve(points: &[(f64, f64)], span: f64) -> Vec<(f64, f64)> {
    let finite: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if finite.len() < 3 {
        return Vec::new();
    }

    let n = finite.len();
    let r = ((span * n as f64).ceil() as usize).clamp(2, n);

    let (min_x, max_x) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| (lo.min(*x), hi.max(*x)));
    if min_x == max_x {
        return vec![(min_x, fit_at(&finite, min_x, r))];
    }

    let steps = MAX_CURVE_POINTS.min(n).max(2);
    (0..steps)
        .map(|i| {
            let x0 = min_x + (max_x - min_x) * i as f64 / (steps - 1) as f64;
            (x0, fit_at(&finite, x0, r))
        })
        .filter(|(_, y)| y.is_finite())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_data_is_reproduced() {
        let points: Vec<(f64, f64)> = (0..20).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        let curve = lowess_curve(&points, DEFAULT_SPAN);
        assert_eq!(curve.len(), 20);
        for (x, y) in curve {
            assert_relative_eq!(y, 2.0 * x + 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_curve_spans_data_range() {
        let points = vec![(3.0, 1.0), (10.0, 4.0), (5.0, 2.0), (7.0, 2.5)];
        let curve = lowess_curve(&points, DEFAULT_SPAN);
        assert_eq!(curve.first().map(|p| p.0), Some(3.0));
        assert_eq!(curve.last().map(|p| p.0), Some(10.0));
    }

    #[test]
    fn test_constant_x_gives_local_mean() {
        let points = vec![(1.0, 2.0), (1.0, 4.0), (1.0, 6.0)];
        let curve = lowess_curve(&points, DEFAULT_SPAN);
        assert_eq!(curve.len(), 1);
        assert_relative_eq!(curve[0].1, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_too_few_points_gives_empty_curve() {
        assert!(lowess_curve(&[(1.0, 1.0), (2.0, 2.0)], DEFAULT_SPAN).is_empty());
        assert!(lowess_curve(&[(1.0, f64::NAN), (2.0, 2.0), (3.0, 1.0)], DEFAULT_SPAN).is_empty());
    }

    #[test]
    fn test_neighbours_on_window_edge_still_give_finite_fit() {
        // At x = 5 the two nearest neighbours are both exactly 5 away.
        let points = vec![(0.0, 1.0), (10.0, 2.0), (10.0, 3.0)];
        let curve = lowess_curve(&points, DEFAULT_SPAN);
        assert_eq!(curve.len(), 3);
        assert!(curve.iter().all(|(_, y)| y.is_finite()), "got {:?}", curve);
        assert_eq!(curve[1].0, 5.0);
        assert!(curve[1].1 >= 1.0 && curve[1].1 <= 3.0, "got {:?}", curve[1]);
    }

    #[test]
    fn test_two_clusters_give_finite_curve() {
        let mut points: Vec<(f64, f64)> = (0..5).map(|i| (1.0, i as f64)).collect();
        points.extend((0..5).map(|i| (300.0, 10.0 + i as f64)));
        let curve = lowess_curve(&points, DEFAULT_SPAN);
        assert!(!curve.is_empty());
        assert!(curve.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    }

    #[test]
    fn test_tricube_weights() {
        assert_eq!(tricube(0.0), 1.0);
        assert_eq!(tricube(1.0), 0.0);
        assert!(tricube(0.5) > 0.0 && tricube(0.5) < 1.0);
    }
}
