use nalgebra::{Cholesky, DMatrix, DVector};

use crate::{
    traits::{PathSmoother, SmoothOutcome},
    types::{Path, Point},
};

/// Least-squares cubic B-spline smoothing with a moving-average fallback.
///
/// A clamped cubic B-spline is fit to the path's points under chord-length
/// parameterization and resampled at `num_points` evenly spaced parameters.
/// The control point count shrinks as `smoothing` grows, trading fidelity
/// for smoothness. When the normal equations are not positive definite the
/// fit is abandoned and a moving-average pass is applied instead; that
/// outcome is reported to the caller rather than silently substituted.
#[derive(Debug, Clone)]
pub struct SplineSmoother {
    /// Smoothing factor, scaled internally by the point count.
    pub smoothing: f64,
    /// Number of samples taken along the fitted curve.
    pub num_points: usize,
}

impl Default for SplineSmoother {
    fn default() -> Self {
        Self {
            smoothing: 0.002,
            num_points: 200,
        }
    }
}

const DEGREE: usize = 3;

/// Cox-de Boor basis function N_{i,k} over `knots`, with the final span
/// treated as closed so t = 1 lands on the last control point.
fn basis(knots: &[f64], i: usize, k: usize, t: f64) -> f64 {
    if k == 0 {
        let last = *knots.last().unwrap_or(&1.0);
        let closes_top = t >= last && knots[i] < knots[i + 1] && t <= knots[i + 1];
        return if (knots[i] <= t && t < knots[i + 1]) || closes_top {
            1.0
        } else {
            0.0
        };
    }
    let mut value = 0.0;
    let left = knots[i + k] - knots[i];
    if left > 0.0 {
        value += (t - knots[i]) / left * basis(knots, i, k - 1, t);
    }
    let right = knots[i + k + 1] - knots[i + 1];
    if right > 0.0 {
        value += (knots[i + k + 1] - t) / right * basis(knots, i + 1, k - 1, t);
    }
    value
}

/// Clamped uniform knot vector for `n_ctrl` cubic control points.
fn clamped_knots(n_ctrl: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(n_ctrl + DEGREE + 1);
    let interior = n_ctrl - DEGREE;
    knots.extend(std::iter::repeat(0.0).take(DEGREE + 1));
    for i in 1..interior {
        knots.push(i as f64 / interior as f64);
    }
    knots.extend(std::iter::repeat(1.0).take(DEGREE + 1));
    knots
}

/// Chord-length parameters in [0, 1], one per point.
fn chord_parameters(points: &[Point]) -> Option<Vec<f64>> {
    let mut params = Vec::with_capacity(points.len());
    params.push(0.0);
    let mut total = 0.0;
    for w in points.windows(2) {
        total += w[0].distance(&w[1]);
        params.push(total);
    }
    if total <= 0.0 {
        return None;
    }
    for p in &mut params {
        *p /= total;
    }
    Some(params)
}

fn dedup_consecutive(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    out
}

/// Valid-region moving average: the output has `n - window + 1` points.
fn moving_average(points: &[Point], window: usize) -> Vec<Point> {
    let n = points.len();
    let mut out = Vec::with_capacity(n - window + 1);
    for i in 0..=(n - window) {
        let (mut sx, mut sy) = (0.0, 0.0);
        for p in &points[i..i + window] {
            sx += p.x;
            sy += p.y;
        }
        out.push(Point::new(sx / window as f64, sy / window as f64));
    }
    out
}

impl SplineSmoother {
    fn control_count(&self, n: usize) -> usize {
        let s = self.smoothing * n as f64;
        let raw = (n as f64 / (1.0 + s)).round() as usize;
        raw.clamp(DEGREE + 1, n)
    }

    fn fit(&self, points: &[Point]) -> Option<Vec<Point>> {
        let n = points.len();
        let params = chord_parameters(points)?;
        let n_ctrl = self.control_count(n);
        let knots = clamped_knots(n_ctrl);

        let b = DMatrix::from_fn(n, n_ctrl, |row, col| basis(&knots, col, DEGREE, params[row]));
        let bt = b.transpose();
        let normal = &bt * &b;
        let chol = Cholesky::new(normal)?;

        let px = DVector::from_iterator(n, points.iter().map(|p| p.x));
        let py = DVector::from_iterator(n, points.iter().map(|p| p.y));
        let cx = chol.solve(&(&bt * px));
        let cy = chol.solve(&(&bt * py));

        let denom = (self.num_points.saturating_sub(1)).max(1) as f64;
        let mut out = Vec::with_capacity(self.num_points);
        for j in 0..self.num_points {
            let t = j as f64 / denom;
            let (mut x, mut y) = (0.0, 0.0);
            for i in 0..n_ctrl {
                let w = basis(&knots, i, DEGREE, t);
                x += w * cx[i];
                y += w * cy[i];
            }
            if !x.is_finite() || !y.is_finite() {
                return None;
            }
            out.push(Point::new(x, y));
        }
        Some(out)
    }
}

impl PathSmoother for SplineSmoother {
    fn smooth(&self, path: &Path) -> SmoothOutcome {
        let unique = dedup_consecutive(&path.points);
        if unique.len() <= DEGREE {
            return SmoothOutcome::Unchanged(path.clone());
        }

        if let Some(points) = self.fit(&unique) {
            return SmoothOutcome::Fitted(Path::new(points, path.kind));
        }

        let window = 5.min(unique.len() / 2);
        if window <= 1 {
            return SmoothOutcome::Unchanged(path.clone());
        }
        SmoothOutcome::Fallback(Path::new(moving_average(&unique, window), path.kind))
    }
}
