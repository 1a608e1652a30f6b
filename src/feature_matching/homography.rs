//! Planar homography estimation: normalized DLT plus a seeded RANSAC wrapper.

use crate::config::RansacConfig;
use nalgebra::{DMatrix, Matrix3, SymmetricEigen, Vector3};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Points needed for a minimal homography sample
pub const MIN_SAMPLE: usize = 4;

/// Project a point through `h`. Returns `None` at infinity.
pub fn project(h: &Matrix3<f64>, x: f64, y: f64) -> Option<[f64; 2]> {
    let p = h * Vector3::new(x, y, 1.0);
    if p[2].abs() < 1e-12 || !p[0].is_finite() || !p[1].is_finite() {
        return None;
    }
    Some([p[0] / p[2], p[1] / p[2]])
}

fn reprojection_error(h: &Matrix3<f64>, src: &[f64; 2], dst: &[f64; 2]) -> f64 {
    match project(h, src[0], src[1]) {
        Some(p) => ((p[0] - dst[0]).powi(2) + (p[1] - dst[1]).powi(2)).sqrt(),
        None => f64::INFINITY,
    }
}

/// Translate centroid to origin, scale mean distance to sqrt(2)
fn normalize_points(pts: &[[f64; 2]]) -> (Matrix3<f64>, Vec<[f64; 2]>) {
    let n = pts.len() as f64;
    let cx = pts.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy = pts.iter().map(|p| p[1]).sum::<f64>() / n;
    let mean_dist = pts
        .iter()
        .map(|p| ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    let s = if mean_dist > 1e-12 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = pts.iter().map(|p| [s * (p[0] - cx), s * (p[1] - cy)]).collect();
    (t, normalized)
}

/// Direct linear transform from >= 4 correspondences, `dst ~ H * src`.
pub fn estimate_dlt(src: &[[f64; 2]], dst: &[[f64; 2]]) -> Option<Matrix3<f64>> {
    let n = src.len();
    if n < MIN_SAMPLE || dst.len() != n {
        return None;
    }

    let (t_src, src_n) = normalize_points(src);
    let (t_dst, dst_n) = normalize_points(dst);

    let mut a = DMatrix::<f64>::zeros(2 * n, 9);
    for i in 0..n {
        let [sx, sy] = src_n[i];
        let [dx, dy] = dst_n[i];

        a[(2 * i, 3)] = -sx;
        a[(2 * i, 4)] = -sy;
        a[(2 * i, 5)] = -1.0;
        a[(2 * i, 6)] = dy * sx;
        a[(2 * i, 7)] = dy * sy;
        a[(2 * i, 8)] = dy;

        a[(2 * i + 1, 0)] = sx;
        a[(2 * i + 1, 1)] = sy;
        a[(2 * i + 1, 2)] = 1.0;
        a[(2 * i + 1, 6)] = -dx * sx;
        a[(2 * i + 1, 7)] = -dx * sy;
        a[(2 * i + 1, 8)] = -dx;
    }

    // Null vector = eigenvector of the smallest eigenvalue of A^T A
    let eig = SymmetricEigen::new(a.transpose() * &a);
    let min_idx = eig
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|l, r| l.1.abs().total_cmp(&r.1.abs()))
        .map(|(i, _)| i)?;
    let v = eig.eigenvectors.column(min_idx);
    let h_norm = Matrix3::new(v[0], v[1], v[2], v[3], v[4], v[5], v[6], v[7], v[8]);

    let h = t_dst.try_inverse()? * h_norm * t_src;
    let scale = h[(2, 2)];
    let h = if scale.abs() > 1e-12 { h / scale } else { h };
    h.iter().all(|v| v.is_finite()).then_some(h)
}

/// Three (nearly) collinear source points make the minimal sample degenerate
fn is_degenerate(pts: &[[f64; 2]]) -> bool {
    for i in 0..pts.len() {
        for j in (i + 1)..pts.len() {
            for k in (j + 1)..pts.len() {
                let cross = (pts[j][0] - pts[i][0]) * (pts[k][1] - pts[i][1])
                    - (pts[j][1] - pts[i][1]) * (pts[k][0] - pts[i][0]);
                if cross.abs() < 1e-6 {
                    return true;
                }
            }
        }
    }
    false
}

#[derive(Debug, Clone)]
pub struct HomographyFit {
    pub h: Matrix3<f64>,
    pub inlier_mask: Vec<bool>,
    pub inliers: usize,
}

fn count_inliers(h: &Matrix3<f64>, src: &[[f64; 2]], dst: &[[f64; 2]], threshold: f64) -> Vec<bool> {
    src.iter()
        .zip(dst)
        .map(|(s, d)| reprojection_error(h, s, d) <= threshold)
        .collect()
}

/// Fit a homography with RANSAC.
///
/// Sampling uses a fixed seed, so identical inputs always produce the same
/// fit. Returns `None` when no hypothesis reaches [`MIN_SAMPLE`] inliers.
pub fn fit_ransac(src: &[[f64; 2]], dst: &[[f64; 2]], config: &RansacConfig) -> Option<HomographyFit> {
    let n = src.len();
    if n < MIN_SAMPLE || dst.len() != n {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<HomographyFit> = None;
    let mut sample_src = [[0.0; 2]; MIN_SAMPLE];
    let mut sample_dst = [[0.0; 2]; MIN_SAMPLE];

    for _ in 0..config.max_iterations {
        let indices = rand::seq::index::sample(&mut rng, n, MIN_SAMPLE);
        for (slot, i) in indices.iter().enumerate() {
            sample_src[slot] = src[i];
            sample_dst[slot] = dst[i];
        }
        if is_degenerate(&sample_src) || is_degenerate(&sample_dst) {
            continue;
        }
        let Some(h) = estimate_dlt(&sample_src, &sample_dst) else {
            continue;
        };

        let mask = count_inliers(&h, src, dst, config.inlier_threshold);
        let inliers = mask.iter().filter(|&&m| m).count();
        if best.as_ref().is_none_or(|b| inliers > b.inliers) {
            best = Some(HomographyFit {
                h,
                inlier_mask: mask,
                inliers,
            });
            // Nearly everything agrees; more samples will not help
            if inliers * 10 > n * 9 {
                break;
            }
        }
    }

    let best = best.filter(|b| b.inliers >= MIN_SAMPLE)?;

    // Refit on the consensus set; keep it only if it does not lose support
    let inlier_src: Vec<[f64; 2]> = (0..n).filter(|&i| best.inlier_mask[i]).map(|i| src[i]).collect();
    let inlier_dst: Vec<[f64; 2]> = (0..n).filter(|&i| best.inlier_mask[i]).map(|i| dst[i]).collect();
    if let Some(h) = estimate_dlt(&inlier_src, &inlier_dst) {
        let mask = count_inliers(&h, src, dst, config.inlier_threshold);
        let inliers = mask.iter().filter(|&&m| m).count();
        if inliers >= best.inliers {
            return Some(HomographyFit {
                h,
                inlier_mask: mask,
                inliers,
            });
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn perspective() -> Matrix3<f64> {
        Matrix3::new(1.1, 0.05, 40.0, -0.03, 0.95, 12.0, 0.0002, -0.0001, 1.0)
    }

    fn grid(h: &Matrix3<f64>) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
        let mut src = Vec::new();
        let mut dst = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                let s = [i as f64 * 12.0 + 3.0, j as f64 * 9.0 + 1.0];
                src.push(s);
                dst.push(project(h, s[0], s[1]).unwrap());
            }
        }
        (src, dst)
    }

    #[test]
    fn test_dlt_recovers_exact_homography() {
        let h = perspective();
        let (src, dst) = grid(&h);
        let est = estimate_dlt(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(&dst) {
            assert!(reprojection_error(&est, s, d) < 1e-6);
        }
    }

    #[test]
    fn test_dlt_too_few_points() {
        let src = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        assert!(estimate_dlt(&src, &src).is_none());
    }

    #[test]
    fn test_pure_translation_projects_origin() {
        let src = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [4.0, 7.0]];
        let dst: Vec<[f64; 2]> = src.iter().map(|p| [p[0] + 100.0, p[1] + 20.0]).collect();
        let fit = fit_ransac(&src, &dst, &RansacConfig::default()).unwrap();
        let origin = project(&fit.h, 0.0, 0.0).unwrap();
        assert!((origin[0] - 100.0).abs() < 1e-6);
        assert!((origin[1] - 20.0).abs() < 1e-6);
        assert_eq!(fit.inliers, 5);
    }

    #[test]
    fn test_ransac_rejects_outliers() {
        let h = perspective();
        let (mut src, mut dst) = grid(&h);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..8 {
            src.push([rng.random_range(0.0..60.0), rng.random_range(0.0..45.0)]);
            dst.push([rng.random_range(0.0..640.0), rng.random_range(0.0..480.0)]);
        }

        let fit = fit_ransac(&src, &dst, &RansacConfig::default()).unwrap();
        assert!(fit.inliers >= 25, "only {} inliers", fit.inliers);
        assert!(fit.inlier_mask[..25].iter().all(|&m| m));
    }

    #[test]
    fn test_ransac_is_deterministic() {
        let h = perspective();
        let (mut src, mut dst) = grid(&h);
        src.push([1.0, 1.0]);
        dst.push([500.0, 3.0]);
        let config = RansacConfig::default();
        let a = fit_ransac(&src, &dst, &config).unwrap();
        let b = fit_ransac(&src, &dst, &config).unwrap();
        assert_eq!(a.inlier_mask, b.inlier_mask);
        assert_eq!(a.h, b.h);
    }

    #[test]
    fn test_collinear_points_have_no_fit() {
        let src: Vec<[f64; 2]> = (0..6).map(|i| [i as f64, 2.0 * i as f64]).collect();
        let dst = src.clone();
        assert!(fit_ransac(&src, &dst, &RansacConfig::default()).is_none());
    }
}
