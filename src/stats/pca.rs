// src/stats/pca.rs

//! Two-component principal component analysis over standardized indicators.
//!
//! The covariance matrix is small (one row per indicator), so it is
//! diagonalized directly with cyclic Jacobi rotations.

use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use super::error::{StatsError, StatsResult};
use super::features::FeatureMatrix;
use crate::table::{Indicator, IndicatorTable};

const JACOBI_TOLERANCE: f64 = 1e-12;
const JACOBI_MAX_SWEEPS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PcaPoint {
    pub country: String,
    pub country_code: String,
    pub pc1: f64,
    pub pc2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PcaResult {
    pub year: i32,
    pub indicators: Vec<Indicator>,
    /// Share of total variance carried by PC1 and PC2.
    pub explained_variance_ratio: [f64; 2],
    /// Unit loading vectors of PC1 and PC2, one weight per indicator.
    pub components: [Vec<f64>; 2],
    pub points: Vec<PcaPoint>,
}

/// Eigen-decomposition of a symmetric matrix.
///
/// Returns eigenvalues in descending order and the matching eigenvectors as
/// columns of the second matrix (`vectors[row][col]`).
pub fn symmetric_eigen(matrix: &[Vec<f64>]) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = matrix.len();
    let mut a = matrix.to_vec();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let scale = a
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, x| acc.max(x.abs()))
        .max(f64::MIN_POSITIVE);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| a[i][j].abs())
            .fold(0.0, f64::max);
        if off <= JACOBI_TOLERANCE * scale {
            break;
        }

        for p in 0..n {
            for q in p + 1..n {
                if a[p][q] == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let (akp, akq) = (a[k][p], a[k][q]);
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let values: Vec<f64> = (0..n).map(|i| a[i][i]).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| values[j].partial_cmp(&values[i]).unwrap_or(Ordering::Equal));

    let sorted_values = order.iter().map(|&i| values[i]).collect();
    let sorted_vectors = (0..n)
        .map(|row| order.iter().map(|&col| v[row][col]).collect())
        .collect();
    (sorted_values, sorted_vectors)
}

/// Project the `year` slice onto its first two principal components.
///
/// Rows missing any of `indicators` are left out.
pub fn pca_projection(
    table: &IndicatorTable,
    indicators: &[Indicator],
    year: i32,
) -> StatsResult<PcaResult> {
    let features = FeatureMatrix::standardized(table, indicators, year, 2)?;
    let k = features.width();
    let n = features.len();

    let mut cov = vec![vec![0.0; k]; k];
    for row in &features.data {
        for i in 0..k {
            for j in 0..k {
                cov[i][j] += row[i] * row[j];
            }
        }
    }
    for cell in cov.iter_mut().flatten() {
        *cell /= (n - 1) as f64;
    }

    let (eigenvalues, vectors) = symmetric_eigen(&cov);
    let eigenvalues: Vec<f64> = eigenvalues.into_iter().map(|l| l.max(0.0)).collect();
    let total: f64 = eigenvalues.iter().sum();
    if total == 0.0 {
        return Err(StatsError::DivisionByZero("total variance"));
    }

    let components: [Vec<f64>; 2] = [0, 1].map(|c| {
        let mut w: Vec<f64> = (0..k).map(|row| vectors[row][c]).collect();
        // Fix the sign: the largest-magnitude loading is positive.
        let pivot = w
            .iter()
            .copied()
            .max_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal))
            .unwrap_or(0.0);
        if pivot < 0.0 {
            w.iter_mut().for_each(|x| *x = -*x);
        }
        w
    });

    let project = |row: &[f64], c: usize| -> f64 {
        row.iter().zip(&components[c]).map(|(x, w)| x * w).sum()
    };
    let points = features
        .rows
        .iter()
        .zip(&features.data)
        .map(|(&r, row)| PcaPoint {
            country: table.country(r).to_string(),
            country_code: table.country_code(r).to_string(),
            pc1: project(row, 0),
            pc2: project(row, 1),
        })
        .collect();

    let ratio = [eigenvalues[0] / total, eigenvalues[1] / total];
    debug!(year, n, k, pc1 = ratio[0], pc2 = ratio[1], "pca");

    Ok(PcaResult {
        year,
        indicators: indicators.to_vec(),
        explained_variance_ratio: ratio,
        components,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableBuilder;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn eigen_of_diagonal_and_2x2() {
        let (vals, _) = symmetric_eigen(&[vec![1.0, 0.0], vec![0.0, 3.0]]);
        assert_eq!(vals, vec![3.0, 1.0]);

        let (vals, vecs) = symmetric_eigen(&[vec![2.0, 1.0], vec![1.0, 2.0]]);
        assert!(close(vals[0], 3.0, 1e-10));
        assert!(close(vals[1], 1.0, 1e-10));
        // leading eigenvector ∝ (1, 1)
        assert!(close(vecs[0][0].abs(), vecs[1][0].abs(), 1e-10));
    }

    #[test]
    fn eigen_vectors_reconstruct_matrix() {
        let m = vec![
            vec![4.0, 1.0, 0.5],
            vec![1.0, 3.0, 0.2],
            vec![0.5, 0.2, 1.0],
        ];
        let (vals, vecs) = symmetric_eigen(&m);
        for i in 0..3 {
            for j in 0..3 {
                let r: f64 = (0..3).map(|c| vecs[i][c] * vals[c] * vecs[j][c]).sum();
                assert!(close(r, m[i][j], 1e-9), "entry {i},{j}: {r} vs {}", m[i][j]);
            }
        }
    }

    fn table() -> IndicatorTable {
        let inds = [
            Indicator::GdpPerCapita,
            Indicator::LifeExpectancy,
            Indicator::LiteracyRate,
        ];
        let mut b = TableBuilder::new(&inds);
        let rows = [
            ("A", 1.0, 2.0, 5.0),
            ("B", 2.0, 4.1, 3.0),
            ("C", 3.0, 5.9, 6.0),
            ("D", 4.0, 8.2, 2.0),
            ("E", 5.0, 9.8, 4.0),
        ];
        for (c, x, y, z) in rows {
            b.push_row(c, c, 2020, &[Some(x), Some(y), Some(z)]).unwrap();
        }
        b.push_row("F", "F", 2020, &[Some(1.0), None, Some(1.0)])
            .unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn projection_is_deterministic_and_ordered() {
        let t = table();
        let inds = t.indicators().to_vec();
        let a = pca_projection(&t, &inds, 2020).unwrap();
        let b = pca_projection(&t, &inds, 2020).unwrap();
        assert_eq!(a, b);

        assert_eq!(a.points.len(), 5);
        assert!(a.points.iter().all(|p| p.country != "F"));
        let [r1, r2] = a.explained_variance_ratio;
        assert!(r1 >= r2 && r2 >= 0.0);
        assert!(r1 + r2 <= 1.0 + 1e-12);
        // two nearly collinear columns out of three
        assert!(r1 > 0.6);

        // components are unit vectors with a positive dominant loading
        for comp in &a.components {
            let norm: f64 = comp.iter().map(|w| w * w).sum();
            assert!(close(norm, 1.0, 1e-9));
            let dominant = comp
                .iter()
                .copied()
                .max_by(|x, y| x.abs().partial_cmp(&y.abs()).unwrap())
                .unwrap();
            assert!(dominant > 0.0);
        }

        // scores are centered
        let mean_pc1: f64 = a.points.iter().map(|p| p.pc1).sum::<f64>() / 5.0;
        assert!(close(mean_pc1, 0.0, 1e-9));
    }

    #[test]
    fn needs_two_indicators_and_rows() {
        let t = table();
        assert!(matches!(
            pca_projection(&t, &[Indicator::GdpPerCapita], 2020),
            Err(StatsError::InvalidArgument(_))
        ));
        assert!(matches!(
            pca_projection(&t, &[Indicator::GdpPerCapita, Indicator::LiteracyRate], 1999),
            Err(StatsError::InsufficientData { .. })
        ));
    }
}
