// src/stats/cluster.rs

//! Seeded k-means over standardized indicator features.
//!
//! Fitting uses k-means++ seeding and Lloyd iterations, repeated
//! `restarts` times from one `StdRng`; the lowest-inertia run wins. Cluster
//! ids are arbitrary, so names are attached afterwards by [`LabelScheme`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use super::error::{StatsError, StatsResult};
use super::features::FeatureMatrix;
use crate::config::AnalysisConfig;
use crate::table::{Indicator, IndicatorTable};

const RANKED_NAMES: [&str; 3] = ["Developed", "Emerging", "At-Risk"];

/// How cluster ids are turned into names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelScheme {
    /// Rank clusters by the mean of their standardized centroid, highest first.
    /// Coordinates of indicators where higher is worse count negatively.
    #[default]
    CentroidRank,
    /// Name clusters in raw id order.
    ById,
}

impl LabelScheme {
    /// One name per cluster id; `indicators` gives the column of each
    /// centroid coordinate.
    pub fn names(&self, centroids: &[Vec<f64>], indicators: &[Indicator]) -> Vec<String> {
        let k = centroids.len();
        let mut ranks = vec![0; k];
        match self {
            LabelScheme::ById => ranks.iter_mut().enumerate().for_each(|(i, r)| *r = i),
            LabelScheme::CentroidRank => {
                let score = |c: &Vec<f64>| {
                    let total: f64 = c
                        .iter()
                        .zip(indicators)
                        .map(|(x, ind)| if ind.higher_is_better() { *x } else { -x })
                        .sum();
                    total / c.len().max(1) as f64
                };
                let mut order: Vec<usize> = (0..k).collect();
                order.sort_by(|&a, &b| {
                    score(&centroids[b])
                        .partial_cmp(&score(&centroids[a]))
                        .unwrap_or(Ordering::Equal)
                        .then(a.cmp(&b))
                });
                for (rank, id) in order.into_iter().enumerate() {
                    ranks[id] = rank;
                }
            }
        }
        ranks
            .into_iter()
            .map(|r| match RANKED_NAMES.get(r) {
                Some(name) => name.to_string(),
                None => format!("Cluster {r}"),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansConfig {
    pub k: usize,
    pub seed: u64,
    pub restarts: usize,
    pub max_iterations: usize,
    pub label_scheme: LabelScheme,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 3,
            seed: 42,
            restarts: 10,
            max_iterations: 300,
            label_scheme: LabelScheme::default(),
        }
    }
}

impl From<&AnalysisConfig> for KMeansConfig {
    fn from(a: &AnalysisConfig) -> Self {
        Self {
            k: a.clusters,
            seed: a.cluster_seed,
            restarts: a.cluster_restarts,
            label_scheme: a.label_scheme,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterAssignment {
    pub country: String,
    pub country_code: String,
    pub cluster: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterResult {
    pub year: i32,
    pub indicators: Vec<Indicator>,
    pub assignments: Vec<ClusterAssignment>,
    /// Centroids in standardized units, indexed by cluster id.
    pub centroids: Vec<Vec<f64>>,
    /// Name of each cluster id.
    pub labels: Vec<String>,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
}

/// Cluster the countries of `year` on `indicators`.
///
/// Rows missing any indicator are skipped. Needs at least two indicators
/// and at least `k` complete rows.
pub fn assign_clusters(
    table: &IndicatorTable,
    indicators: &[Indicator],
    year: i32,
    config: &KMeansConfig,
) -> StatsResult<ClusterResult> {
    if config.k == 0 {
        return Err(StatsError::InvalidArgument("k must be at least 1".into()));
    }
    if config.restarts == 0 {
        return Err(StatsError::InvalidArgument(
            "restarts must be at least 1".into(),
        ));
    }
    if config.max_iterations == 0 {
        return Err(StatsError::InvalidArgument(
            "max_iterations must be at least 1".into(),
        ));
    }
    let features = FeatureMatrix::standardized(table, indicators, year, config.k)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<Fit> = None;
    for run in 0..config.restarts {
        let init = init_plus_plus(&features.data, config.k, &mut rng);
        let fit = lloyd(&features.data, init, config.max_iterations);
        debug!(run, inertia = fit.inertia, iterations = fit.iterations, "k-means run");
        if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
            best = Some(fit);
        }
    }
    let best = best.ok_or(StatsError::NoData)?;

    let labels = config.label_scheme.names(&best.centroids, indicators);
    let assignments = features
        .rows
        .iter()
        .zip(&best.labels)
        .map(|(&r, &c)| ClusterAssignment {
            country: table.country(r).to_string(),
            country_code: table.country_code(r).to_string(),
            cluster: c,
            label: labels[c].clone(),
        })
        .collect();

    debug!(year, k = config.k, n = features.len(), inertia = best.inertia, "clusters");
    Ok(ClusterResult {
        year,
        indicators: indicators.to_vec(),
        assignments,
        centroids: best.centroids,
        labels,
        inertia: best.inertia,
    })
}

struct Fit {
    labels: Vec<usize>,
    centroids: Vec<Vec<f64>>,
    inertia: f64,
    iterations: usize,
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    centroids
        .iter()
        .map(|c| squared_distance(point, c))
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, d)| if d < best.1 { (i, d) } else { best })
}

/// k-means++ seeding: each next centroid is drawn with probability
/// proportional to its squared distance from the closest chosen one.
fn init_plus_plus(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.gen_range(0..data.len())].clone());

    while centroids.len() < k {
        let dists: Vec<f64> = data.iter().map(|p| nearest(p, &centroids).1).collect();
        let total: f64 = dists.iter().sum();
        if total == 0.0 {
            centroids.push(data[rng.gen_range(0..data.len())].clone());
            continue;
        }
        let mut target = rng.gen::<f64>() * total;
        let mut pick = data.len() - 1;
        for (i, d) in dists.iter().enumerate() {
            if target < *d {
                pick = i;
                break;
            }
            target -= d;
        }
        centroids.push(data[pick].clone());
    }
    centroids
}

fn lloyd(data: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, max_iterations: usize) -> Fit {
    let k = centroids.len();
    let width = data.first().map_or(0, Vec::len);
    let mut labels = vec![usize::MAX; data.len()];
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;
        let mut changed = false;
        for (label, point) in labels.iter_mut().zip(data) {
            let (c, _) = nearest(point, &centroids);
            if *label != c {
                *label = c;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![vec![0.0; width]; k];
        let mut counts = vec![0usize; k];
        for (&c, point) in labels.iter().zip(data) {
            counts[c] += 1;
            for (s, x) in sums[c].iter_mut().zip(point) {
                *s += x;
            }
        }
        for c in 0..k {
            // empty clusters keep their previous centroid
            if counts[c] > 0 {
                centroids[c] = sums[c].iter().map(|s| s / counts[c] as f64).collect();
            }
        }
    }

    let inertia = labels
        .iter()
        .zip(data)
        .map(|(&c, p)| squared_distance(p, &centroids[c]))
        .sum();
    Fit {
        labels,
        centroids,
        inertia,
        iterations,
    }
}
