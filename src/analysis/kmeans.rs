use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub type Point3 = [f64; 3];

/// Seeded Lloyd's k-means with k-means++ seeding and several restarts.
///
/// A single generator is seeded once per `fit` call and consumed by every
/// restart in order, so identical inputs always yield identical centers.
#[derive(Debug, Clone)]
pub struct KMeans {
    clusters: usize,
    initializations: usize,
    max_iterations: usize,
    tolerance: f64,
    seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub centers: Vec<Point3>,
    pub inertia: f64,
}

impl KMeans {
    pub fn new(clusters: usize) -> Self {
        Self {
            clusters,
            initializations: 10,
            max_iterations: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }

    pub fn with_initializations(mut self, initializations: usize) -> Self {
        self.initializations = initializations.max(1);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Cluster `points`; `k` shrinks to the number of points when fewer are given.
    pub fn fit(&self, points: &[Point3]) -> Option<Clustering> {
        let k = self.clusters.min(points.len());
        if k == 0 {
            return None;
        }

        let threshold = self.tolerance * mean_variance(points);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<Clustering> = None;

        for _ in 0..self.initializations {
            let seeds = plus_plus_init(points, k, &mut rng);
            let run = self.lloyd(points, seeds, threshold);
            // strict comparison keeps the earliest restart on ties
            if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        best
    }

    fn lloyd(&self, points: &[Point3], mut centers: Vec<Point3>, threshold: f64) -> Clustering {
        let mut labels = vec![0usize; points.len()];

        for _ in 0..self.max_iterations {
            assign(points, &centers, &mut labels);

            let mut sums = vec![[0.0f64; 3]; centers.len()];
            let mut counts = vec![0usize; centers.len()];
            for (p, &label) in points.iter().zip(&labels) {
                for c in 0..3 {
                    sums[label][c] += p[c];
                }
                counts[label] += 1;
            }

            let mut shift = 0.0;
            for (j, center) in centers.iter_mut().enumerate() {
                // empty clusters keep their previous position
                if counts[j] == 0 {
                    continue;
                }
                let updated = [
                    sums[j][0] / counts[j] as f64,
                    sums[j][1] / counts[j] as f64,
                    sums[j][2] / counts[j] as f64,
                ];
                shift += squared_distance(center, &updated);
                *center = updated;
            }

            if shift <= threshold {
                break;
            }
        }

        let inertia = assign(points, &centers, &mut labels);
        Clustering { centers, inertia }
    }
}

fn plus_plus_init(points: &[Point3], k: usize, rng: &mut StdRng) -> Vec<Point3> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.random_range(0..points.len())]);

    let mut closest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centers[0]))
        .collect();

    while centers.len() < k {
        let total: f64 = closest.iter().sum();
        let index = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, d) in closest.iter().enumerate() {
                if target < *d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            rng.random_range(0..points.len())
        };

        let center = points[index];
        for (p, d) in points.iter().zip(closest.iter_mut()) {
            *d = d.min(squared_distance(p, &center));
        }
        centers.push(center);
    }

    centers
}

/// Label every point with its nearest center (first wins on ties); returns the inertia.
fn assign(points: &[Point3], centers: &[Point3], labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (p, label) in points.iter().zip(labels.iter_mut()) {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (j, c) in centers.iter().enumerate() {
            let d = squared_distance(p, c);
            if d < best_distance {
                best = j;
                best_distance = d;
            }
        }
        *label = best;
        inertia += best_distance;
    }
    inertia
}

fn squared_distance(a: &Point3, b: &Point3) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn mean_variance(points: &[Point3]) -> f64 {
    let n = points.len() as f64;
    let mut variance = 0.0;
    for c in 0..3 {
        let mean = points.iter().map(|p| p[c]).sum::<f64>() / n;
        variance += points.iter().map(|p| (p[c] - mean).powi(2)).sum::<f64>() / n;
    }
    variance / 3.0
}
