//! Team-vs-opponent win probability from a logistic-regression classifier.
//!
//! The classifier is fitted on synthetic games, not historical results. The
//! generator draws plausible per-game season averages for both teams and
//! labels a game a win when a fixed weighted sum of the (range-scaled)
//! team-minus-opponent differences plus noise comes out positive. Outputs
//! therefore only demonstrate the interface; they carry no real signal.
//!
//! Model: `P(win) = 1 / (1 + exp(-(b + w · z)))` where `z` is the feature
//! vector standardized with the training-set mean and standard deviation.

use super::features::{FeatureVector, FEATURE_LEN, TEAM_FEATURES};
use crate::config::PredictorConfig;
use crate::error::StatsError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Sampling range per canonical column (PTS, AST, REB, STL, BLK, FG%, FT%, 3P%).
const COLUMN_RANGES: [(f64, f64); TEAM_FEATURES] = [
    (100.0, 125.0),
    (20.0, 31.0),
    (40.0, 50.0),
    (6.0, 10.0),
    (3.0, 7.0),
    (0.43, 0.50),
    (0.72, 0.84),
    (0.33, 0.39),
];

/// Generative weight on each range-scaled difference.
const TRUE_WEIGHTS: [f64; TEAM_FEATURES] = [1.0, 0.4, 0.5, 0.3, 0.2, 0.8, 0.2, 0.5];

/// Half-width of the uniform label noise.
const NOISE: f64 = 0.6;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// One synthetic labelled game.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub features: FeatureVector,
    pub won: bool,
}

/// Reproducible synthetic training set.
pub fn synthetic_games(n: usize, seed: u64) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let mut team = [0.0; TEAM_FEATURES];
            let mut opponent = [0.0; TEAM_FEATURES];
            let mut score = 0.0;
            for (i, &(lo, hi)) in COLUMN_RANGES.iter().enumerate() {
                team[i] = rng.gen_range(lo..hi);
                opponent[i] = rng.gen_range(lo..hi);
                score += TRUE_WEIGHTS[i] * (team[i] - opponent[i]) / (hi - lo);
            }
            score += rng.gen_range(-NOISE..NOISE);
            Sample {
                features: FeatureVector::from_teams(team, opponent),
                won: score > 0.0,
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct LogisticModel {
    weights: [f64; FEATURE_LEN],
    bias: f64,
    means: [f64; FEATURE_LEN],
    scales: [f64; FEATURE_LEN],
}

impl LogisticModel {
    /// Batch gradient descent on the log-loss over standardized features.
    pub fn fit(samples: &[Sample], epochs: usize, learning_rate: f64) -> Self {
        let n = samples.len().max(1) as f64;

        let mut means = [0.0; FEATURE_LEN];
        for s in samples {
            for (m, x) in means.iter_mut().zip(s.features.as_slice()) {
                *m += x / n;
            }
        }
        let mut scales = [0.0; FEATURE_LEN];
        for s in samples {
            for ((v, x), m) in scales.iter_mut().zip(s.features.as_slice()).zip(&means) {
                *v += (x - m).powi(2) / n;
            }
        }
        for v in scales.iter_mut() {
            *v = if *v > 1e-12 { v.sqrt() } else { 1.0 };
        }

        let mut model = Self {
            weights: [0.0; FEATURE_LEN],
            bias: 0.0,
            means,
            scales,
        };

        let standardized: Vec<([f64; FEATURE_LEN], f64)> = samples
            .iter()
            .map(|s| (model.standardize(&s.features), if s.won { 1.0 } else { 0.0 }))
            .collect();

        for _ in 0..epochs {
            let mut grad_w = [0.0; FEATURE_LEN];
            let mut grad_b = 0.0;
            for (z, y) in &standardized {
                let err = sigmoid(model.logit(z)) - y;
                for (g, x) in grad_w.iter_mut().zip(z) {
                    *g += err * x;
                }
                grad_b += err;
            }
            for (w, g) in model.weights.iter_mut().zip(grad_w) {
                *w -= learning_rate * g / n;
            }
            model.bias -= learning_rate * grad_b / n;
        }

        model
    }

    fn standardize(&self, features: &FeatureVector) -> [f64; FEATURE_LEN] {
        let mut z = [0.0; FEATURE_LEN];
        for (i, x) in features.as_slice().iter().enumerate() {
            z[i] = (x - self.means[i]) / self.scales[i];
        }
        z
    }

    fn logit(&self, z: &[f64; FEATURE_LEN]) -> f64 {
        self.bias + self.weights.iter().zip(z).map(|(w, x)| w * x).sum::<f64>()
    }

    /// Probability the first team in `features` wins, in `[0, 1]`.
    pub fn predict_proba(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.logit(&self.standardize(features))).clamp(0.0, 1.0)
    }

    pub fn weights(&self) -> &[f64; FEATURE_LEN] {
        &self.weights
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub samples: usize,
    pub win_rate: f64,
    pub training_accuracy: f64,
}

/// Owns the fitted model. Retraining builds a fresh model and swaps it in,
/// so readers never observe a half-trained one.
pub struct Predictor {
    config: PredictorConfig,
    model: RwLock<Option<Arc<LogisticModel>>>,
}

impl Predictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self {
            config,
            model: RwLock::new(None),
        }
    }

    pub fn train(&self) -> TrainingSummary {
        let samples = synthetic_games(self.config.samples, self.config.seed);
        let model = LogisticModel::fit(&samples, self.config.epochs, self.config.learning_rate);

        let n = samples.len().max(1) as f64;
        let wins = samples.iter().filter(|s| s.won).count() as f64;
        let correct = samples
            .iter()
            .filter(|s| (model.predict_proba(&s.features) >= 0.5) == s.won)
            .count() as f64;
        let summary = TrainingSummary {
            samples: samples.len(),
            win_rate: wins / n,
            training_accuracy: correct / n,
        };

        *self.model.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(model));
        info!(
            samples = summary.samples,
            accuracy = summary.training_accuracy,
            "predictor trained on synthetic games"
        );
        summary
    }

    /// [`Predictor::train`] on tokio's blocking pool, for async callers.
    pub async fn train_blocking(self: &Arc<Self>) -> Result<TrainingSummary, StatsError> {
        let predictor = Arc::clone(self);
        tokio::task::spawn_blocking(move || predictor.train())
            .await
            .map_err(|e| StatsError::Training(e.to_string()))
    }

    pub fn is_trained(&self) -> bool {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current(&self) -> Option<Arc<LogisticModel>> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<f64, StatsError> {
        let model = self.current().ok_or(StatsError::ModelNotTrained)?;
        if !features.is_finite() {
            return Err(StatsError::InvalidFeatures(
                "feature vector contains non-finite values".to_string(),
            ));
        }
        Ok(model.predict_proba(features))
    }
}
