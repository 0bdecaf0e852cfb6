pub mod features;
pub mod players;
pub mod predictor;
pub mod teams;

pub use features::{FeatureBuilder, FeatureVector};
pub use predictor::{Predictor, TrainingSummary};
