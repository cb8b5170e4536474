use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::models::WinPrediction;
use crate::utils::round2;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Model not loaded")]
    ModelUnavailable,
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(#[from] serde_json::Error),
}

/// The categorical inputs the classifier was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFeatures {
    pub team1: String,
    pub team2: String,
    pub venue: String,
    pub toss_winner: String,
    pub toss_decision: String,
}

impl MatchFeatures {
    /// One-hot column names, `Column=Value`.
    fn active_columns(&self) -> [String; 5] {
        [
            format!("Team1={}", self.team1),
            format!("Team2={}", self.team2),
            format!("Venue={}", self.venue),
            format!("TossWinner={}", self.toss_winner),
            format!("TossDecision={}", self.toss_decision),
        ]
    }
}

/// A trained classifier. Returns `[p(team1 wins), p(team2 wins)]`.
pub trait ProbabilityModel: Send + Sync {
    fn predict_probabilities(&self, features: &MatchFeatures) -> [f64; 2];
}

#[derive(Debug, Deserialize)]
struct LogisticArtifact {
    intercept: f64,
    coefficients: BTreeMap<String, f64>,
}

/// One-hot logistic regression exported as JSON. The positive class is
/// "team2 wins"; categories not seen in training contribute nothing.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    intercept: f64,
    columns: Vec<String>,
    weights: DVector<f64>,
}

impl LogisticModel {
    pub fn from_json(raw: &str) -> Result<Self, PredictionError> {
        let artifact: LogisticArtifact = serde_json::from_str(raw)?;
        let (columns, weights): (Vec<String>, Vec<f64>) = artifact.coefficients.into_iter().unzip();
        Ok(Self {
            intercept: artifact.intercept,
            columns,
            weights: DVector::from_vec(weights),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, PredictionError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PredictionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    fn encode(&self, features: &MatchFeatures) -> DVector<f64> {
        let active = features.active_columns();
        DVector::from_iterator(
            self.columns.len(),
            self.columns
                .iter()
                .map(|c| if active.contains(c) { 1.0 } else { 0.0 }),
        )
    }
}

impl ProbabilityModel for LogisticModel {
    fn predict_probabilities(&self, features: &MatchFeatures) -> [f64; 2] {
        let z = self.intercept + self.weights.dot(&self.encode(features));
        let team2 = 1.0 / (1.0 + (-z).exp());
        [1.0 - team2, team2]
    }
}

/// Serves win probabilities from whatever model was loaded at startup.
pub struct WinPredictor {
    model: Option<Box<dyn ProbabilityModel>>,
}

impl WinPredictor {
    pub fn new(model: Box<dyn ProbabilityModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn unavailable() -> Self {
        Self { model: None }
    }

    /// Load the artifact at `path`; a missing or broken artifact leaves the
    /// predictor unavailable rather than failing startup.
    pub fn load(path: &Path) -> Self {
        match LogisticModel::from_path(path) {
            Ok(model) => {
                tracing::info!(
                    "Loaded win predictor from {} ({} features)",
                    path.display(),
                    model.columns.len()
                );
                Self::new(Box::new(model))
            }
            Err(e) => {
                tracing::warn!("Win predictor unavailable: {}", e);
                Self::unavailable()
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn predict(&self, features: &MatchFeatures) -> Result<WinPrediction, PredictionError> {
        let model = self.model.as_ref().ok_or(PredictionError::ModelUnavailable)?;
        let [team1, team2] = model.predict_probabilities(features);

        Ok(WinPrediction {
            team1: features.team1.clone(),
            team1_win_percent: round2(team1 * 100.0),
            team2: features.team2.clone(),
            team2_win_percent: round2(team2 * 100.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> MatchFeatures {
        MatchFeatures {
            team1: "Mumbai Indians".to_string(),
            team2: "Chennai Super Kings".to_string(),
            venue: "Wankhede Stadium".to_string(),
            toss_winner: "Mumbai Indians".to_string(),
            toss_decision: "bat".to_string(),
        }
    }

    struct Fixed([f64; 2]);

    impl ProbabilityModel for Fixed {
        fn predict_probabilities(&self, _features: &MatchFeatures) -> [f64; 2] {
            self.0
        }
    }

    #[test]
    fn test_unavailable_model_is_an_error_not_a_panic() {
        let predictor = WinPredictor::unavailable();
        assert!(!predictor.is_loaded());
        let err = predictor.predict(&features()).unwrap_err();
        assert!(matches!(err, PredictionError::ModelUnavailable));
        assert_eq!(err.to_string(), "Model not loaded");
    }

    #[test]
    fn test_probabilities_map_to_the_supplied_teams() {
        let predictor = WinPredictor::new(Box::new(Fixed([0.6234, 0.3766])));
        let prediction = predictor.predict(&features()).unwrap();
        assert_eq!(prediction.team1, "Mumbai Indians");
        assert_eq!(prediction.team1_win_percent, 62.34);
        assert_eq!(prediction.team2, "Chennai Super Kings");
        assert_eq!(prediction.team2_win_percent, 37.66);
    }

    #[test]
    fn test_logistic_model_scoring() {
        let model = LogisticModel::from_json(
            r#"{"intercept": 0.0, "coefficients": {"Team2=Chennai Super Kings": 1.0, "Venue=Eden Gardens": 5.0}}"#,
        )
        .unwrap();
        let [team1, team2] = model.predict_probabilities(&features());
        let expected = 1.0 / (1.0 + (-1.0f64).exp());
        assert!((team2 - expected).abs() < 1e-12);
        assert!((team1 + team2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unseen_categories_score_the_intercept() {
        let model = LogisticModel::from_json(r#"{"intercept": 0.0, "coefficients": {}}"#).unwrap();
        assert_eq!(model.predict_probabilities(&features()), [0.5, 0.5]);
    }

    #[test]
    fn test_missing_artifact_leaves_predictor_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = WinPredictor::load(&dir.path().join("missing.json"));
        assert!(!predictor.is_loaded());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "not json").unwrap();
        assert!(matches!(
            LogisticModel::from_path(&broken),
            Err(PredictionError::InvalidArtifact(_))
        ));
    }
}
