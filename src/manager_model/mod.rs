use std::collections::HashSet;
use std::fs;
use std::path::Path;
use log::{debug, info};
use serde::Deserialize;
use crate::errors::ModelError;
use crate::models::features::{FeatureMatrix, Prediction};

/// Child index marking a leaf in the flat tree layout
const LEAF: i64 = -1;

/// A single regression tree in flat array layout. Node 0 is the root, a node is a leaf when
/// its children are LEAF, otherwise the walk goes left when x[feature] <= threshold.
#[derive(Deserialize, Debug, Clone)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl DecisionTree {
    /// Checks that the arrays agree and that every index is in range
    ///
    /// # Arguments
    ///
    /// * 'n_features' - number of features the model is trained on
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.value.len();
        if n == 0 {
            return Err("tree without nodes".to_string());
        }
        if self.children_left.len() != n || self.children_right.len() != n || self.feature.len() != n || self.threshold.len() != n {
            return Err(format!("tree arrays differ in length, expected {} nodes", n));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                continue;
            }
            // children always come after their parent, which also rules out cycles
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} has child {} out of range", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(format!("node {} splits on unknown feature {}", node, feature));
            }
        }

        Ok(())
    }

    /// Walks the tree for one feature row and returns the leaf value
    ///
    /// # Arguments
    ///
    /// * 'row' - feature values in model schema order
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            node = if row[self.feature[node] as usize] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        self.value[node]
    }
}

/// Pretrained regression model as exported from the training environment
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    /// Mean of regression trees
    RandomForest {
        feature_names: Vec<String>,
        trees: Vec<DecisionTree>,
    },
    Linear {
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

impl Model {
    /// Loads and validates a model artifact
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the json model artifact
    pub fn load(path: &str) -> Result<Model, ModelError> {
        if !Path::new(path).exists() {
            return Err(ModelError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("model file {} not found", path),
            )));
        }

        let json = fs::read_to_string(path)?;
        let model = Model::from_json(&json)?;
        info!("loaded {} model from {} expecting {} features", model.kind(), path, model.feature_names().len());

        Ok(model)
    }

    /// Parses and validates a model from its json form
    ///
    /// # Arguments
    ///
    /// * 'json' - the model document
    pub fn from_json(json: &str) -> Result<Model, ModelError> {
        let model: Model = serde_json::from_str(json)?;
        model.validate()?;

        Ok(model)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Model::RandomForest { .. } => "random_forest",
            Model::Linear { .. } => "linear",
        }
    }

    /// Returns the feature names, in order, the model was trained on
    pub fn feature_names(&self) -> &[String] {
        match self {
            Model::RandomForest { feature_names, .. } => feature_names,
            Model::Linear { feature_names, .. } => feature_names,
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        let names = self.feature_names();
        let unique = names.iter().collect::<HashSet<&String>>();
        if unique.len() != names.len() {
            return Err(ModelError::Invalid("duplicate feature names".to_string()));
        }

        match self {
            Model::RandomForest { trees, .. } => {
                if trees.is_empty() {
                    return Err(ModelError::Invalid("random forest without trees".to_string()));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(names.len()).map_err(|e| ModelError::Invalid(format!("tree {}: {}", i, e)))?;
                }
            }
            Model::Linear { coefficients, .. } => {
                if coefficients.len() != names.len() {
                    return Err(ModelError::Invalid(format!(
                        "{} coefficients for {} features", coefficients.len(), names.len())));
                }
            }
        }

        Ok(())
    }

    /// Checks that the matrix columns are exactly the model features, in the same order
    ///
    /// # Arguments
    ///
    /// * 'columns' - feature matrix column names
    pub fn check_schema(&self, columns: &[String]) -> Result<(), ModelError> {
        let expected = self.feature_names();
        if columns == expected {
            return Ok(());
        }

        let missing = expected.iter().filter(|c| !columns.contains(c)).cloned().collect::<Vec<String>>();
        let unexpected = columns.iter().filter(|c| !expected.contains(c)).cloned().collect::<Vec<String>>();

        if missing.is_empty() && unexpected.is_empty() {
            let position = expected.iter().zip(columns).position(|(e, c)| e != c).unwrap_or(0);
            return Err(ModelError::SchemaMismatch(format!(
                "feature order differs at position {}: model expects '{}', got '{}'",
                position, expected[position], columns[position])));
        }

        Err(ModelError::SchemaMismatch(format!("missing features {:?}, unexpected features {:?}", missing, unexpected)))
    }

    /// Predicts one raw value per matrix row
    ///
    /// # Arguments
    ///
    /// * 'matrix' - the feature matrix
    pub fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        self.check_schema(&matrix.columns)?;

        let raw = matrix.rows.iter().map(|row| self.predict_row(row)).collect::<Vec<f64>>();
        debug!("predicted {} rows", raw.len());

        Ok(raw)
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        match self {
            Model::RandomForest { trees, .. } => {
                trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / trees.len() as f64
            }
            Model::Linear { coefficients, intercept, .. } => {
                intercept + coefficients.iter().zip(row).map(|(c, x)| c * x).sum::<f64>()
            }
        }
    }
}

/// Rounds to two decimals, ties to even on the hundredths
///
/// # Arguments
///
/// * 'value' - the value to round
pub fn round_kwh(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Predicts hourly production for the feature matrix and pairs every rounded value with the
/// timestamp of the row it was predicted from
///
/// # Arguments
///
/// * 'model' - the pretrained model
/// * 'matrix' - the feature matrix
pub fn predict_production(model: &Model, matrix: &FeatureMatrix) -> Result<Vec<Prediction>, ModelError> {
    let raw = model.predict(matrix)?;

    let predictions = matrix
        .timestamps
        .iter()
        .zip(raw)
        .map(|(ts, p)| Prediction { timestamp: *ts, kwh: round_kwh(p) })
        .collect::<Vec<Prediction>>();
    info!("predicted production for {} hours", predictions.len());

    Ok(predictions)
}
