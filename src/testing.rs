//! Deterministic classifiers and data sets shared by the unit tests.
use crate::classifier::{param_as_f64, Classifier, ParamValue};
use crate::data::Matrix;
use crate::errors::QuantificationError;
use crate::utils::sigmoid;

/// Hard classifier thresholding feature 0, no probability output. Ignores training.
#[derive(Clone, Debug)]
pub struct CrispStub {
    pub threshold: f64,
}

impl CrispStub {
    pub fn new(threshold: f64) -> Self {
        CrispStub { threshold }
    }
}

impl Classifier for CrispStub {
    fn name(&self) -> String {
        "CrispStub".to_string()
    }
    fn fit(&mut self, _data: &Matrix<f64>, _y: &[f64]) -> Result<(), QuantificationError> {
        Ok(())
    }
    fn predict(&self, data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError> {
        Ok(data
            .get_col(0)
            .iter()
            .map(|&v| if v >= self.threshold { 1.0 } else { 0.0 })
            .collect())
    }
    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), QuantificationError> {
        match name {
            "threshold" => {
                self.threshold = param_as_f64(name, value)?;
                Ok(())
            }
            _ => Err(QuantificationError::InvalidParameter(
                name.to_string(),
                "threshold".to_string(),
                value.to_string(),
            )),
        }
    }
}

/// Feature 0 is the positive-class score; hard predictions use `threshold`. Ignores training.
#[derive(Clone, Debug)]
pub struct ScoreStub {
    pub threshold: f64,
}

impl Classifier for ScoreStub {
    fn name(&self) -> String {
        "ScoreStub".to_string()
    }
    fn fit(&mut self, _data: &Matrix<f64>, _y: &[f64]) -> Result<(), QuantificationError> {
        Ok(())
    }
    fn predict(&self, data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError> {
        Ok(data
            .get_col(0)
            .iter()
            .map(|&v| if v >= self.threshold { 1.0 } else { 0.0 })
            .collect())
    }
    fn predict_proba(&self, data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError> {
        Ok(data.get_col(0).iter().map(|&v| v.clamp(0.0, 1.0)).collect())
    }
    fn supports_proba(&self) -> bool {
        true
    }
}

/// Hard classifier with injected error rates.
///
/// Rows are `[true label, u]` with `u` in `[0, 1)`: positives are flagged when `u < tpr`,
/// negatives when `u < fpr`. Ignores training.
#[derive(Clone, Debug)]
pub struct RateStub {
    pub tpr: f64,
    pub fpr: f64,
}

impl Classifier for RateStub {
    fn name(&self) -> String {
        "RateStub".to_string()
    }
    fn fit(&mut self, _data: &Matrix<f64>, _y: &[f64]) -> Result<(), QuantificationError> {
        Ok(())
    }
    fn predict(&self, data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError> {
        Ok((0..data.rows)
            .map(|i| {
                let rate = if *data.get(i, 0) > 0.5 { self.tpr } else { self.fpr };
                if *data.get(i, 1) < rate {
                    1.0
                } else {
                    0.0
                }
            })
            .collect())
    }
}

/// Logistic-like nearest centroid classifier: `p = sigmoid(scale * (d_neg - d_pos))`.
#[derive(Clone, Debug)]
pub struct CentroidStub {
    pub scale: f64,
    pos: Vec<f64>,
    neg: Vec<f64>,
}

impl Default for CentroidStub {
    fn default() -> Self {
        CentroidStub {
            scale: 2.0,
            pos: Vec::new(),
            neg: Vec::new(),
        }
    }
}

fn centroid(data: &Matrix<f64>, y: &[f64], positive: bool) -> Vec<f64> {
    let rows: Vec<usize> = (0..data.rows).filter(|&i| (y[i] > 0.5) == positive).collect();
    (0..data.cols)
        .map(|j| rows.iter().map(|&i| *data.get(i, j)).sum::<f64>() / rows.len().max(1) as f64)
        .collect()
}

fn distance(row: &[f64], c: &[f64]) -> f64 {
    row.iter().zip(c).map(|(a, b)| (a - b).powi(2)).sum::<f64>().sqrt()
}

impl Classifier for CentroidStub {
    fn name(&self) -> String {
        "CentroidStub".to_string()
    }
    fn fit(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<(), QuantificationError> {
        self.pos = centroid(data, y, true);
        self.neg = centroid(data, y, false);
        Ok(())
    }
    fn predict(&self, data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError> {
        Ok(self
            .predict_proba(data)?
            .into_iter()
            .map(|p| if p >= 0.5 { 1.0 } else { 0.0 })
            .collect())
    }
    fn predict_proba(&self, data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError> {
        Ok((0..data.rows)
            .map(|i| {
                let row = data.get_row(i);
                sigmoid(self.scale * (distance(&row, &self.neg) - distance(&row, &self.pos)))
            })
            .collect())
    }
    fn supports_proba(&self) -> bool {
        true
    }
    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), QuantificationError> {
        match name {
            "scale" => {
                self.scale = param_as_f64(name, value)?;
                Ok(())
            }
            _ => Err(QuantificationError::InvalidParameter(
                name.to_string(),
                "scale".to_string(),
                value.to_string(),
            )),
        }
    }
}

/// Always fails to fit.
#[derive(Clone, Debug)]
pub struct FailingStub;

impl Classifier for FailingStub {
    fn name(&self) -> String {
        "FailingStub".to_string()
    }
    fn fit(&mut self, _data: &Matrix<f64>, _y: &[f64]) -> Result<(), QuantificationError> {
        Err(QuantificationError::Estimator(self.name(), "refusing to fit".to_string()))
    }
    fn predict(&self, data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError> {
        Ok(vec![0.0; data.rows])
    }
}

/// Three well separated 2d clusters with `n` samples each, labels 0, 1, 2.
/// Returns column major features and labels.
pub fn three_clusters(n: usize) -> (Vec<f64>, Vec<usize>) {
    let centers = [(0.0, 0.0), (6.0, 0.0), (0.0, 6.0)];
    let mut c0 = Vec::with_capacity(3 * n);
    let mut c1 = Vec::with_capacity(3 * n);
    let mut y = Vec::with_capacity(3 * n);
    for (label, (cx, cy)) in centers.iter().enumerate() {
        for i in 0..n {
            // deterministic jitter in [-0.5, 0.5]
            let a = (i % 5) as f64 / 4.0 - 0.5;
            let b = (i / 5 % 6) as f64 / 5.0 - 0.5;
            c0.push(cx + a);
            c1.push(cy + b);
            y.push(label);
        }
    }
    c0.extend(c1);
    (c0, y)
}

/// Rows `[label, u]` with `n_pos` positives and `n_neg` negatives, `u` evenly spread per class.
pub fn rate_data(n_pos: usize, n_neg: usize) -> (Vec<f64>, Vec<usize>) {
    let mut label = Vec::with_capacity(n_pos + n_neg);
    let mut u = Vec::with_capacity(n_pos + n_neg);
    let mut y = Vec::with_capacity(n_pos + n_neg);
    for i in 0..n_neg {
        label.push(0.0);
        u.push((i as f64 + 0.5) / n_neg as f64);
        y.push(0);
    }
    for i in 0..n_pos {
        label.push(1.0);
        u.push((i as f64 + 0.5) / n_pos as f64);
        y.push(1);
    }
    label.extend(u);
    (label, y)
}

/// One column of scores: negatives spread over `[0, 0.4)`, positives over `[0.6, 1.0)`.
pub fn score_data(n_pos: usize, n_neg: usize) -> (Vec<f64>, Vec<usize>) {
    let mut x = Vec::with_capacity(n_pos + n_neg);
    let mut y = Vec::with_capacity(n_pos + n_neg);
    for i in 0..n_neg {
        x.push(0.4 * (i as f64 + 0.5) / n_neg as f64);
        y.push(0);
    }
    for i in 0..n_pos {
        x.push(0.6 + 0.4 * (i as f64 + 0.5) / n_pos as f64);
        y.push(1);
    }
    (x, y)
}
