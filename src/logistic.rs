//! Logistic Regression
//!
//! L2 penalised logistic regression fitted with Newton-Raphson. This is the default
//! estimator of the quantifiers.
use crate::classifier::{param_as_bool, param_as_f64, param_as_usize, Classifier, ParamValue};
use crate::data::Matrix;
use crate::errors::QuantificationError;
use crate::utils::{sigmoid, validate_positive_float_parameter};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

fn default_c() -> f64 {
    1.0
}
fn default_max_iter() -> usize {
    100
}
fn default_tol() -> f64 {
    1e-6
}
fn default_fit_intercept() -> bool {
    true
}

/// Binary logistic regression.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Inverse of the L2 regularization strength.
    #[serde(default = "default_c")]
    pub c: f64,
    /// Maximum number of Newton steps.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Stop once the largest coefficient update is below this value.
    #[serde(default = "default_tol")]
    pub tol: f64,
    /// Whether to fit an unpenalised intercept.
    #[serde(default = "default_fit_intercept")]
    pub fit_intercept: bool,
    /// Fitted coefficients, intercept last when `fit_intercept` is set.
    #[serde(default)]
    pub coef: Vec<f64>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        LogisticRegression {
            c: default_c(),
            max_iter: default_max_iter(),
            tol: default_tol(),
            fit_intercept: default_fit_intercept(),
            coef: Vec::new(),
        }
    }
}

impl LogisticRegression {
    /// Create a logistic regression with regularization `c`.
    pub fn new(c: f64) -> Self {
        LogisticRegression {
            c,
            ..Default::default()
        }
    }

    fn design(&self, data: &Matrix<f64>) -> DMatrix<f64> {
        let x = DMatrix::from_column_slice(data.rows, data.cols, data.data);
        if self.fit_intercept {
            x.insert_column(data.cols, 1.0)
        } else {
            x
        }
    }

    fn decision_function(&self, data: &Matrix<f64>) -> Result<DVector<f64>, QuantificationError> {
        let n_coef = data.cols + usize::from(self.fit_intercept);
        if self.coef.len() != n_coef {
            return Err(QuantificationError::DataShape(format!(
                "LogisticRegression expects {} coefficients for {} features, found {}; was it fitted?",
                n_coef,
                data.cols,
                self.coef.len()
            )));
        }
        let w = DVector::from_column_slice(&self.coef);
        Ok(self.design(data) * w)
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> String {
        "LogisticRegression".to_string()
    }

    fn fit(&mut self, data: &Matrix<f64>, y: &[f64]) -> Result<(), QuantificationError> {
        validate_positive_float_parameter(self.c, "C")?;
        let x = self.design(data);
        let (n, p) = x.shape();
        let y = DVector::from_column_slice(y);
        let lambda = 1.0 / self.c;

        // The intercept is not penalised.
        let mut penalty = DVector::from_element(p, lambda);
        if self.fit_intercept {
            penalty[p - 1] = 0.0;
        }

        let mut w = DVector::<f64>::zeros(p);
        for _ in 0..self.max_iter {
            let z = &x * &w;
            let prob = z.map(sigmoid);
            let weights = prob.map(|v| (v * (1.0 - v)).max(1e-10));

            let grad = x.transpose() * (&prob - &y) + penalty.component_mul(&w);

            let mut xw = x.clone();
            for (i, mut row) in xw.row_iter_mut().enumerate() {
                row *= weights[i];
            }
            let mut hess = x.transpose() * xw;
            for j in 0..p {
                hess[(j, j)] += penalty[j] + 1e-8;
            }

            let step = match hess.clone().cholesky() {
                Some(chol) => chol.solve(&grad),
                None => hess.lu().solve(&grad).ok_or_else(|| {
                    QuantificationError::Estimator(self.name(), format!("singular Hessian with {} samples", n))
                })?,
            };
            w -= &step;
            if step.amax() < self.tol {
                break;
            }
        }
        if w.iter().any(|v| !v.is_finite()) {
            return Err(QuantificationError::Estimator(
                self.name(),
                "coefficients diverged".to_string(),
            ));
        }
        self.coef = w.iter().copied().collect();
        Ok(())
    }

    fn predict(&self, data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError> {
        Ok(self
            .decision_function(data)?
            .iter()
            .map(|&z| if z >= 0.0 { 1.0 } else { 0.0 })
            .collect())
    }

    fn predict_proba(&self, data: &Matrix<f64>) -> Result<Vec<f64>, QuantificationError> {
        Ok(self.decision_function(data)?.iter().map(|&z| sigmoid(z)).collect())
    }

    fn supports_proba(&self) -> bool {
        true
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), QuantificationError> {
        match name {
            "C" | "c" => self.c = param_as_f64(name, value)?,
            "max_iter" => self.max_iter = param_as_usize(name, value)?,
            "tol" => self.tol = param_as_f64(name, value)?,
            "fit_intercept" => self.fit_intercept = param_as_bool(name, value)?,
            _ => {
                return Err(QuantificationError::InvalidParameter(
                    name.to_string(),
                    "one of C, max_iter, tol, fit_intercept".to_string(),
                    value.to_string(),
                ))
            }
        }
        Ok(())
    }
}
