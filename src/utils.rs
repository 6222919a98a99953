use crate::errors::QuantificationError;

/// Create a string of all available items.
pub fn items_to_strings(items: Vec<&str>) -> String {
    let mut s = String::new();
    for i in items {
        s.push_str(i);
        s.push_str(&String::from(", "));
    }
    s
}

pub fn fmt_vec_output(v: &[f64]) -> String {
    let mut res = String::new();
    if let Some(last) = v.len().checked_sub(1) {
        if last == 0 {
            return format!("{:.4}", v[0]);
        }
        for n in &v[..last] {
            res.push_str(format!("{:.4}", n).as_str());
            res.push_str(", ");
        }
        res.push_str(format!("{:.4}", &v[last]).as_str());
    }
    res
}

// Validation
pub fn validate_positive_float_parameter(value: f64, parameter: &str) -> Result<(), QuantificationError> {
    if value <= 0.0 {
        return Err(QuantificationError::InvalidParameter(
            parameter.to_string(),
            "a strictly positive real value".to_string(),
            value.to_string(),
        ));
    }
    validate_float_parameter(value, 0.0, f64::INFINITY, parameter)
}

pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), QuantificationError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(QuantificationError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Compare two metric values, determining if `comparison` is better.
/// If one of them is NaN favor the non NaN value.
/// If both are NaN, consider the first value to be better.
pub fn is_comparison_better(value: f64, comparison: f64, maximize: bool) -> bool {
    match (value.is_nan(), comparison.is_nan()) {
        (true, true) | (false, true) => false,
        (true, false) => true,
        (false, false) => {
            if maximize {
                value < comparison
            } else {
                value > comparison
            }
        }
    }
}

#[inline]
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Replace NaN by zero and infinities by the largest finite values.
#[inline]
pub fn nan_to_num(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else if v == f64::INFINITY {
        f64::MAX
    } else if v == f64::NEG_INFINITY {
        f64::MIN
    } else {
        v
    }
}

/// Adjust an observed rate given the rates on the negatives and positives,
/// `(observed - on_negatives) / (on_positives - on_negatives)`, clipped to `[0, 1]`.
/// A zero denominator yields NaN, which maps to zero.
pub fn adjust_rate(observed: f64, on_positives: f64, on_negatives: f64) -> f64 {
    nan_to_num((observed - on_negatives) / (on_positives - on_negatives)).clamp(0.0, 1.0)
}

/// Expand a single positive-class probability into `[1 - p, p]`.
pub fn expand_binary(probabilities: Vec<f64>) -> Vec<f64> {
    if probabilities.len() == 1 {
        vec![1.0 - probabilities[0], probabilities[0]]
    } else {
        probabilities
    }
}

/// Renormalize to sum one, returning the vector untouched when the sum is exactly zero.
pub fn renormalize(mut probabilities: Vec<f64>) -> Vec<f64> {
    let total: f64 = probabilities.iter().sum();
    if total == 0.0 {
        return probabilities;
    }
    probabilities.iter_mut().for_each(|p| *p /= total);
    probabilities
}
