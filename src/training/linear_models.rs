//! Linear model implementations

use crate::error::{AutoMlError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Cholesky factor L of a symmetric positive-definite matrix, if one exists.
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Some(l)
}

/// Solve Ax = b for symmetric positive-definite A via Cholesky.
/// Retries once with a small ridge term when A is near-singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let l = cholesky_factor(a).or_else(|| {
        let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
        let mut a_reg = a.clone();
        for k in 0..n {
            a_reg[[k, k]] += ridge;
        }
        cholesky_factor(&a_reg)
    })?;

    // Forward substitution: L y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * y[j]).sum();
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Matrix inverse via Gauss-Jordan elimination with partial pivoting.
/// Fallback for systems the Cholesky path rejects.
fn gauss_jordan_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut pivot_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[pivot_row, col]].abs() {
                pivot_row = row;
            }
        }
        if pivot_row != col {
            for j in 0..2 * n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[pivot_row, j]];
                aug[[pivot_row, j]] = tmp;
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Some(inv)
}

/// Solve the normal equations (X^T X) w = X^T y.
fn solve_normal_equations(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    cholesky_solve(&xtx, &xty).or_else(|| gauss_jordan_inverse(&xtx).map(|inv| inv.dot(&xty)))
}

/// Ordinary least squares linear regression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Whether to fit an intercept term
    pub fit_intercept: bool,
    is_fitted: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            is_fitted: false,
        }
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Fit via the normal equations on centered data.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(AutoMlError::ShapeMismatch {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        let (x_c, y_c, x_mean, y_mean) = if self.fit_intercept {
            let xm = x.mean_axis(Axis(0)).unwrap();
            let ym = y.mean().unwrap_or(0.0);
            (
                x - &xm.clone().insert_axis(Axis(0)),
                y - ym,
                Some(xm),
                Some(ym),
            )
        } else {
            (x.clone(), y.clone(), None, None)
        };

        let coefficients = solve_normal_equations(&x_c, &y_c).ok_or_else(|| {
            AutoMlError::Computation("singular design matrix, cannot solve least squares".to_string())
        })?;

        self.intercept = if self.fit_intercept {
            Some(y_mean.unwrap() - coefficients.dot(&x_mean.unwrap()))
        } else {
            Some(0.0)
        };
        self.coefficients = Some(coefficients);
        self.is_fitted = true;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(AutoMlError::ModelNotFitted);
        }
        let coefficients = self.coefficients.as_ref().unwrap();
        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }
}

/// One fitted sigmoid discriminator: weights plus bias
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinaryLogit {
    weights: Array1<f64>,
    bias: f64,
}

impl BinaryLogit {
    fn proba(&self, x: &Array2<f64>) -> Array1<f64> {
        let linear = x.dot(&self.weights) + self.bias;
        linear.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }
}

/// L2-regularized logistic regression trained by gradient descent.
///
/// Binary problems train a single discriminator; more than two classes fall
/// back to one-vs-rest, predicting the class with the highest probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// L2 regularization strength (inverse of the usual C parameter)
    pub alpha: f64,
    /// Maximum gradient-descent iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Gradient-descent step size
    pub learning_rate: f64,
    classifiers: Vec<BinaryLogit>,
    classes: Vec<f64>,
    is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            classifiers: Vec::new(),
            classes: Vec::new(),
            is_fitted: false,
        }
    }

    /// Set the L2 regularization strength
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the inverse regularization parameter C (alpha = 1/C)
    pub fn with_c(mut self, c: f64) -> Self {
        self.alpha = 1.0 / c;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Fit the classifier; labels may be any distinct rounded values.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(AutoMlError::ShapeMismatch {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        let mut classes: Vec<f64> = y.iter().map(|v| v.round()).collect();
        classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        classes.dedup();
        if classes.len() < 2 {
            return Err(AutoMlError::Computation(
                "logistic regression requires at least 2 distinct classes".to_string(),
            ));
        }
        self.classes = classes;

        self.classifiers.clear();
        if self.classes.len() == 2 {
            let positive = self.classes[1];
            let y_binary = y.mapv(|v| if v.round() == positive { 1.0 } else { 0.0 });
            let logit = self.fit_binary(x, &y_binary);
            self.classifiers.push(logit);
        } else {
            // One-vs-rest: one discriminator per class
            for &cls in &self.classes {
                let y_binary = y.mapv(|v| if v.round() == cls { 1.0 } else { 0.0 });
                let logit = self.fit_binary(x, &y_binary);
                self.classifiers.push(logit);
            }
        }

        self.is_fitted = true;
        Ok(())
    }

    /// Gradient descent on the sigmoid loss with L2 penalty.
    fn fit_binary(&self, x: &Array2<f64>, y: &Array1<f64>) -> BinaryLogit {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        let mut weights: Array1<f64> = Array1::zeros(n_features);
        let mut bias = 0.0;

        for _iter in 0..self.max_iter {
            let linear = x.dot(&weights) + bias;
            let predictions = linear.mapv(|v| 1.0 / (1.0 + (-v).exp()));

            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples as f64) + self.alpha * &weights;
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - self.learning_rate * &dw;
            bias -= self.learning_rate * db;
        }

        BinaryLogit { weights, bias }
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(AutoMlError::ModelNotFitted);
        }

        if self.classes.len() == 2 {
            let proba = self.classifiers[0].proba(x);
            Ok(proba.mapv(|p| if p >= 0.5 { self.classes[1] } else { self.classes[0] }))
        } else {
            let probas: Vec<Array1<f64>> =
                self.classifiers.iter().map(|c| c.proba(x)).collect();
            let predictions: Vec<f64> = (0..x.nrows())
                .map(|i| {
                    let mut best_class = self.classes[0];
                    let mut best_p = f64::NEG_INFINITY;
                    for (k, proba) in probas.iter().enumerate() {
                        if proba[i] > best_p {
                            best_p = proba[i];
                            best_class = self.classes[k];
                        }
                    }
                    best_class
                })
                .collect();
            Ok(Array1::from_vec(predictions))
        }
    }

    /// Positive-class probabilities (binary only)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(AutoMlError::ModelNotFitted);
        }
        if self.classes.len() != 2 {
            return Err(AutoMlError::Computation(
                "predict_proba is only defined for binary problems".to_string(),
            ));
        }
        Ok(self.classifiers[0].proba(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_regression_recovers_line() {
        // y = 2*x1 + 3*x2 + 1
        let x = array![
            [1.0, 1.0],
            [2.0, 1.0],
            [1.0, 2.0],
            [2.0, 2.0],
            [3.0, 1.0],
        ];
        let y = array![6.0, 8.0, 9.0, 11.0, 10.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        for (p, t) in preds.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-6, "prediction {} vs target {}", p, t);
        }
    }

    #[test]
    fn test_linear_regression_without_intercept() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];

        let mut model = LinearRegression::new().with_fit_intercept(false);
        model.fit(&x, &y).unwrap();
        assert!((model.intercept.unwrap()).abs() < 1e-12);
        let preds = model.predict(&array![[4.0]]).unwrap();
        assert!((preds[0] - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = LinearRegression::new();
        assert!(matches!(
            model.predict(&array![[1.0]]).unwrap_err(),
            AutoMlError::ModelNotFitted
        ));
    }

    #[test]
    fn test_logistic_binary() {
        let x = array![
            [1.0, 1.0],
            [1.5, 1.5],
            [2.0, 2.0],
            [5.0, 5.0],
            [5.5, 5.5],
            [6.0, 6.0],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = LogisticRegression::new().with_learning_rate(0.5);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        let correct = preds
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < 0.5)
            .count();
        assert!(correct >= 5, "only {} of 6 correct", correct);
    }

    #[test]
    fn test_logistic_multiclass_ovr() {
        // Three well-separated clusters
        let x = array![
            [0.0, 0.0],
            [0.2, 0.1],
            [0.1, 0.2],
            [5.0, 5.0],
            [5.2, 5.1],
            [5.1, 5.2],
            [10.0, 0.0],
            [10.2, 0.1],
            [10.1, 0.2],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0];

        let mut model = LogisticRegression::new().with_learning_rate(0.5);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        let correct = preds
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < 0.5)
            .count();
        assert!(correct >= 7, "only {} of 9 correct", correct);
    }

    #[test]
    fn test_logistic_single_class_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 1.0];
        let mut model = LogisticRegression::new();
        assert!(model.fit(&x, &y).is_err());
    }

    #[test]
    fn test_with_c_sets_alpha() {
        let model = LogisticRegression::new().with_c(10.0);
        assert!((model.alpha - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_predict_proba_binary() {
        let x = array![[0.0, 0.0], [10.0, 10.0]];
        let y = array![0.0, 1.0];

        let mut model = LogisticRegression::new().with_max_iter(500);
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[0] < 0.5);
        assert!(proba[1] > 0.5);
    }
}
