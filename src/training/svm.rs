//! Support vector machines: SMO classifier and epsilon-insensitive regressor

use crate::error::{AutoMlError, Result};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Sample cap for the eagerly computed kernel matrix.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Kernel function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KernelType {
    /// K(x, y) = x . y
    Linear,
    /// K(x, y) = exp(-gamma * ||x - y||^2)
    Rbf { gamma: f64 },
}

impl KernelType {
    fn apply(&self, a: &Array1<f64>, b: &Array1<f64>) -> f64 {
        match self {
            KernelType::Linear => a.dot(b),
            KernelType::Rbf { gamma } => {
                let diff = a - b;
                (-gamma * diff.dot(&diff)).exp()
            }
        }
    }
}

/// SVM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmConfig {
    /// Regularization parameter
    pub c: f64,
    /// Kernel function
    pub kernel: KernelType,
    /// Stopping tolerance
    pub tol: f64,
    /// Maximum optimization sweeps
    pub max_iter: usize,
    /// Epsilon-tube width for regression
    pub epsilon: f64,
    /// Seed for the SMO partner draws
    pub random_state: Option<u64>,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: KernelType::Rbf { gamma: 1.0 },
            tol: 1e-3,
            max_iter: 1000,
            epsilon: 0.1,
            random_state: Some(42),
        }
    }
}

/// One binary machine: support vectors, their coefficients, and a bias
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinarySvm {
    support_vectors: Array2<f64>,
    /// alpha_i * y_i for each support vector
    coefficients: Array1<f64>,
    bias: f64,
}

impl BinarySvm {
    fn decision(&self, sample: &Array1<f64>, kernel: &KernelType) -> f64 {
        let mut sum = self.bias;
        for j in 0..self.support_vectors.nrows() {
            sum += self.coefficients[j] * kernel.apply(sample, &self.support_vectors.row(j).to_owned());
        }
        sum
    }
}

fn check_kernel_cap(n: usize, what: &str) -> Result<()> {
    if n > MAX_KERNEL_MATRIX_SAMPLES {
        return Err(AutoMlError::Computation(format!(
            "{} samples exceed the {} cap for the eager kernel matrix",
            n, what
        )));
    }
    Ok(())
}

fn kernel_matrix(x: &Array2<f64>, kernel: &KernelType) -> Array2<f64> {
    let n = x.nrows();
    let mut k = Array2::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let val = kernel.apply(&x.row(i).to_owned(), &x.row(j).to_owned());
            k[[i, j]] = val;
            k[[j, i]] = val;
        }
    }
    k
}

/// Support vector classifier trained with simplified SMO.
///
/// Binary problems train one machine; more classes train one-vs-rest
/// machines and predict the class with the largest decision value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmClassifier {
    config: SvmConfig,
    machines: Vec<BinarySvm>,
    classes: Vec<f64>,
    is_fitted: bool,
}

impl SvmClassifier {
    pub fn new(config: SvmConfig) -> Self {
        Self {
            config,
            machines: Vec::new(),
            classes: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the classifier; labels must be integral values.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        for (i, &v) in y.iter().enumerate() {
            if (v - v.round()).abs() > 1e-9 {
                return Err(AutoMlError::Computation(format!(
                    "SVM classifier requires integer class labels, sample {} has {}",
                    i, v
                )));
            }
        }

        let mut classes: Vec<f64> = y.iter().map(|v| v.round()).collect();
        classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        classes.dedup();
        if classes.len() < 2 {
            return Err(AutoMlError::Computation(
                "SVM requires at least 2 distinct classes".to_string(),
            ));
        }
        self.classes = classes;

        check_kernel_cap(x.nrows(), "SVM")?;
        let k = kernel_matrix(x, &self.config.kernel);

        self.machines.clear();
        if self.classes.len() == 2 {
            let positive = self.classes[1];
            let y_signed = y.mapv(|v| if v.round() == positive { 1.0 } else { -1.0 });
            let machine = self.smo_train(x, &y_signed, &k)?;
            self.machines.push(machine);
        } else {
            for &cls in &self.classes {
                let y_signed = y.mapv(|v| if v.round() == cls { 1.0 } else { -1.0 });
                let machine = self.smo_train(x, &y_signed, &k)?;
                self.machines.push(machine);
            }
        }

        self.is_fitted = true;
        Ok(())
    }

    /// Simplified SMO over the precomputed kernel matrix.
    fn smo_train(&self, x: &Array2<f64>, y: &Array1<f64>, k: &Array2<f64>) -> Result<BinarySvm> {
        let n = x.nrows();
        let c = self.config.c;

        let mut alphas: Array1<f64> = Array1::zeros(n);
        let mut bias = 0.0;

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let decision = |alphas: &Array1<f64>, bias: f64, idx: usize| -> f64 {
            let mut sum = bias;
            for i in 0..n {
                sum += alphas[i] * y[i] * k[[i, idx]];
            }
            sum
        };

        let mut passes = 0;
        let max_passes = 5;
        let mut sweeps = 0;

        while passes < max_passes && sweeps < self.config.max_iter && n > 1 {
            let mut num_changed = 0;

            for i in 0..n {
                let e_i = decision(&alphas, bias, i) - y[i];

                // KKT violation check
                if (y[i] * e_i < -self.config.tol && alphas[i] < c)
                    || (y[i] * e_i > self.config.tol && alphas[i] > 0.0)
                {
                    let j = loop {
                        let j = rng.gen_range(0..n);
                        if j != i {
                            break j;
                        }
                    };
                    let e_j = decision(&alphas, bias, j) - y[j];

                    let alpha_i_old = alphas[i];
                    let alpha_j_old = alphas[j];

                    let (lo, hi) = if y[i] != y[j] {
                        (
                            (alphas[j] - alphas[i]).max(0.0),
                            (c + alphas[j] - alphas[i]).min(c),
                        )
                    } else {
                        (
                            (alphas[i] + alphas[j] - c).max(0.0),
                            (alphas[i] + alphas[j]).min(c),
                        )
                    };
                    if (hi - lo).abs() < 1e-10 {
                        continue;
                    }

                    let eta = 2.0 * k[[i, j]] - k[[i, i]] - k[[j, j]];
                    if eta >= 0.0 {
                        continue;
                    }

                    alphas[j] = (alphas[j] - y[j] * (e_i - e_j) / eta).max(lo).min(hi);
                    if (alphas[j] - alpha_j_old).abs() < 1e-5 {
                        continue;
                    }
                    alphas[i] += y[i] * y[j] * (alpha_j_old - alphas[j]);

                    let b1 = bias
                        - e_i
                        - y[i] * (alphas[i] - alpha_i_old) * k[[i, i]]
                        - y[j] * (alphas[j] - alpha_j_old) * k[[i, j]];
                    let b2 = bias
                        - e_j
                        - y[i] * (alphas[i] - alpha_i_old) * k[[i, j]]
                        - y[j] * (alphas[j] - alpha_j_old) * k[[j, j]];
                    bias = if alphas[i] > 0.0 && alphas[i] < c {
                        b1
                    } else if alphas[j] > 0.0 && alphas[j] < c {
                        b2
                    } else {
                        (b1 + b2) / 2.0
                    };

                    num_changed += 1;
                }
            }

            sweeps += 1;
            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
        }

        // Keep only support vectors (alpha > 0)
        let support_indices: Vec<usize> = alphas
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > 1e-8)
            .map(|(i, _)| i)
            .collect();

        let n_features = x.ncols();
        let mut support_vectors = Array2::zeros((support_indices.len(), n_features));
        let mut coefficients = Array1::zeros(support_indices.len());
        for (row, &idx) in support_indices.iter().enumerate() {
            support_vectors.row_mut(row).assign(&x.row(idx));
            coefficients[row] = alphas[idx] * y[idx];
        }

        Ok(BinarySvm {
            support_vectors,
            coefficients,
            bias,
        })
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(AutoMlError::ModelNotFitted);
        }

        let n = x.nrows();
        let mut predictions = Array1::zeros(n);

        if self.classes.len() == 2 {
            let machine = &self.machines[0];
            for i in 0..n {
                let sample = x.row(i).to_owned();
                let score = machine.decision(&sample, &self.config.kernel);
                predictions[i] = if score >= 0.0 {
                    self.classes[1]
                } else {
                    self.classes[0]
                };
            }
        } else {
            for i in 0..n {
                let sample = x.row(i).to_owned();
                let mut best_score = f64::NEG_INFINITY;
                let mut best_class = self.classes[0];
                for (k, machine) in self.machines.iter().enumerate() {
                    let score = machine.decision(&sample, &self.config.kernel);
                    if score > best_score {
                        best_score = score;
                        best_class = self.classes[k];
                    }
                }
                predictions[i] = best_class;
            }
        }

        Ok(predictions)
    }

    /// Total support vectors across machines
    pub fn n_support_vectors(&self) -> usize {
        self.machines.iter().map(|m| m.support_vectors.nrows()).sum()
    }
}

/// Support vector regressor trained by subgradient updates on the
/// epsilon-insensitive loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmRegressor {
    config: SvmConfig,
    support_vectors: Option<Array2<f64>>,
    /// alpha - alpha* per support vector
    coefficients: Option<Array1<f64>>,
    bias: f64,
    is_fitted: bool,
}

impl SvmRegressor {
    pub fn new(config: SvmConfig) -> Self {
        Self {
            config,
            support_vectors: None,
            coefficients: None,
            bias: 0.0,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        check_kernel_cap(n, "SVR")?;

        let k = kernel_matrix(x, &self.config.kernel);

        let mut alphas: Array1<f64> = Array1::zeros(n);
        let mut alphas_star: Array1<f64> = Array1::zeros(n);
        let mut bias = 0.0;
        let learning_rate = 0.01;

        for _iter in 0..self.config.max_iter {
            let mut max_change = 0.0f64;

            for i in 0..n {
                let mut pred = bias;
                for j in 0..n {
                    pred += (alphas[j] - alphas_star[j]) * k[[j, i]];
                }
                let error = pred - y[i];

                if error > self.config.epsilon {
                    let new_val = (alphas_star[i] + learning_rate).min(self.config.c);
                    max_change = max_change.max((new_val - alphas_star[i]).abs());
                    alphas_star[i] = new_val;
                } else if error < -self.config.epsilon {
                    let new_val = (alphas[i] + learning_rate).min(self.config.c);
                    max_change = max_change.max((new_val - alphas[i]).abs());
                    alphas[i] = new_val;
                }

                let bias_update = learning_rate * 0.1 * error;
                max_change = max_change.max(bias_update.abs());
                bias -= bias_update;
            }

            if max_change < self.config.tol {
                break;
            }
        }

        let combined = &alphas - &alphas_star;
        let support_indices: Vec<usize> = combined
            .iter()
            .enumerate()
            .filter(|(_, a)| a.abs() > 1e-8)
            .map(|(i, _)| i)
            .collect();

        if support_indices.is_empty() {
            // Every point sits inside the tube; keep them all
            self.support_vectors = Some(x.clone());
            self.coefficients = Some(combined);
        } else {
            let n_features = x.ncols();
            let mut support_vectors = Array2::zeros((support_indices.len(), n_features));
            let mut coefficients = Array1::zeros(support_indices.len());
            for (row, &idx) in support_indices.iter().enumerate() {
                support_vectors.row_mut(row).assign(&x.row(idx));
                coefficients[row] = combined[idx];
            }
            self.support_vectors = Some(support_vectors);
            self.coefficients = Some(coefficients);
        }

        self.bias = bias;
        self.is_fitted = true;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(AutoMlError::ModelNotFitted);
        }

        let sv = self.support_vectors.as_ref().unwrap();
        let coefficients = self.coefficients.as_ref().unwrap();

        let n = x.nrows();
        let mut predictions = Array1::zeros(n);
        for i in 0..n {
            let sample = x.row(i).to_owned();
            let mut sum = self.bias;
            for j in 0..sv.nrows() {
                sum += coefficients[j] * self.config.kernel.apply(&sample, &sv.row(j).to_owned());
            }
            predictions[i] = sum;
        }

        Ok(predictions)
    }
}
