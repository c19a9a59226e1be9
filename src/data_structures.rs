use ndarray::Array2;

use crate::error::FitError;

/// What kind of signal a measurement column carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalType {
    FoldChange,
    PValue,
    Raw,
}

/// One observed time point: the time itself plus the experiment metadata it
/// came from. Only the time enters the fit; label and signal type are carried
/// for result attribution.
#[derive(Clone, Debug)]
pub struct TimePoint {
    pub time: f64,
    pub label: String,
    pub signal_type: SignalType,
}

impl TimePoint {
    pub fn new(time: f64, label: impl Into<String>, signal_type: SignalType) -> Self {
        Self {
            time,
            label: label.into(),
            signal_type,
        }
    }
}

/// The immutable observation matrix: rows are time points (shared by all
/// genes), columns are genes.
#[derive(Clone)]
pub struct TimeSeriesDataset {
    pub y: Array2<f64>,
    pub time_points: Vec<TimePoint>,
    pub gene_names: Vec<String>,
}

impl TimeSeriesDataset {
    pub fn new(
        y: Array2<f64>,
        time_points: Vec<TimePoint>,
        gene_names: Vec<String>,
    ) -> Result<Self, FitError> {
        let ds = Self {
            y,
            time_points,
            gene_names,
        };
        ds.validate()?;
        Ok(ds)
    }

    pub fn num_time_points(&self) -> usize {
        self.y.nrows()
    }

    pub fn num_genes(&self) -> usize {
        self.y.ncols()
    }

    /// The ordered observation times.
    pub fn times(&self) -> Vec<f64> {
        self.time_points.iter().map(|tp| tp.time).collect()
    }

    pub fn validate(&self) -> Result<(), FitError> {
        if self.time_points.len() != self.y.nrows() {
            return Err(FitError::InvalidInput(format!(
                "{} time points but {} observation rows",
                self.time_points.len(),
                self.y.nrows()
            )));
        }
        if self.gene_names.len() != self.y.ncols() {
            return Err(FitError::InvalidInput(format!(
                "{} gene names but {} observation columns",
                self.gene_names.len(),
                self.y.ncols()
            )));
        }
        let times = self.times();
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FitError::InvalidInput(
                "time points must be strictly increasing".into(),
            ));
        }
        if self.y.iter().any(|v| !v.is_finite()) {
            return Err(FitError::InvalidInput(
                "observation matrix contains non-finite values".into(),
            ));
        }
        Ok(())
    }
}

/// Tuning knobs for the EM fit.
#[derive(Clone, Debug)]
pub struct FitConfig {
    /// Number of latent temporal-expression classes.
    pub num_classes: usize,
    /// Convergence threshold for the log-likelihood ratio test.
    pub threshold: f64,
    /// Iterations to run before the ratio test may stop the loop.
    pub min_iterations: usize,
    /// Hard cap on EM iterations. Reaching it is not an error; the fit is
    /// returned with `converged = false`.
    pub max_iterations: usize,
    /// Override for the number of control points. Default: floor(n/3) + 2.
    pub num_control_points: Option<usize>,
    /// Seed for the initialization RNG; fits are reproducible per seed.
    pub seed: u64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            num_classes: 20,
            threshold: 0.005,
            min_iterations: 3,
            max_iterations: 15,
            num_control_points: None,
            seed: 42,
        }
    }
}
