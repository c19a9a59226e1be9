use thiserror::Error;

/// Errors surfaced by the model fitter.
///
/// Numeric degeneracies inside the EM loop (underflowing responsibilities)
/// are handled locally and never surface here; see `fit::Fitter::e_step`.
#[derive(Error, Debug)]
pub enum FitError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("class-center system for class {class} is singular; restart with a different seed or fewer classes")]
    SingularModel { class: usize },

    #[error("linear algebra error: {0}")]
    LinAlg(String),
}

impl From<ndarray_linalg::error::LinalgError> for FitError {
    fn from(e: ndarray_linalg::error::LinalgError) -> Self {
        FitError::LinAlg(e.to_string())
    }
}
