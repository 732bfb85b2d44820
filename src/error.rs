use thiserror::Error;

/// Errors raised by the synthesis core and the modules that feed it.
///
/// All of these are input-validation failures: they are reported as soon as
/// they are detected and no partial result is ever returned alongside them.
#[derive(Error, Debug)]
pub enum SpectrumError {
    #[error("invalid spectrum axis: {0}")]
    InvalidAxis(String),
    #[error("invalid broadening kernel: {0}")]
    InvalidKernel(String),
    #[error("invalid mode: {0}")]
    InvalidMode(String),
    #[error("unsupported frequency unit '{0}'")]
    UnsupportedUnit(String),
    #[error("mode data is inconsistent: {0}")]
    InconsistentModeData(String),
    #[error("band index {0} is assigned to more than one group")]
    DuplicateBandIndex(usize),
    #[error("band index {index} is out of bounds for {num_modes} modes")]
    BandIndexOutOfRange { index: usize, num_modes: usize },
    #[error("groups reference {referenced} band indices but there are {num_modes} modes")]
    IncompleteGrouping { referenced: usize, num_modes: usize },
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("CSV error")]
    Csv(#[from] csv::Error),
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpectrumError>;
