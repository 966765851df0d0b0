//! Error taxonomy for cube processes.
//!
//! One variant per openEO process exception. Callers match on the variant
//! rather than on a type hierarchy; [`ProcessError::code`] gives the openEO
//! exception name for reporting.

use thiserror::Error;

/// Result type alias using ProcessError.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Errors raised by data cube processes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessError {
    // === Labels ===
    #[error("Number of labels ({labels}) does not match the length of dimension '{dimension}' ({expected})")]
    DimensionLabelCountMismatch {
        dimension: String,
        labels: usize,
        expected: usize,
    },

    #[error("Array is not labeled")]
    ArrayNotLabeled,

    #[error("Label '{0}' already exists")]
    LabelExists(String),

    #[error("Array labels conflict: {0}")]
    ArrayLabelConflict(String),

    #[error("Labels do not match: {0}")]
    LabelMismatch(String),

    // === Array elements ===
    #[error("The process 'array_element' only allows that either 'index' or 'label' is set")]
    ArrayElementParameterConflict,

    #[error("The process 'array_element' requires either 'index' or 'label' to be set")]
    ArrayElementParameterMissing,

    #[error("The array has no element with the specified index or label: {0}")]
    ArrayElementNotAvailable(String),

    #[error("Array length mismatch: expected {expected}, got {actual}")]
    ArrayLengthMismatch { expected: usize, actual: usize },

    // === Dimensions ===
    #[error("Dimension '{0}' is not available")]
    DimensionNotAvailable(String),

    #[error("Dimension '{0}' is missing")]
    DimensionMissing(String),

    #[error("Dimension '{0}' is ambiguous")]
    DimensionAmbiguous(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("The number of dimensions must be reduced to at most {max}, got {actual}")]
    TooManyDimensions { max: usize, actual: usize },

    #[error("Each dimension of the kernel must have an uneven number of elements")]
    KernelDimensionsUneven,

    // === Parameters ===
    #[error("Process '{process}' parameter '{parameter}' is required")]
    ProcessParameterMissing { process: String, parameter: String },

    #[error("The process 'quantiles' requires either 'probabilities' or 'q' to be set")]
    QuantilesParameterMissing,

    #[error("The process 'quantiles' only allows that either 'probabilities' or 'q' is set")]
    QuantilesParameterConflict,

    #[error("The process 'filter_bands' requires any of the parameters 'bands', 'common_names' or 'wavelengths' to be set")]
    BandFilterParameterMissing,

    #[error("Overlapping data cubes, but no overlap resolver has been specified")]
    OverlapResolverMissing,

    #[error("The minimum value {min} is greater than the maximum value {max}")]
    MinMaxSwapped { min: f64, max: f64 },

    #[error("Units do not match: {0}")]
    UnitMismatch(String),

    // === Bands ===
    #[error("A band with the name '{0}' already exists")]
    BandExists(String),

    #[error("The NIR band can't be resolved, please specify the specific NIR band name")]
    NirBandAmbiguous,

    #[error("The red band can't be resolved, please specify the specific red band name")]
    RedBandAmbiguous,

    // === Data ===
    #[error("There is no data available: {0}")]
    NoDataAvailable(String),

    #[error("The temporal extent is empty: {0}")]
    TemporalExtentEmpty(String),

    #[error("Model '{0}' not found")]
    ModelNotFound(String),
}

impl ProcessError {
    /// The openEO exception name for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ProcessError::DimensionLabelCountMismatch { .. } => "DimensionLabelCountMismatch",
            ProcessError::ArrayNotLabeled => "ArrayNotLabeled",
            ProcessError::LabelExists(_) => "LabelExists",
            ProcessError::ArrayLabelConflict(_) => "ArrayLabelConflict",
            ProcessError::LabelMismatch(_) => "LabelMismatch",
            ProcessError::ArrayElementParameterConflict => "ArrayElementParameterConflict",
            ProcessError::ArrayElementParameterMissing => "ArrayElementParameterMissing",
            ProcessError::ArrayElementNotAvailable(_) => "ArrayElementNotAvailable",
            ProcessError::ArrayLengthMismatch { .. } => "ArrayLengthMismatch",
            ProcessError::DimensionNotAvailable(_) => "DimensionNotAvailable",
            ProcessError::DimensionMissing(_) => "DimensionMissing",
            ProcessError::DimensionAmbiguous(_) => "DimensionAmbiguous",
            ProcessError::DimensionMismatch(_) => "DimensionMismatch",
            ProcessError::TooManyDimensions { .. } => "TooManyDimensions",
            ProcessError::KernelDimensionsUneven => "KernelDimensionsUneven",
            ProcessError::ProcessParameterMissing { .. } => "ProcessParameterMissing",
            ProcessError::QuantilesParameterMissing => "QuantilesParameterMissing",
            ProcessError::QuantilesParameterConflict => "QuantilesParameterConflict",
            ProcessError::BandFilterParameterMissing => "BandFilterParameterMissing",
            ProcessError::OverlapResolverMissing => "OverlapResolverMissing",
            ProcessError::MinMaxSwapped { .. } => "MinMaxSwapped",
            ProcessError::UnitMismatch(_) => "UnitMismatch",
            ProcessError::BandExists(_) => "BandExists",
            ProcessError::NirBandAmbiguous => "NirBandAmbiguous",
            ProcessError::RedBandAmbiguous => "RedBandAmbiguous",
            ProcessError::NoDataAvailable(_) => "NoDataAvailable",
            ProcessError::TemporalExtentEmpty(_) => "TemporalExtentEmpty",
            ProcessError::ModelNotFound(_) => "ModelNotFound",
        }
    }

    /// Whether the error is caused by the caller's input rather than the data.
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            ProcessError::ArrayElementParameterConflict
                | ProcessError::ArrayElementParameterMissing
                | ProcessError::ProcessParameterMissing { .. }
                | ProcessError::QuantilesParameterMissing
                | ProcessError::QuantilesParameterConflict
                | ProcessError::BandFilterParameterMissing
                | ProcessError::MinMaxSwapped { .. }
        )
    }
}
