use thiserror::Error;

/// Errors that can occur while dispatching or evaluating a hypothesis test
#[derive(Error, Debug)]
pub enum StatsError {
    // Argument binding errors
    #[error("{function}() got multiple values for argument '{argument}'")]
    ArgumentConflict {
        function: &'static str,
        argument: String,
    },

    #[error("{function}() missing required argument '{argument}'")]
    MissingArgument {
        function: &'static str,
        argument: String,
    },

    #[error("{function}() got an unexpected keyword argument '{argument}'")]
    UnexpectedArgument {
        function: &'static str,
        argument: String,
    },

    #[error("{function}() takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        function: &'static str,
        expected: usize,
        given: usize,
    },

    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    // Input validation errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: {0}")]
    InsufficientDataMsg(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatchMsg(String),

    // Shape errors
    #[error("axis {axis} is out of bounds for array of dimension {ndim}")]
    AxisOutOfBounds { axis: isize, ndim: usize },

    #[error("Array shapes are incompatible for broadcasting: {0}")]
    IncompatibleShapes(String),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    // Kernel capability / numerical errors
    #[error("{kernel} does not support native axis evaluation")]
    NativeAxisUnsupported { kernel: &'static str },

    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Result type for statistical operations
pub type StatsResult<T> = Result<T, StatsError>;
