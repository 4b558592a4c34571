mod dense;
mod sparse;

pub use crate::output::dense::DenseMatrix;
pub use crate::output::sparse::SparseMatrix;

/// Jagged output: one label sequence per input line, lengths preserved.
pub type LabelSequences = Vec<Vec<usize>>;

/// Per-line rows of real values.
pub type ValueRows = Vec<Vec<f64>>;
