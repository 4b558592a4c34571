use serde::{Deserialize, Serialize};

use crate::output::{DenseMatrix, LabelSequences, SparseMatrix};
use crate::policy::{EncodeInto, EncodingPolicy, TwoPass, UnknownTokens};

/// Counts token occurrences per line.
///
/// Every output has one row per line and one column per label. With `binary`
/// set, a cell only records whether the token occurs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagOfWordsEncoding {
    unknown: UnknownTokens,
    binary: bool,
}

impl BagOfWordsEncoding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicator encoding instead of counts.
    pub fn binary() -> Self {
        Self {
            binary: true,
            ..Self::default()
        }
    }

    pub fn with_unknown_tokens(mut self, unknown: UnknownTokens) -> Self {
        self.unknown = unknown;
        self
    }

    #[inline]
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    pub fn set_binary(&mut self, binary: bool) {
        self.binary = binary;
    }
}

impl EncodingPolicy for BagOfWordsEncoding {
    type Pass = TwoPass;
    const NAME: &'static str = "bag_of_words";
    const LABEL_COLUMNS: bool = true;

    #[inline]
    fn reset(&mut self) {}

    #[inline]
    fn unknown_tokens(&self) -> UnknownTokens {
        self.unknown
    }
}

impl EncodeInto<DenseMatrix> for BagOfWordsEncoding {
    fn init_output(&mut self, output: &mut DenseMatrix, lines: usize, _: usize, labels: usize) {
        output.reset(lines, labels);
    }

    fn encode(&mut self, output: &mut DenseMatrix, label: usize, line: usize, _: usize) {
        if self.binary {
            output[(line, label)] = 1.0;
        } else {
            output[(line, label)] += 1.0;
        }
    }
}

impl EncodeInto<SparseMatrix> for BagOfWordsEncoding {
    fn init_output(&mut self, output: &mut SparseMatrix, lines: usize, _: usize, labels: usize) {
        output.reset(lines, labels);
    }

    fn encode(&mut self, output: &mut SparseMatrix, label: usize, line: usize, _: usize) {
        if self.binary {
            output.set(line, label, 1.0);
        } else {
            output.add(line, label, 1.0);
        }
    }
}

impl EncodeInto<LabelSequences> for BagOfWordsEncoding {
    fn init_output(&mut self, output: &mut LabelSequences, lines: usize, _: usize, labels: usize) {
        output.clear();
        output.resize(lines, vec![0; labels]);
    }

    fn encode(&mut self, output: &mut LabelSequences, label: usize, line: usize, _: usize) {
        let cell = &mut output[line][label];
        if self.binary {
            *cell = 1;
        } else {
            *cell += 1;
        }
    }
}
