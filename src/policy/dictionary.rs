use serde::{Deserialize, Serialize};

use crate::output::{DenseMatrix, SparseMatrix};
use crate::policy::{EncodeInto, EncodingPolicy, OnePass, OnePassEncoding, UnknownTokens};

/// Replaces every token with its dictionary label.
///
/// Matrix outputs have one row per line and one column per token position;
/// cells past the end of a line are zero. Label sequences are written in a
/// single pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEncoding {
    unknown: UnknownTokens,
}

impl DictionaryEncoding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_tokens(unknown: UnknownTokens) -> Self {
        Self { unknown }
    }

    pub fn set_unknown_tokens(&mut self, unknown: UnknownTokens) {
        self.unknown = unknown;
    }
}

impl EncodingPolicy for DictionaryEncoding {
    type Pass = OnePass;
    const NAME: &'static str = "dictionary";

    #[inline]
    fn reset(&mut self) {}

    #[inline]
    fn unknown_tokens(&self) -> UnknownTokens {
        self.unknown
    }
}

impl EncodeInto<DenseMatrix> for DictionaryEncoding {
    fn init_output(&mut self, output: &mut DenseMatrix, lines: usize, max_tokens: usize, _: usize) {
        output.reset(lines, max_tokens);
    }

    #[inline]
    fn encode(&mut self, output: &mut DenseMatrix, label: usize, line: usize, index: usize) {
        output[(line, index)] = label as f64;
    }
}

impl EncodeInto<SparseMatrix> for DictionaryEncoding {
    fn init_output(&mut self, output: &mut SparseMatrix, lines: usize, max_tokens: usize, _: usize) {
        output.reset(lines, max_tokens);
    }

    #[inline]
    fn encode(&mut self, output: &mut SparseMatrix, label: usize, line: usize, index: usize) {
        output.set(line, index, label as f64);
    }
}

impl OnePassEncoding for DictionaryEncoding {
    #[inline]
    fn encode_one_pass(&mut self, line_output: &mut Vec<usize>, label: usize) {
        line_output.push(label);
    }
}
