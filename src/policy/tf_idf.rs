use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::output::{DenseMatrix, SparseMatrix, ValueRows};
use crate::policy::{EncodeInto, EncodingPolicy, TwoPass, UnknownTokens};

/// Term frequency variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TfType {
    /// Number of occurrences of the token in the line.
    #[default]
    RawCount,
    /// 1 if the token occurs in the line.
    Binary,
    /// `ln(1 + count)`.
    SigmoidFreq,
    /// Occurrences divided by the number of tokens in the line.
    TermFrequency,
}

/// Term frequency–inverse document frequency, one row per line and one
/// column per label. Every line of the batch counts as a document.
///
/// The default uses raw counts and smoothed idf.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TfIdfEncoding {
    unknown: UnknownTokens,
    tf_type: TfType,
    smooth_idf: bool,
    // Batch statistics, rebuilt by every encode.
    #[serde(skip)]
    token_frequencies: Vec<AHashMap<usize, usize>>,
    #[serde(skip)]
    line_sizes: Vec<usize>,
    #[serde(skip)]
    containing_lines: AHashMap<usize, usize>,
    #[serde(skip)]
    lines: usize,
}

impl Default for TfIdfEncoding {
    fn default() -> Self {
        Self {
            unknown: UnknownTokens::default(),
            tf_type: TfType::default(),
            smooth_idf: true,
            token_frequencies: Vec::new(),
            line_sizes: Vec::new(),
            containing_lines: AHashMap::new(),
            lines: 0,
        }
    }
}

impl TfIdfEncoding {
    pub fn new(tf_type: TfType, smooth_idf: bool) -> Self {
        Self {
            tf_type,
            smooth_idf,
            ..Self::default()
        }
    }

    pub fn with_unknown_tokens(mut self, unknown: UnknownTokens) -> Self {
        self.unknown = unknown;
        self
    }

    #[inline]
    pub fn tf_type(&self) -> TfType {
        self.tf_type
    }

    pub fn set_tf_type(&mut self, tf_type: TfType) {
        self.tf_type = tf_type;
    }

    #[inline]
    pub fn smooth_idf(&self) -> bool {
        self.smooth_idf
    }

    pub fn set_smooth_idf(&mut self, smooth_idf: bool) {
        self.smooth_idf = smooth_idf;
    }

    fn term_frequency(&self, label: usize, line: usize) -> f64 {
        let count = self
            .token_frequencies
            .get(line)
            .and_then(|freq| freq.get(&label))
            .copied()
            .unwrap_or(0);
        match self.tf_type {
            TfType::RawCount => count as f64,
            TfType::Binary => (count > 0) as u8 as f64,
            TfType::SigmoidFreq => (1.0 + count as f64).ln(),
            TfType::TermFrequency => count as f64 / self.line_sizes[line] as f64,
        }
    }

    fn inverse_document_frequency(&self, label: usize) -> f64 {
        let df = self.containing_lines.get(&label).copied().unwrap_or(0) as f64;
        let n = self.lines as f64;
        if self.smooth_idf {
            ((1.0 + n) / (1.0 + df)).ln() + 1.0
        } else {
            (n / df).ln() + 1.0
        }
    }

    #[inline]
    fn value(&self, label: usize, line: usize) -> f64 {
        self.term_frequency(label, line) * self.inverse_document_frequency(label)
    }

    fn prepare(&mut self, lines: usize) {
        self.lines = lines;
        self.token_frequencies.resize_with(lines, AHashMap::new);
        self.line_sizes.resize(lines, 0);
    }
}

impl PartialEq for TfIdfEncoding {
    fn eq(&self, other: &Self) -> bool {
        self.unknown == other.unknown
            && self.tf_type == other.tf_type
            && self.smooth_idf == other.smooth_idf
    }
}

impl EncodingPolicy for TfIdfEncoding {
    type Pass = TwoPass;
    const NAME: &'static str = "tf_idf";
    const LABEL_COLUMNS: bool = true;

    fn reset(&mut self) {
        self.token_frequencies.clear();
        self.line_sizes.clear();
        self.containing_lines.clear();
        self.lines = 0;
    }

    #[inline]
    fn unknown_tokens(&self) -> UnknownTokens {
        self.unknown
    }

    fn preprocess_token(&mut self, line: usize, _: usize, label: usize) {
        if self.token_frequencies.len() <= line {
            self.prepare(line + 1);
        }
        let count = self.token_frequencies[line].entry(label).or_insert(0);
        *count += 1;
        if *count == 1 {
            *self.containing_lines.entry(label).or_insert(0) += 1;
        }
        self.line_sizes[line] += 1;
    }
}

impl EncodeInto<DenseMatrix> for TfIdfEncoding {
    fn init_output(&mut self, output: &mut DenseMatrix, lines: usize, _: usize, labels: usize) {
        self.prepare(lines);
        output.reset(lines, labels);
    }

    fn encode(&mut self, output: &mut DenseMatrix, label: usize, line: usize, _: usize) {
        output[(line, label)] = self.value(label, line);
    }
}

impl EncodeInto<SparseMatrix> for TfIdfEncoding {
    fn init_output(&mut self, output: &mut SparseMatrix, lines: usize, _: usize, labels: usize) {
        self.prepare(lines);
        output.reset(lines, labels);
    }

    fn encode(&mut self, output: &mut SparseMatrix, label: usize, line: usize, _: usize) {
        let value = self.value(label, line);
        output.set(line, label, value);
    }
}

impl EncodeInto<ValueRows> for TfIdfEncoding {
    fn init_output(&mut self, output: &mut ValueRows, lines: usize, _: usize, labels: usize) {
        self.prepare(lines);
        output.clear();
        output.resize(lines, vec![0.0; labels]);
    }

    fn encode(&mut self, output: &mut ValueRows, label: usize, line: usize, _: usize) {
        output[line][label] = self.value(label, line);
    }
}
