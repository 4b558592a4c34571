//! Translate lines of text into numbers.
//!
//! A [`StringEncoding`] owns a [`Dictionary`] that assigns every distinct token a
//! dense label in first-seen order, plus an encoding policy that turns labels
//! into output values:
//!
//! - [`DictionaryEncoding`]: the labels themselves, one column per token position.
//! - [`BagOfWordsEncoding`]: per-line token counts, one column per label.
//! - [`TfIdfEncoding`]: tf-idf weights, one column per label.
//!
//! ```
//! use string_encoding::{DenseMatrix, DictionaryEncoding, SplitByAnyOf, StringEncoding};
//!
//! let mut encoder = StringEncoding::new(DictionaryEncoding::new());
//! let tokenizer = SplitByAnyOf::whitespace();
//!
//! let mut sequences: Vec<Vec<usize>> = Vec::new();
//! encoder.encode(&["a b", "a c d"], &mut sequences, &tokenizer).unwrap();
//! assert_eq!(sequences, vec![vec![0, 1], vec![0, 2, 3]]);
//!
//! let mut dense = DenseMatrix::default();
//! encoder.encode(&["a b", "a c d"], &mut dense, &tokenizer).unwrap();
//! assert_eq!(dense.to_rows(), vec![vec![0.0, 1.0, 0.0], vec![0.0, 2.0, 3.0]]);
//! ```
pub mod config;
pub mod dictionary;
pub mod error;
pub mod loader;
pub mod output;
pub mod policy;
pub mod string_encoding;
pub mod tokenizer;

pub use config::{ConfiguredTokenizer, EncoderConfig, PolicyKind};
pub use dictionary::Dictionary;
pub use error::{EncodingError, Result};
pub use output::{DenseMatrix, LabelSequences, SparseMatrix, ValueRows};
pub use policy::{
    BagOfWordsEncoding, DictionaryEncoding, EncodeInto, EncodingPolicy, OnePass,
    OnePassEncoding, TfIdfEncoding, TfType, TwoPass, UnknownTokens,
};
pub use string_encoding::{EncodeTarget, SequencePath, StringEncoding, FORMAT_VERSION};
pub use tokenizer::{CharExtract, SplitByAnyOf, Tokenizer};
