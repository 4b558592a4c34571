mod bag_of_words;
mod dictionary;
mod tf_idf;

use serde::{Deserialize, Serialize};

pub use crate::policy::bag_of_words::BagOfWordsEncoding;
pub use crate::policy::dictionary::DictionaryEncoding;
pub use crate::policy::tf_idf::{TfIdfEncoding, TfType};

use crate::dictionary::Dictionary;
use crate::error::{EncodingError, Result};

/// Capability marker of policies that can emit label sequences while tokenizing.
#[derive(Debug)]
pub enum OnePass {}

/// Capability marker of policies that need every label of the batch before writing.
#[derive(Debug)]
pub enum TwoPass {}

/// How encoding treats a token that is absent from the dictionary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTokens {
    /// Insert the token, extending the dictionary.
    #[default]
    Grow,
    /// Emit a fixed out-of-vocabulary label.
    Sentinel(usize),
    /// Drop the token; it counts toward nothing.
    Skip,
    /// Fail with [`EncodingError::UnknownToken`].
    Reject,
}

impl UnknownTokens {
    /// Resolves the label of `token`. `None` means the token is dropped.
    pub fn resolve(self, dictionary: &mut Dictionary, token: &str) -> Result<Option<usize>> {
        if let Some(label) = dictionary.find(token) {
            return Ok(Some(label));
        }
        match self {
            Self::Grow => Ok(Some(dictionary.insert(token))),
            Self::Sentinel(label) => Ok(Some(label)),
            Self::Skip => Ok(None),
            Self::Reject => Err(EncodingError::UnknownToken(token.to_owned())),
        }
    }

    /// Fails when a sentinel label lies past `limit`.
    pub fn check_sentinel(self, limit: usize) -> Result<()> {
        match self {
            Self::Sentinel(label) if label > limit => {
                Err(EncodingError::SentinelOutOfRange { label, limit })
            }
            _ => Ok(()),
        }
    }
}

/// Algorithm turning token labels into output values.
pub trait EncodingPolicy {
    /// Either [`OnePass`] or [`TwoPass`]. Selects how label sequences are encoded.
    type Pass;

    /// Policy tag stored in archives.
    const NAME: &'static str;

    /// Whether the output has one column per label. Sentinel labels of such
    /// policies may not lie past the end of the dictionary.
    const LABEL_COLUMNS: bool = false;

    /// Clears per-call state. Called at the start of every encode.
    fn reset(&mut self);

    /// Treatment of tokens missing from the dictionary.
    fn unknown_tokens(&self) -> UnknownTokens;

    /// Sees every label of the batch before the output is initialized.
    #[inline]
    fn preprocess_token(&mut self, _line: usize, _index: usize, _label: usize) {}
}

/// Element-wise writer of a policy into output shape `O`.
pub trait EncodeInto<O>: EncodingPolicy {
    /// Shapes `output` for `lines` inputs. `max_tokens` is the longest line
    /// and `labels` the number of label columns.
    fn init_output(&mut self, output: &mut O, lines: usize, max_tokens: usize, labels: usize);

    /// Writes the `index`-th label of `line`.
    fn encode(&mut self, output: &mut O, label: usize, line: usize, index: usize);
}

/// Policies that write label sequences directly while tokenizing.
pub trait OnePassEncoding: EncodingPolicy<Pass = OnePass> {
    fn encode_one_pass(&mut self, line_output: &mut Vec<usize>, label: usize);
}
