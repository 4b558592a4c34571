use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::policy::{BagOfWordsEncoding, DictionaryEncoding, TfIdfEncoding, TfType, UnknownTokens};
use crate::tokenizer::{CharExtract, SplitByAnyOf, Tokenizer};

/// Encoding algorithms selectable from a config file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Dictionary,
    BagOfWords,
    TfIdf,
}

/// Settings for building an encoder, usually read from a JSON file.
///
/// ```
/// use string_encoding::{EncoderConfig, PolicyKind};
///
/// let config: EncoderConfig =
///     serde_json::from_str(r#"{ "policy": "tf_idf", "smooth_idf": false }"#).unwrap();
/// assert_eq!(config.policy, PolicyKind::TfIdf);
/// assert!(!config.smooth_idf);
/// assert_eq!(config.delimiters, " \t\r\n");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub policy: PolicyKind,
    pub unknown_tokens: UnknownTokens,
    /// Bag of words: record presence instead of counts.
    pub binary: bool,
    pub tf_type: TfType,
    pub smooth_idf: bool,
    /// Characters separating tokens.
    pub delimiters: String,
    /// Tokenize into single characters, ignoring `delimiters`.
    pub char_tokens: bool,
    /// Panic on encoding errors instead of returning them.
    pub strict: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            unknown_tokens: UnknownTokens::default(),
            binary: false,
            tf_type: TfType::default(),
            smooth_idf: true,
            delimiters: " \t\r\n".to_string(),
            char_tokens: false,
            strict: false,
        }
    }
}

impl EncoderConfig {
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn tokenizer(&self) -> ConfiguredTokenizer {
        if self.char_tokens {
            ConfiguredTokenizer::Chars(CharExtract)
        } else {
            ConfiguredTokenizer::Split(SplitByAnyOf::new(&self.delimiters))
        }
    }

    pub fn dictionary_policy(&self) -> DictionaryEncoding {
        DictionaryEncoding::with_unknown_tokens(self.unknown_tokens)
    }

    pub fn bag_of_words_policy(&self) -> BagOfWordsEncoding {
        let mut policy = BagOfWordsEncoding::new().with_unknown_tokens(self.unknown_tokens);
        policy.set_binary(self.binary);
        policy
    }

    pub fn tf_idf_policy(&self) -> TfIdfEncoding {
        TfIdfEncoding::new(self.tf_type, self.smooth_idf).with_unknown_tokens(self.unknown_tokens)
    }
}

/// Tokenizer chosen by an [`EncoderConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfiguredTokenizer {
    Split(SplitByAnyOf),
    Chars(CharExtract),
}

impl Tokenizer for ConfiguredTokenizer {
    #[inline]
    fn next_token<'a>(&self, view: &mut &'a str) -> &'a str {
        match self {
            Self::Split(t) => t.next_token(view),
            Self::Chars(t) => t.next_token(view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config: EncoderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EncoderConfig::default());
        assert_eq!(config.dictionary_policy(), DictionaryEncoding::new());
    }

    #[test]
    fn test_tf_idf_default_is_smoothed() {
        let policy = TfIdfEncoding::default();
        assert!(policy.smooth_idf());
        assert_eq!(policy.tf_type(), TfType::RawCount);
        assert_eq!(policy, EncoderConfig::default().tf_idf_policy());
    }

    #[test]
    fn test_from_json_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "policy": "bag_of_words", "binary": true, "unknown_tokens": "skip", "delimiters": "," }}"#
        )
        .unwrap();

        let config = EncoderConfig::from_json_path(file.path()).unwrap();
        assert_eq!(config.policy, PolicyKind::BagOfWords);
        assert!(config.bag_of_words_policy().is_binary());
        assert_eq!(tokenize(&config.tokenizer(), "a,b,,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_char_tokens() {
        let config = EncoderConfig {
            char_tokens: true,
            ..EncoderConfig::default()
        };
        assert_eq!(tokenize(&config.tokenizer(), "a b"), vec!["a", " ", "b"]);
    }
}
