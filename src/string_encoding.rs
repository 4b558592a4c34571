use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::dictionary::Dictionary;
use crate::error::{EncodingError, Result};
use crate::output::{DenseMatrix, LabelSequences, SparseMatrix, ValueRows};
use crate::policy::{EncodeInto, EncodingPolicy, OnePass, OnePassEncoding, TwoPass};
use crate::tokenizer::{for_each_token, try_for_each_token, Tokenizer};

/// Version written into every archive. Archives from newer versions are refused.
pub const FORMAT_VERSION: u32 = 1;

/// Translates lines of text into numbers with an encoding policy `P`.
///
/// The encoder owns a [`Dictionary`] that persists across calls, so labels
/// assigned by one [`StringEncoding::encode`] stay valid for the next. The
/// dictionary and the policy are copied, moved and persisted together.
///
/// Encoding is single-threaded. To encode in parallel, give each partition of
/// the corpus its own encoder and combine the dictionaries with
/// [`Dictionary::merge`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StringEncoding<P> {
    policy: P,
    dictionary: Dictionary,
    strict: bool,
}

#[derive(Serialize)]
struct ArchiveRef<'a, P> {
    version: u32,
    policy: &'static str,
    encoding: &'a StringEncoding<P>,
}

impl<P> StringEncoding<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            dictionary: Dictionary::new(),
            strict: false,
        }
    }

    /// Overwrites this encoder with a deep copy of `source`.
    pub fn copy_from(&mut self, source: &Self)
    where
        P: Clone,
    {
        self.policy.clone_from(&source.policy);
        self.dictionary.clone_from(&source.dictionary);
        self.strict = source.strict;
    }

    /// Inserts every token of `input` into the dictionary.
    ///
    /// Input without tokens leaves the dictionary as it is.
    pub fn create_map<T: Tokenizer + ?Sized>(&mut self, input: &str, tokenizer: &T) {
        let before = self.dictionary.len();
        let dictionary = &mut self.dictionary;
        for_each_token(tokenizer, input, |token| {
            dictionary.insert(token);
        });
        debug!(
            added = self.dictionary.len() - before,
            size = self.dictionary.len(),
            "created map"
        );
    }

    /// Clears the dictionary. Policy state is left untouched.
    pub fn clear(&mut self) {
        self.dictionary.clear();
    }

    #[inline]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    #[inline]
    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }

    #[inline]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    #[inline]
    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// In strict mode an encoding error is logged and then aborts via panic
    /// instead of being returned.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }
}

impl<P: EncodingPolicy> StringEncoding<P> {
    /// Encodes every line of `input` into `output`.
    ///
    /// Row (or sequence) `i` of the output corresponds to line `i`. The output
    /// is reshaped and overwritten. Which algorithm runs is fixed by the pair of
    /// policy and output types; pairs the policy does not support do not compile.
    pub fn encode<S, O, T>(&mut self, input: &[S], output: &mut O, tokenizer: &T) -> Result<()>
    where
        S: AsRef<str>,
        O: EncodeTarget<P>,
        T: Tokenizer + ?Sized,
    {
        let result = O::encode_lines(self, input, output, tokenizer);
        match result {
            Err(e) if self.strict => {
                error!(error = %e, "encoding failed");
                panic!("encoding failed: {e}");
            }
            other => other,
        }
    }

    /// Tokenizes every line first, then writes each label through the policy.
    ///
    /// `output` is left untouched when an error is returned.
    fn encode_generic<S, O, T>(&mut self, input: &[S], output: &mut O, tokenizer: &T) -> Result<()>
    where
        S: AsRef<str>,
        P: EncodeInto<O>,
        T: Tokenizer + ?Sized,
    {
        let unknown = self.policy.unknown_tokens();
        if P::LABEL_COLUMNS {
            unknown.check_sentinel(self.dictionary.len())?;
        }
        self.policy.reset();

        let mut lines = Vec::with_capacity(input.len());
        let mut max_tokens = 0;
        let mut labels = self.dictionary.len();
        for (line, text) in input.iter().enumerate() {
            let mut line_labels = Vec::new();
            try_for_each_token(tokenizer, text.as_ref(), |token| -> Result<()> {
                if let Some(label) = unknown.resolve(&mut self.dictionary, token)? {
                    self.policy.preprocess_token(line, line_labels.len(), label);
                    if P::LABEL_COLUMNS {
                        let limit = self.dictionary.len();
                        let columns = label
                            .checked_add(1)
                            .ok_or(EncodingError::SentinelOutOfRange { label, limit })?;
                        labels = labels.max(columns);
                    }
                    line_labels.push(label);
                }
                Ok(())
            })?;
            max_tokens = max_tokens.max(line_labels.len());
            lines.push(line_labels);
        }
        labels = labels.max(self.dictionary.len());

        self.policy.init_output(output, input.len(), max_tokens, labels);
        for (line, line_labels) in lines.iter().enumerate() {
            for (index, &label) in line_labels.iter().enumerate() {
                self.policy.encode(output, label, line, index);
            }
        }

        debug!(
            lines = input.len(),
            max_tokens,
            labels,
            dictionary = self.dictionary.len(),
            "encoded (two pass)"
        );
        Ok(())
    }

    /// Writes label sequences while tokenizing.
    ///
    /// `output` is left untouched when an error is returned.
    fn encode_one_pass<S, T>(
        &mut self,
        input: &[S],
        output: &mut LabelSequences,
        tokenizer: &T,
    ) -> Result<()>
    where
        S: AsRef<str>,
        P: OnePassEncoding,
        T: Tokenizer + ?Sized,
    {
        self.policy.reset();
        let unknown = self.policy.unknown_tokens();

        let mut sequences = Vec::with_capacity(input.len());
        for text in input {
            let mut line_output = Vec::new();
            try_for_each_token(tokenizer, text.as_ref(), |token| -> Result<()> {
                if let Some(label) = unknown.resolve(&mut self.dictionary, token)? {
                    self.policy.encode_one_pass(&mut line_output, label);
                }
                Ok(())
            })?;
            sequences.push(line_output);
        }
        *output = sequences;

        debug!(
            lines = input.len(),
            dictionary = self.dictionary.len(),
            "encoded (one pass)"
        );
        Ok(())
    }
}

impl<P: EncodingPolicy + Serialize> StringEncoding<P> {
    /// Serializes the encoder into the writer. Returns the number of bytes written.
    ///
    /// The archive records the format version and [`EncodingPolicy::NAME`].
    pub fn serialize_into<W: Write>(&self, writer: W) -> Result<usize> {
        let archive = ArchiveRef {
            version: FORMAT_VERSION,
            policy: P::NAME,
            encoding: self,
        };
        let size = bincode::serialized_size(&archive)? as usize;
        bincode::serialize_into(writer, &archive)?;
        Ok(size)
    }

    pub fn save<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        let size = self.serialize_into(&mut writer)?;
        writer.flush()?;
        info!(
            path = %path.as_ref().display(),
            bytes = size,
            tokens = self.dictionary.len(),
            "saved encoder"
        );
        Ok(())
    }
}

impl<P: EncodingPolicy + DeserializeOwned> StringEncoding<P> {
    /// Deserializes an encoder written by [`StringEncoding::serialize_into`].
    ///
    /// Fails with [`EncodingError::PolicyMismatch`] when the archive was written
    /// with another policy than `P`.
    pub fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let version: u32 = bincode::deserialize_from(&mut reader)?;
        if version > FORMAT_VERSION {
            return Err(EncodingError::UnsupportedVersion(version));
        }
        let policy: String = bincode::deserialize_from(&mut reader)?;
        if policy != P::NAME {
            return Err(EncodingError::PolicyMismatch {
                expected: P::NAME.to_owned(),
                found: policy,
            });
        }
        Ok(bincode::deserialize_from(reader)?)
    }

    pub fn load<Q: AsRef<Path>>(path: Q) -> Result<Self> {
        let encoding = Self::deserialize_from(BufReader::new(File::open(path.as_ref())?))?;
        info!(
            path = %path.as_ref().display(),
            tokens = encoding.dictionary.len(),
            "loaded encoder"
        );
        Ok(encoding)
    }
}

impl<P> From<P> for StringEncoding<P> {
    fn from(policy: P) -> Self {
        Self::new(policy)
    }
}

/// Output shapes an encoder with policy `P` can write into.
///
/// Implemented once per output type; the implementation picks the algorithm.
pub trait EncodeTarget<P: EncodingPolicy>: Sized {
    fn encode_lines<S, T>(
        encoding: &mut StringEncoding<P>,
        input: &[S],
        output: &mut Self,
        tokenizer: &T,
    ) -> Result<()>
    where
        S: AsRef<str>,
        T: Tokenizer + ?Sized;
}

impl<P: EncodeInto<DenseMatrix>> EncodeTarget<P> for DenseMatrix {
    fn encode_lines<S, T>(
        encoding: &mut StringEncoding<P>,
        input: &[S],
        output: &mut Self,
        tokenizer: &T,
    ) -> Result<()>
    where
        S: AsRef<str>,
        T: Tokenizer + ?Sized,
    {
        encoding.encode_generic(input, output, tokenizer)
    }
}

impl<P: EncodeInto<SparseMatrix>> EncodeTarget<P> for SparseMatrix {
    fn encode_lines<S, T>(
        encoding: &mut StringEncoding<P>,
        input: &[S],
        output: &mut Self,
        tokenizer: &T,
    ) -> Result<()>
    where
        S: AsRef<str>,
        T: Tokenizer + ?Sized,
    {
        encoding.encode_generic(input, output, tokenizer)
    }
}

impl<P: EncodeInto<ValueRows>> EncodeTarget<P> for ValueRows {
    fn encode_lines<S, T>(
        encoding: &mut StringEncoding<P>,
        input: &[S],
        output: &mut Self,
        tokenizer: &T,
    ) -> Result<()>
    where
        S: AsRef<str>,
        T: Tokenizer + ?Sized,
    {
        encoding.encode_generic(input, output, tokenizer)
    }
}

impl<P> EncodeTarget<P> for LabelSequences
where
    P: EncodingPolicy,
    P::Pass: SequencePath<P>,
{
    fn encode_lines<S, T>(
        encoding: &mut StringEncoding<P>,
        input: &[S],
        output: &mut Self,
        tokenizer: &T,
    ) -> Result<()>
    where
        S: AsRef<str>,
        T: Tokenizer + ?Sized,
    {
        <P::Pass as SequencePath<P>>::encode_sequences(encoding, input, output, tokenizer)
    }
}

/// Selects how label sequences are produced, keyed on the policy's pass marker.
pub trait SequencePath<P: EncodingPolicy> {
    fn encode_sequences<S, T>(
        encoding: &mut StringEncoding<P>,
        input: &[S],
        output: &mut LabelSequences,
        tokenizer: &T,
    ) -> Result<()>
    where
        S: AsRef<str>,
        T: Tokenizer + ?Sized;
}

impl<P: OnePassEncoding> SequencePath<P> for OnePass {
    fn encode_sequences<S, T>(
        encoding: &mut StringEncoding<P>,
        input: &[S],
        output: &mut LabelSequences,
        tokenizer: &T,
    ) -> Result<()>
    where
        S: AsRef<str>,
        T: Tokenizer + ?Sized,
    {
        encoding.encode_one_pass(input, output, tokenizer)
    }
}

impl<P> SequencePath<P> for TwoPass
where
    P: EncodingPolicy<Pass = TwoPass> + EncodeInto<LabelSequences>,
{
    fn encode_sequences<S, T>(
        encoding: &mut StringEncoding<P>,
        input: &[S],
        output: &mut LabelSequences,
        tokenizer: &T,
    ) -> Result<()>
    where
        S: AsRef<str>,
        T: Tokenizer + ?Sized,
    {
        encoding.encode_generic(input, output, tokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{BagOfWordsEncoding, DictionaryEncoding, UnknownTokens};
    use crate::tokenizer::SplitByAnyOf;
    use std::cell::Cell;

    /// Whitespace tokenizer that counts its calls.
    struct Counting {
        inner: SplitByAnyOf,
        calls: Cell<usize>,
    }

    impl Counting {
        fn new() -> Self {
            Self {
                inner: SplitByAnyOf::whitespace(),
                calls: Cell::new(0),
            }
        }

        fn take_calls(&self) -> usize {
            self.calls.replace(0)
        }
    }

    impl Tokenizer for Counting {
        fn next_token<'a>(&self, view: &mut &'a str) -> &'a str {
            self.calls.set(self.calls.get() + 1);
            self.inner.next_token(view)
        }
    }

    fn corpus() -> Vec<&'static str> {
        vec!["a b", "a c d"]
    }

    #[test]
    fn test_labels_and_sequences() {
        let mut encoder = StringEncoding::new(DictionaryEncoding::new());
        let mut output = LabelSequences::new();
        encoder
            .encode(&corpus(), &mut output, &SplitByAnyOf::whitespace())
            .unwrap();

        assert_eq!(output, vec![vec![0, 1], vec![0, 2, 3]]);
        let dict = encoder.dictionary();
        for (token, label) in [("a", 0), ("b", 1), ("c", 2), ("d", 3)] {
            assert_eq!(dict.find(token), Some(label));
        }
    }

    #[test]
    fn test_dense_is_zero_padded() {
        let mut encoder = StringEncoding::new(DictionaryEncoding::new());
        let mut output = DenseMatrix::default();
        encoder
            .encode(&corpus(), &mut output, &SplitByAnyOf::whitespace())
            .unwrap();

        assert_eq!(
            output.to_rows(),
            vec![vec![0.0, 1.0, 0.0], vec![0.0, 2.0, 3.0]]
        );
    }

    #[test]
    fn test_sparse_positions() {
        let mut encoder = StringEncoding::new(DictionaryEncoding::new());
        let mut output = SparseMatrix::default();
        encoder
            .encode(&["x y z"], &mut output, &SplitByAnyOf::whitespace())
            .unwrap();

        assert_eq!((output.rows(), output.cols()), (1, 3));
        assert_eq!(output.get(0, 2), 2.0);
        // Label 0 is not stored.
        assert_eq!(output.nnz(), 2);
    }

    #[test]
    fn test_empty_lines() {
        let mut encoder = StringEncoding::new(DictionaryEncoding::new());
        let tokenizer = SplitByAnyOf::whitespace();

        let mut sequences = vec![vec![42]];
        encoder.encode(&["", "  "], &mut sequences, &tokenizer).unwrap();
        assert_eq!(sequences, vec![Vec::<usize>::new(), Vec::new()]);

        let mut dense = DenseMatrix::zeros(3, 3);
        let empty: [&str; 0] = [];
        encoder.encode(&empty, &mut dense, &tokenizer).unwrap();
        assert_eq!((dense.rows(), dense.cols()), (0, 0));
    }

    #[test]
    fn test_create_map() {
        let mut encoder = StringEncoding::new(DictionaryEncoding::new());
        let tokenizer = SplitByAnyOf::whitespace();
        encoder.create_map("b a b c", &tokenizer);
        encoder.create_map("", &tokenizer);

        assert_eq!(encoder.dictionary().len(), 3);
        assert_eq!(encoder.dictionary().find("c"), Some(2));
    }

    #[test]
    fn test_reject_and_strict() {
        let mut encoder = StringEncoding::new(DictionaryEncoding::with_unknown_tokens(
            UnknownTokens::Reject,
        ));
        let tokenizer = SplitByAnyOf::whitespace();
        encoder.create_map("a b", &tokenizer);

        let mut output = LabelSequences::new();
        let err = encoder.encode(&["a q"], &mut output, &tokenizer).unwrap_err();
        assert!(matches!(err, EncodingError::UnknownToken(t) if t == "q"));
        assert_eq!(encoder.dictionary().len(), 2);
    }

    #[test]
    #[should_panic(expected = "encoding failed")]
    fn test_strict_mode_panics() {
        let mut encoder = StringEncoding::new(DictionaryEncoding::with_unknown_tokens(
            UnknownTokens::Reject,
        ));
        encoder.set_strict(true);
        let mut output = LabelSequences::new();
        let _ = encoder.encode(&["unseen"], &mut output, &SplitByAnyOf::whitespace());
    }

    #[test]
    fn test_sentinel_widens_columns() {
        let mut encoder = StringEncoding::new(
            BagOfWordsEncoding::new().with_unknown_tokens(UnknownTokens::Sentinel(2)),
        );
        let tokenizer = SplitByAnyOf::whitespace();
        encoder.create_map("a b", &tokenizer);

        let mut output = LabelSequences::new();
        encoder.encode(&["a x y", "b"], &mut output, &tokenizer).unwrap();
        assert_eq!(output, vec![vec![1, 0, 2], vec![0, 1, 0]]);
    }

    #[test]
    fn test_sentinel_past_dictionary_is_refused() {
        let tokenizer = SplitByAnyOf::whitespace();
        for sentinel in [3, usize::MAX] {
            let mut encoder = StringEncoding::new(
                BagOfWordsEncoding::new().with_unknown_tokens(UnknownTokens::Sentinel(sentinel)),
            );
            encoder.create_map("a b", &tokenizer);

            let mut output = DenseMatrix::default();
            let err = encoder.encode(&["a x"], &mut output, &tokenizer).unwrap_err();
            assert!(matches!(
                err,
                EncodingError::SentinelOutOfRange { label, limit: 2 } if label == sentinel
            ));
            assert!(output.is_empty());
        }
    }

    #[test]
    fn test_dictionary_keeps_any_sentinel() {
        let mut encoder = StringEncoding::new(DictionaryEncoding::with_unknown_tokens(
            UnknownTokens::Sentinel(usize::MAX),
        ));
        let tokenizer = SplitByAnyOf::whitespace();
        encoder.create_map("a", &tokenizer);

        let mut dense = DenseMatrix::default();
        encoder.encode(&["a x"], &mut dense, &tokenizer).unwrap();
        assert_eq!(dense.to_rows(), vec![vec![0.0, usize::MAX as f64]]);

        let mut sequences = LabelSequences::new();
        encoder.encode(&["x a"], &mut sequences, &tokenizer).unwrap();
        assert_eq!(sequences, vec![vec![usize::MAX, 0]]);
    }

    #[test]
    fn test_token_walk_stops_at_first_empty_token() {
        let tokenizer = Counting::new();
        let input = ["a b", "c"];

        let mut encoder = StringEncoding::new(DictionaryEncoding::new());
        encoder.create_map("a b c", &tokenizer);
        assert_eq!(tokenizer.take_calls(), 4);

        // Three tokens plus one empty token per line.
        let mut sequences = LabelSequences::new();
        encoder.encode(&input, &mut sequences, &tokenizer).unwrap();
        assert_eq!(tokenizer.take_calls(), 5);

        let mut bag = StringEncoding::new(BagOfWordsEncoding::new());
        let mut dense = DenseMatrix::default();
        bag.encode(&input, &mut dense, &tokenizer).unwrap();
        assert_eq!(tokenizer.take_calls(), 5);
    }

    #[test]
    fn test_failed_encode_leaves_output() {
        let tokenizer = SplitByAnyOf::whitespace();
        let input = ["a", "a q"];

        let mut encoder = StringEncoding::new(DictionaryEncoding::with_unknown_tokens(
            UnknownTokens::Reject,
        ));
        encoder.create_map("a", &tokenizer);
        let mut sequences = vec![vec![9, 9]];
        assert!(encoder.encode(&input, &mut sequences, &tokenizer).is_err());
        assert_eq!(sequences, vec![vec![9, 9]]);

        let mut bag = StringEncoding::new(
            BagOfWordsEncoding::new().with_unknown_tokens(UnknownTokens::Reject),
        );
        bag.create_map("a", &tokenizer);
        let mut dense = DenseMatrix::from_rows(&[[7.0, 7.0]]).unwrap();
        assert!(bag.encode(&input, &mut dense, &tokenizer).is_err());
        assert_eq!(dense.to_rows(), vec![vec![7.0, 7.0]]);
    }

    #[test]
    fn test_clear_keeps_policy() {
        let mut encoder = StringEncoding::new(BagOfWordsEncoding::binary());
        encoder.create_map("a b", &SplitByAnyOf::whitespace());
        encoder.clear();
        assert!(encoder.dictionary().is_empty());
        assert!(encoder.policy().is_binary());
    }

    #[test]
    fn test_copy_from() {
        let mut source = StringEncoding::new(DictionaryEncoding::new());
        source.create_map("p q r", &SplitByAnyOf::whitespace());

        let mut copy = StringEncoding::default();
        copy.copy_from(&source);
        assert_eq!(copy, source);

        copy.dictionary_mut().insert("s");
        assert_eq!(source.dictionary().len(), 3);
    }

    #[test]
    fn test_newer_version_is_refused() {
        #[derive(Serialize)]
        struct Future {
            version: u32,
        }
        let bytes = bincode::serialize(&Future {
            version: FORMAT_VERSION + 1,
        })
        .unwrap();
        let err = StringEncoding::<DictionaryEncoding>::deserialize_from(&bytes[..]).unwrap_err();
        assert!(matches!(err, EncodingError::UnsupportedVersion(v) if v == FORMAT_VERSION + 1));
    }

    #[test]
    fn test_other_policy_is_refused() {
        let mut encoder = StringEncoding::new(BagOfWordsEncoding::binary());
        encoder.create_map("a b", &SplitByAnyOf::whitespace());
        let mut bytes = Vec::new();
        encoder.serialize_into(&mut bytes).unwrap();

        let err = StringEncoding::<DictionaryEncoding>::deserialize_from(&bytes[..]).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::PolicyMismatch { expected, found }
                if expected == "dictionary" && found == "bag_of_words"
        ));

        let loaded = StringEncoding::<BagOfWordsEncoding>::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(loaded, encoder);
    }
}
