use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// Mapping from observed tokens to dense labels, assigned in first-seen order.
///
/// Labels always cover `0..len()` without gaps. A label never changes while the
/// token stays in the dictionary; only [`Dictionary::clear`] drops the table.
///
/// Only the label-ordered token list is serialized. The lookup map is rebuilt
/// on deserialization, so every token comes back with the same label.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Dictionary {
    map: AHashMap<String, usize>,
    tokens: Vec<String>,
}

impl Dictionary {
    /// Creates an empty [`Dictionary`].
    pub fn new() -> Self {
        Self {
            map: AHashMap::new(),
            tokens: Vec::new(),
        }
    }

    /// Returns the label of `token`, assigning the next free label if it is unseen.
    ///
    /// ```
    /// use string_encoding::Dictionary;
    ///
    /// let mut dict = Dictionary::new();
    /// assert_eq!(dict.insert("a"), 0);
    /// assert_eq!(dict.insert("b"), 1);
    /// assert_eq!(dict.insert("a"), 0);
    /// assert_eq!(dict.len(), 2);
    /// ```
    pub fn insert(&mut self, token: &str) -> usize {
        if let Some(&label) = self.map.get(token) {
            return label;
        }
        let label = self.tokens.len();
        self.map.insert(token.to_owned(), label);
        self.tokens.push(token.to_owned());
        label
    }

    /// Looks up a token without modifying the dictionary.
    #[inline]
    pub fn find(&self, token: &str) -> Option<usize> {
        self.map.get(token).copied()
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.map.contains_key(token)
    }

    /// Reverse lookup of a label.
    #[inline]
    pub fn token(&self, label: usize) -> Option<&str> {
        self.tokens.get(label).map(String::as_str)
    }

    /// Removes every token. Labels restart at zero.
    pub fn clear(&mut self) {
        self.map.clear();
        self.tokens.clear();
    }

    /// Number of distinct tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates over `(token, label)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(label, token)| (token.as_str(), label))
    }

    /// Appends the tokens of `other` that are unknown here, in `other`'s label order.
    ///
    /// Existing labels are untouched. This is how dictionaries built over
    /// separate partitions of a corpus are combined.
    pub fn merge(&mut self, other: &Dictionary) {
        for (token, _) in other.iter() {
            self.insert(token);
        }
    }
}

impl TryFrom<Vec<String>> for Dictionary {
    type Error = EncodingError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        let mut map = AHashMap::with_capacity(tokens.len());
        for (label, token) in tokens.iter().enumerate() {
            if map.insert(token.clone(), label).is_some() {
                return Err(EncodingError::DuplicatedToken(token.clone()));
            }
        }
        Ok(Self { map, tokens })
    }
}

impl From<Dictionary> for Vec<String> {
    fn from(dict: Dictionary) -> Self {
        dict.tokens
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for Dictionary {}
