use crate::tokenizer::Tokenizer;

/// Splits text on any of a set of delimiter characters.
///
/// Runs of delimiters are skipped, so no empty token is produced between two
/// adjacent delimiters. The empty token marks the end of the line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitByAnyOf {
    delimiters: Vec<char>,
}

impl SplitByAnyOf {
    pub fn new<S: AsRef<str>>(delimiters: S) -> Self {
        Self {
            delimiters: delimiters.as_ref().chars().collect(),
        }
    }

    /// Splits on ASCII whitespace.
    pub fn whitespace() -> Self {
        Self::new(" \t\r\n")
    }

    #[inline]
    pub fn delimiters(&self) -> &[char] {
        &self.delimiters
    }

    #[inline(always)]
    fn is_delimiter(&self, c: char) -> bool {
        self.delimiters.contains(&c)
    }
}

impl Default for SplitByAnyOf {
    fn default() -> Self {
        Self::whitespace()
    }
}

impl Tokenizer for SplitByAnyOf {
    /// Returns the next run of non-delimiter characters.
    ///
    /// ```
    /// use string_encoding::{SplitByAnyOf, Tokenizer};
    ///
    /// let tokenizer = SplitByAnyOf::new(" ,");
    /// let mut view = "  abc,, de f";
    ///
    /// assert_eq!(tokenizer.next_token(&mut view), "abc");
    /// assert_eq!(tokenizer.next_token(&mut view), "de");
    /// assert_eq!(tokenizer.next_token(&mut view), "f");
    /// assert_eq!(tokenizer.next_token(&mut view), "");
    /// ```
    fn next_token<'a>(&self, view: &mut &'a str) -> &'a str {
        let text = view.trim_start_matches(|c: char| self.is_delimiter(c));
        let end = text.find(|c: char| self.is_delimiter(c)).unwrap_or(text.len());
        let (token, rest) = text.split_at(end);
        *view = rest;
        token
    }
}
