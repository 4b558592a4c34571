use crate::tokenizer::Tokenizer;

/// Yields every character of the text as its own token, delimiters included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharExtract;

impl Tokenizer for CharExtract {
    /// ```
    /// use string_encoding::{CharExtract, Tokenizer};
    ///
    /// let mut view = "aé b";
    /// assert_eq!(CharExtract.next_token(&mut view), "a");
    /// assert_eq!(CharExtract.next_token(&mut view), "é");
    /// assert_eq!(CharExtract.next_token(&mut view), " ");
    /// assert_eq!(CharExtract.next_token(&mut view), "b");
    /// assert_eq!(CharExtract.next_token(&mut view), "");
    /// ```
    #[inline]
    fn next_token<'a>(&self, view: &mut &'a str) -> &'a str {
        let end = view.chars().next().map_or(0, char::len_utf8);
        let (token, rest) = view.split_at(end);
        *view = rest;
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_chars() {
        assert_eq!(tokenize(&CharExtract, "abba"), vec!["a", "b", "b", "a"]);
        assert!(tokenize(&CharExtract, "").is_empty());
    }
}
