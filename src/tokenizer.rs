use std::convert::Infallible;

pub mod char_extract;
pub mod split_by_any_of;

pub use crate::tokenizer::char_extract::CharExtract;
pub use crate::tokenizer::split_by_any_of::SplitByAnyOf;

/// Produces successive tokens from a view over the unconsumed text of a line.
///
/// Encoding stops reading a line as soon as [`Tokenizer::is_token_empty`] fires
/// and never calls [`Tokenizer::next_token`] again for that line.
pub trait Tokenizer {
    /// Returns the next token and advances `view` past it.
    fn next_token<'a>(&self, view: &mut &'a str) -> &'a str;

    /// Reports whether `token` is the end-of-input sentinel.
    #[inline]
    fn is_token_empty(&self, token: &str) -> bool {
        token.is_empty()
    }
}

impl<T: Tokenizer + ?Sized> Tokenizer for &T {
    #[inline]
    fn next_token<'a>(&self, view: &mut &'a str) -> &'a str {
        (**self).next_token(view)
    }

    #[inline]
    fn is_token_empty(&self, token: &str) -> bool {
        (**self).is_token_empty(token)
    }
}

/// Feeds every token of `text` to `f`, stopping at the end-of-input sentinel
/// or at the first error. `next_token` is never called past the sentinel.
pub fn try_for_each_token<'a, T, E, F>(tokenizer: &T, text: &'a str, mut f: F) -> Result<(), E>
where
    T: Tokenizer + ?Sized,
    F: FnMut(&'a str) -> Result<(), E>,
{
    let mut view = text;
    loop {
        let token = tokenizer.next_token(&mut view);
        if tokenizer.is_token_empty(token) {
            return Ok(());
        }
        f(token)?;
    }
}

/// Infallible form of [`try_for_each_token`].
pub fn for_each_token<'a, T, F>(tokenizer: &T, text: &'a str, mut f: F)
where
    T: Tokenizer + ?Sized,
    F: FnMut(&'a str),
{
    try_for_each_token(tokenizer, text, |token| {
        f(token);
        Ok::<(), Infallible>(())
    })
    .unwrap_or_else(|never| match never {})
}

/// Collects every token of `text`.
pub fn tokenize<'a, T: Tokenizer + ?Sized>(tokenizer: &T, text: &'a str) -> Vec<&'a str> {
    let mut tokens = Vec::new();
    for_each_token(tokenizer, text, |token| tokens.push(token));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Yields `limit` tokens, then the sentinel, then junk to catch extra calls.
    struct Counting {
        calls: Cell<usize>,
        limit: usize,
    }

    impl Tokenizer for Counting {
        fn next_token<'a>(&self, _view: &mut &'a str) -> &'a str {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if n < self.limit {
                "x"
            } else if n == self.limit {
                ""
            } else {
                "after-sentinel"
            }
        }
    }

    #[test]
    fn test_stops_at_sentinel() {
        let tokenizer = Counting {
            calls: Cell::new(0),
            limit: 3,
        };
        let tokens = tokenize(&tokenizer, "ignored");
        assert_eq!(tokens, vec!["x", "x", "x"]);
        assert_eq!(tokenizer.calls.get(), 4);
    }

    #[test]
    fn test_stops_at_first_error() {
        let tokenizer = Counting {
            calls: Cell::new(0),
            limit: 5,
        };
        let mut seen = 0;
        let result = try_for_each_token(&tokenizer, "ignored", |_| {
            seen += 1;
            if seen == 2 {
                Err("stop")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(tokenizer.calls.get(), 2);
    }
}
