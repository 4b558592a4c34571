use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::loader::CorpusSource;

/// Reads every line from a buffered reader.
pub(crate) fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    Ok(reader.lines().collect::<Result<Vec<_>, _>>()?)
}

pub struct PlainFileCorpus {
    filepath: PathBuf,
}

impl PlainFileCorpus {
    pub fn new<P>(filepath: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            filepath: PathBuf::from(filepath.as_ref()),
        }
    }
}

impl CorpusSource for PlainFileCorpus {
    fn lines(&self) -> Result<Vec<String>> {
        read_lines(BufReader::new(File::open(&self.filepath)?))
    }
}

/// In-memory corpus.
pub struct TextCorpus<'a> {
    text: &'a str,
}

impl<'a> TextCorpus<'a> {
    pub const fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl<'a> CorpusSource for TextCorpus<'a> {
    fn lines(&self) -> Result<Vec<String>> {
        Ok(self.text.lines().map(str::to_owned).collect())
    }
}
