//! Raw records: one text line split on a literal delimiter.
//!
//! Splitting never fails. Empty fields (including trailing ones) are kept so
//! that column indices stay stable; callers decide how many fields they need.

/// Field delimiter used by the dedup pipeline.
pub const PIPE: char = '|';

/// Field delimiter used by the triplet aggregation job.
pub const SPACE: char = ' ';

/// Characters that separate lines inside a chunk handed to one map call.
pub const LINE_BREAKS: &[char] = &['\n', '\r', '\x0C'];

/// An ordered, immutable sequence of string fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Split `line` on every occurrence of `delimiter`, matched literally.
    ///
    /// ```
    /// use recordbeam::record::Record;
    /// let r = Record::parse("a||b|", '|');
    /// assert_eq!(r.fields(), ["a", "", "b", ""]);
    /// ```
    pub fn parse(line: &str, delimiter: char) -> Self {
        Self {
            fields: split_fields(line, delimiter),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Split `line` into owned fields. No trimming, no escaping.
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(str::to_owned).collect()
}

/// Tokenize a chunk on line-break characters, dropping empty tokens.
pub fn split_lines(chunk: &str) -> impl Iterator<Item = &str> {
    chunk.split(LINE_BREAKS).filter(|s| !s.is_empty())
}
