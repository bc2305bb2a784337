use super::error::{InputError, ParseErrorKind};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Line-oriented reader with one line of lookahead and line-number tracking.
pub struct LineReader<R> {
    lines: Lines<R>,
    path: String,
    line: usize,
    peeked: Option<String>,
}

impl LineReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, InputError> {
        let file = File::open(path).map_err(|e| InputError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(Self::new(BufReader::new(file), path.to_string_lossy()))
    }
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, path: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            path: path.into(),
            line: 0,
            peeked: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of the line most recently returned.
    pub fn line_number(&self) -> usize {
        self.line
    }

    fn fetch(&mut self) -> Result<Option<String>, InputError> {
        match self.lines.next() {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(InputError::Io {
                path: self.path.clone(),
                source: e,
            }),
            None => Ok(None),
        }
    }

    /// The next raw line, blank lines included.
    pub fn next_line(&mut self) -> Result<Option<String>, InputError> {
        let next = match self.peeked.take() {
            Some(line) => Some(line),
            None => self.fetch()?,
        };
        if next.is_some() {
            self.line += 1;
        }
        Ok(next)
    }

    /// Looks at the next raw line without consuming it.
    pub fn peek_line(&mut self) -> Result<Option<&str>, InputError> {
        if self.peeked.is_none() {
            self.peeked = self.fetch()?;
        }
        Ok(self.peeked.as_deref())
    }

    /// The next non-blank line; end of input is an error naming what was expected.
    pub fn require_line(&mut self, expected: &str) -> Result<String, InputError> {
        loop {
            match self.next_line()? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(line),
                None => {
                    return Err(InputError::UnexpectedEof {
                        path: self.path.clone(),
                        line: self.line,
                        expected: expected.to_string(),
                    });
                }
            }
        }
    }

    /// A parse error located at the current line.
    pub fn error(&self, kind: ParseErrorKind) -> InputError {
        InputError::Parse {
            path: self.path.clone(),
            line: self.line,
            kind,
        }
    }
}
