//! Named transaction sources and the line reader each worker pulls its input through

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::shared::{cwd, DEFAULT_ROSTER};

#[derive(Debug, Clone)]
enum Origin {
    File(PathBuf),
    Inline(String),
}

/// A named stream of transaction sections
#[derive(Debug, Clone)]
pub struct TransactionSource {
    name: String,
    origin: Origin,
}

impl TransactionSource {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        TransactionSource {
            name: name.into(),
            origin: Origin::File(path.into()),
        }
    }

    pub fn inline(name: impl Into<String>, text: impl Into<String>) -> Self {
        TransactionSource {
            name: name.into(),
            origin: Origin::Inline(text.into()),
        }
    }

    /// `<name>.in` in the working directory for every default name
    pub fn default_roster() -> Vec<TransactionSource> {
        DEFAULT_ROSTER
            .iter()
            .map(|name| TransactionSource::file(*name, cwd().join(format!("{}.in", name))))
            .collect()
    }

    /// Parses a `NAME=PATH` command line pair
    pub fn parse_pair(arg: &str) -> Result<Self> {
        match arg.split_once('=') {
            Some((name, path)) if !name.is_empty() && !path.is_empty() => {
                Ok(TransactionSource::file(name, path))
            }
            _ => Err(Error::Config(format!("expected NAME=PATH, got \"{}\"", arg))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the source is named in diagnostics
    pub fn describe(&self) -> String {
        match &self.origin {
            Origin::File(path) => path.display().to_string(),
            Origin::Inline(_) => format!("<inline:{}>", self.name),
        }
    }

    pub fn open(&self) -> Result<TransactionStream> {
        let reader: Box<dyn BufRead + Send> = match &self.origin {
            Origin::File(path) => {
                let handle = File::open(path).map_err(|err| Error::Io {
                    worker: self.name.clone(),
                    source_name: self.describe(),
                    err,
                })?;
                Box::new(BufReader::new(handle))
            }
            Origin::Inline(text) => Box::new(Cursor::new(text.clone().into_bytes())),
        };
        Ok(TransactionStream {
            worker: self.name.clone(),
            source_name: self.describe(),
            reader,
            line_no: 0,
        })
    }
}

/// Line-at-a-time reader over one transaction source
pub struct TransactionStream {
    worker: String,
    source_name: String,
    reader: Box<dyn BufRead + Send>,
    line_no: usize,
}

impl TransactionStream {
    /// The next line without its terminator, or None at end of input
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).map_err(|err| Error::Io {
            worker: self.worker.clone(),
            source_name: self.source_name.clone(),
            err,
        })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// 1-based number of the line most recently returned
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}
