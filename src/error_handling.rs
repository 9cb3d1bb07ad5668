use std::fmt::Display;
use std::path::{Path, PathBuf};

use itertools::Itertools;

pub trait ErrorType: Display + PartialEq {}

/// Where a grammar error was found. Line 0 means the whole file.
#[derive(Debug, PartialEq, Clone)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize
}

impl Location {
    pub fn new(file: impl AsRef<Path>) -> Self {
        Location {
            file: file.as_ref().to_path_buf(),
            line: 0
        }
    }

    pub fn at_line(&self, line: usize) -> Self {
        Location {
            file: self.file.clone(),
            line
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = if self.file.as_os_str().is_empty() {
            "<input>".to_string()
        } else {
            self.file.display().to_string()
        };

        if self.line == 0 {
            write!(f, "{}", file)
        } else {
            write!(f, "{}:{}", file, self.line)
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Error<T: ErrorType> {
    pub location: Location,
    pub error: T
}

impl<T: ErrorType> Error<T> {
    pub fn new(location: Location, error: T) -> Self {
        Error { location, error }
    }
}

impl<T: ErrorType> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[31;49;1m[{}]\x1b[39;49;1m  {}\x1b[0m", self.location, self.error)
    }
}

pub type Errors<T> = Vec<Error<T>>;

// One error per line, in the order they were found
pub fn report<T: ErrorType>(errors: &Errors<T>) -> String {
    errors.iter().join("\n")
}
