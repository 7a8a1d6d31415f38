//! Reading the style source from a file or piped stdin.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use crate::error::InputError;

/// Abstraction over stdin reading.
///
/// Lets tests supply piped content without touching the real stdin.
pub trait StdinReader {
    /// Returns `true` if stdin is interactive, `false` if piped.
    fn is_terminal(&self) -> bool;

    /// Read all content from stdin.
    fn read_to_string(&self) -> io::Result<String>;
}

/// Real stdin reader using std::io.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealStdin;

impl StdinReader for RealStdin {
    fn is_terminal(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn read_to_string(&self) -> io::Result<String> {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

/// Where a style source comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Piped stdin, requested with `-`.
    Stdin,
    /// A file on disk.
    File(PathBuf),
}

impl Source {
    /// Interprets a command-line argument; `-` means stdin.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            Source::Stdin
        } else {
            Source::File(arg.to_path_buf())
        }
    }

    /// Reads the whole source, verbatim.
    pub fn read(&self) -> Result<String, InputError> {
        self.read_with(&RealStdin)
    }

    /// Like [`Source::read`], with an injected stdin reader.
    pub fn read_with<R: StdinReader>(&self, stdin: &R) -> Result<String, InputError> {
        match self {
            Source::Stdin => {
                if stdin.is_terminal() {
                    return Err(InputError::StdinIsTerminal);
                }
                stdin.read_to_string().map_err(InputError::StdinFailed)
            }
            Source::File(path) => {
                std::fs::read_to_string(path).map_err(|source| InputError::FileFailed {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    /// Short name for log and error messages.
    pub fn label(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }
}
