use crate::config::ConfigError;
use crate::parser::ParseError;
use std::error::Error;
use std::io;

#[derive(Debug)]
pub enum AppError {
    Io(io::Error),
    Parse(ParseError),
    Config(ConfigError),
    NoInput,
    EmptyPatch,
    TargetMissing { path: String },
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "A file system error occurred: {err}"),
            AppError::Parse(err) => write!(f, "Failed to parse the patch:\n{err}"),
            AppError::Config(err) => write!(f, "{err}"),
            AppError::NoInput => write!(
                f,
                "No patch file or stdin pipe was provided.\n\n\
                                           Usage examples:\n  \
                                           seam my_changes.diff\n  \
                                           seam -p0 fix.patch --dir src\n  \
                                           git diff | seam -R"
            ),
            AppError::EmptyPatch => {
                write!(f, "The provided input contains no file patches.")
            }
            AppError::TargetMissing { path } => {
                write!(f, "No target file found for patch entry: {path}")
            }
        }
    }
}

impl Error for AppError {}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::Parse(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}
