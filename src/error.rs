use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The table geometry or configuration cannot produce a valid layout.
    /// Raised before any page is generated.
    Config(String),
    /// An explicitly supplied font file could not be read or parsed.
    Font(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "invalid table configuration: {msg}"),
            Error::Font(msg) => write!(f, "font error: {msg}"),
            Error::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
