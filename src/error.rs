use std::{
    error::Error,
    fmt::{Display, Formatter},
};

/// A report document could not be understood as a whole.
#[derive(Debug, Clone, Copy)]
pub struct ReportError {
    pub msg: &'static str,
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.msg)
    }
}

impl Error for ReportError {}

/// A request to the report archive was invalid.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveError {
    pub msg: &'static str,
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.msg)
    }
}

impl Error for ArchiveError {}
