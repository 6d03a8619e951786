//! Query/variable resolution from the command line and standard input.

use crate::error::QueryOrigin;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::io::{self, IsTerminal, Read};

/// Source of query text when no positional argument is given.
pub trait QueryInput {
    /// True when the input is an interactive terminal (nothing piped in).
    fn is_terminal(&self) -> bool;

    /// Read the input to the end.
    fn read_all(&mut self) -> io::Result<String>;
}

impl QueryInput for io::Stdin {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }

    fn read_all(&mut self) -> io::Result<String> {
        let mut buf = String::new();
        self.lock().read_to_string(&mut buf)?;
        Ok(buf)
    }
}

/// Determine the query text.
///
/// Positional arguments win; otherwise piped input is read once. An
/// interactive terminal with no arguments is an error rather than a prompt.
pub fn resolve_query<S: AsRef<str>>(args: &[S], input: &mut dyn QueryInput) -> Result<String> {
    if !args.is_empty() {
        let joined = args.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
        let query = joined.trim();
        if query.is_empty() {
            return Err(Error::empty_query(QueryOrigin::Argument));
        }
        return Ok(query.to_string());
    }

    if input.is_terminal() {
        return Err(Error::empty_query(QueryOrigin::Missing));
    }

    let raw = input.read_all()?;
    let query = raw.trim();
    if query.is_empty() {
        return Err(Error::empty_query(QueryOrigin::Stdin));
    }
    Ok(query.to_string())
}

/// Parse the `--vars` flag. An absent or empty flag means "no variables".
pub fn resolve_variables(raw: Option<&str>) -> Result<Option<Map<String, Value>>> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => serde_json::from_str::<Map<String, Value>>(s)
            .map(Some)
            .map_err(Error::InvalidVariablesJson),
    }
}
