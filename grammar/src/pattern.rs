use regex_automata::meta::Regex;
use regex_automata::{Anchored, Input};
use std::fmt::{self, Display};

use crate::error::Error;

/// A regular expression that only ever matches at a given offset.
///
/// The source text is kept around for display and comparison. Searches are
/// anchored at the offset but see the whole input, so assertions like `\b`
/// look at the text before the offset.
///
/// Escaped slashes in the source are stored unescaped. `\/` and `/` match the
/// same thing and this keeps printed patterns reading back to equal ones.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, Error> {
        let source = unescape_slashes(source);
        let regex = Regex::new(&source).map_err(|e| Error::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })?;
        Ok(Pattern { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match the pattern starting exactly at `offset`, returning the end of the
    /// match.
    ///
    /// `offset` must lie on a character boundary of `input`.
    pub fn match_at(&self, input: &str, offset: usize) -> Option<usize> {
        let search = Input::new(input).range(offset..).anchored(Anchored::Yes);
        self.regex
            .find(search)
            .filter(|m| m.start() == offset)
            .map(|m| m.end())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Pattern) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pattern({:?})", self.source)
    }
}

/// Escapes unescaped slashes so the pattern can be written between slashes.
impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "/")?;
        let mut chars = self.source.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    write!(f, "\\")?;
                    if let Some(next) = chars.next() {
                        write!(f, "{}", next)?;
                    }
                }
                '/' => write!(f, "\\/")?,
                c => write!(f, "{}", c)?,
            }
        }
        write!(f, "/")
    }
}

/// Undo the escaping of slashes in a pattern written between slashes. Other
/// escapes are left for the regex.
pub fn unescape_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('/') => out.push('/'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}
