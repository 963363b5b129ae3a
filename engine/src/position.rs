use grammar::{Error, Pattern};

/// Keep track of a position within a str, updating on successful operations.
#[derive(Debug, Clone)]
pub struct Position<'a> {
    pub input: &'a str,
    pub idx: usize,
}

impl<'a> Position<'a> {
    /// Create a new cursor, ensuring that `start` is within bounds and on a
    /// character boundary.
    pub fn new(input: &'a str, start: usize) -> Result<Self, Error> {
        if input.is_char_boundary(start) {
            Ok(Position { input, idx: start })
        } else {
            Err(Error::OffsetOutOfBounds {
                offset: start,
                len: input.len(),
            })
        }
    }

    /// Check if a string matches the current input starting at the current
    /// index. The index will be updated on match.
    pub fn match_str(&mut self, s: &str) -> bool {
        let end = self.idx + s.len();
        if self.input.get(self.idx..end) == Some(s) {
            self.idx = end;
            true
        } else {
            false
        }
    }

    /// Check if a pattern matches starting exactly at the current index. The
    /// index will be updated on match.
    pub fn match_pattern(&mut self, p: &Pattern) -> bool {
        match p.match_at(self.input, self.idx) {
            Some(end) => {
                self.idx = end;
                true
            }
            None => false,
        }
    }

    /// What the input holds at the current index, for error messages.
    pub fn found(&self, n: usize) -> String {
        let rest = &self.input[self.idx..];
        if rest.is_empty() {
            "end of input".to_owned()
        } else {
            format!("'{}'", rest.chars().take(n.max(1)).collect::<String>())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_match_str_simple() {
        let tests = vec![
            ("", 0, "", true),
            ("hello", 0, "world", false),
            ("hello", 0, "hello", true),
            ("hello", 0, "ello", false),
            ("hello", 1, "ello", true),
            ("he", 1, "ello", false),
        ];
        for test in tests {
            let mut c = Position::new(test.0, test.1).unwrap();
            let got = c.match_str(test.2);
            assert_eq!(got, test.3, "test case: {:?}", test);
        }
    }

    #[test]
    fn position_match_str_idx_multiple() {
        let mut c = Position::new("hello", 0).unwrap();
        let got1 = c.match_str("he");
        let got2 = c.match_str("llo");
        assert!(got1);
        assert!(got2, "cursor: {:?}", c);
        assert_eq!(c.idx, 5);
    }

    #[test]
    fn position_match_pattern() {
        let p = Pattern::new("[0-9]+").unwrap();
        let mut c = Position::new("ab12c", 0).unwrap();
        assert!(!c.match_pattern(&p));
        assert_eq!(c.idx, 0);
        c.idx = 2;
        assert!(c.match_pattern(&p));
        assert_eq!(c.idx, 4);
    }

    #[test]
    fn position_out_of_bounds() {
        let tests = vec![("abc", 4), ("é", 1)];
        for test in tests {
            let err = Position::new(test.0, test.1).unwrap_err();
            assert_eq!(
                err,
                Error::OffsetOutOfBounds {
                    offset: test.1,
                    len: test.0.len()
                }
            );
        }
    }

    #[test]
    fn found_description() {
        let c = Position::new("abc", 1).unwrap();
        assert_eq!(c.found(1), "'b'");
        assert_eq!(c.found(5), "'bc'");
        let c = Position::new("abc", 3).unwrap();
        assert_eq!(c.found(1), "end of input");
    }
}
