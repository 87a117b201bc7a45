//! Source lines and indentation analysis
//!
//! A `.pyx` file is read once into [`SourceLine`]s with comments and blank
//! lines removed. [`Indentation::analyze`] then infers the file's indentation
//! unit (the smallest positive leading-space count) and rejects files whose
//! indentation is not a multiple of it, before any translation happens.

use super::StubError;

/// Ellipsis step used when a file has no indented line at all
pub const DEFAULT_STEP: usize = 4;

/// One non-blank source line after comment stripping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the source file
    pub number: usize,
    /// Count of leading space characters
    pub spaces: usize,
    /// Indentation contains a tab
    pub tabbed: bool,
    /// Content without indentation, comment or trailing whitespace
    pub text: String,
}

impl SourceLine {
    /// Build a source line from raw text, or `None` if nothing but a comment
    /// or whitespace remains
    #[must_use]
    pub fn parse(number: usize, raw: &str) -> Option<Self> {
        let code = strip_comment(raw).trim_end();
        let text = code.trim_start_matches(' ');
        if text.trim().is_empty() {
            return None;
        }

        Some(Self {
            number,
            spaces: code.len() - text.len(),
            tabbed: text.starts_with(char::is_whitespace),
            text: text.trim_start().to_string(),
        })
    }
}

/// Split file content into non-blank, comment-free source lines
#[must_use]
pub fn source_lines(content: &str) -> Vec<SourceLine> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| SourceLine::parse(idx + 1, raw))
        .collect()
}

/// Inferred indentation of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indentation {
    unit: Option<usize>,
}

impl Indentation {
    /// Infer the indentation unit and validate every line against it
    ///
    /// # Errors
    ///
    /// Returns [`StubError::TabIndentation`] for the first line indented with a
    /// tab, and [`StubError::InconsistentIndentation`] for the first line whose
    /// leading-space count is not a multiple of the unit.
    pub fn analyze(lines: &[SourceLine]) -> Result<Self, StubError> {
        if let Some(tabbed) = lines.iter().find(|line| line.tabbed) {
            return Err(StubError::TabIndentation {
                line: tabbed.number,
            });
        }

        let unit = lines
            .iter()
            .map(|line| line.spaces)
            .filter(|&spaces| spaces > 0)
            .min();

        if let Some(unit) = unit
            && let Some(bad) = lines.iter().find(|line| line.spaces % unit != 0)
        {
            return Err(StubError::InconsistentIndentation {
                line: bad.number,
                found: bad.spaces,
                unit,
            });
        }

        Ok(Self { unit })
    }

    /// Indentation unit, `None` for a flat file
    #[must_use]
    #[inline]
    pub const fn unit(&self) -> Option<usize> {
        self.unit
    }

    /// Spaces that make up one level of nesting
    #[must_use]
    #[inline]
    pub fn step(&self) -> usize {
        self.unit.unwrap_or(DEFAULT_STEP)
    }

    /// Nesting level of a line
    #[must_use]
    #[inline]
    pub fn level(&self, line: &SourceLine) -> usize {
        self.unit.map_or(0, |unit| line.spaces / unit)
    }
}

/// Remove a trailing `#` comment, ignoring `#` inside string literals
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (None, '\'' | '"') => quote = Some(ch),
            (None, '#') => return &line[..idx],
            _ => {}
        }
    }

    line
}

/// Collapse runs of whitespace outside string literals to single spaces
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;

    for ch in text.trim().chars() {
        if quote.is_none() && ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);

        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (None, '\'' | '"') => quote = Some(ch),
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(content: &str) -> Vec<SourceLine> {
        source_lines(content)
    }

    mod source_line {
        use super::*;

        #[test]
        fn counts_leading_spaces() {
            let line = SourceLine::parse(1, "  def test():").unwrap();
            assert_eq!(line.spaces, 2);
            assert_eq!(line.text, "def test():");

            let line = SourceLine::parse(1, "    a = 'hello'").unwrap();
            assert_eq!(line.spaces, 4);
        }

        #[test]
        fn marks_tab_indentation() {
            assert!(SourceLine::parse(1, "\tx: int").unwrap().tabbed);
            assert!(SourceLine::parse(1, "  \tx: int").unwrap().tabbed);
            assert!(!SourceLine::parse(1, "    x = '\t'").unwrap().tabbed);
        }

        #[test]
        fn drops_comment_only_and_blank_lines() {
            assert!(SourceLine::parse(1, "# some other things").is_none());
            assert!(SourceLine::parse(1, "        ").is_none());
            assert!(SourceLine::parse(1, "    # indented comment").is_none());
        }

        #[test]
        fn keeps_line_numbers_of_the_source_file() {
            let parsed = lines("\ncimport numpy\n\n# note\nimport os\n");
            let numbers: Vec<_> = parsed.iter().map(|l| l.number).collect();
            assert_eq!(numbers, vec![2, 5]);
        }
    }

    mod comments {
        use super::*;

        #[test]
        fn strips_trailing_comment() {
            assert_eq!(strip_comment("x = 1  # set x"), "x = 1  ");
        }

        #[test]
        fn keeps_hash_inside_strings() {
            assert_eq!(strip_comment("color = '#fff'"), "color = '#fff'");
            assert_eq!(
                strip_comment(r#"s = "a \" # b" # real"#),
                r#"s = "a \" # b" "#
            );
        }
    }

    mod collapse {
        use super::*;

        #[test]
        fn collapses_runs_of_whitespace() {
            assert_eq!(
                collapse_whitespace("cpdef   int  add(int a,\tint b):"),
                "cpdef int add(int a, int b):"
            );
        }

        #[test]
        fn leaves_string_contents_alone() {
            assert_eq!(collapse_whitespace("x  =  'a   b'"), "x = 'a   b'");
        }
    }

    mod analyze {
        use super::*;

        #[test]
        fn tab_indented_file_is_rejected() {
            let parsed = lines("class A:\n\tx: int\n\tdef f(self):\n\t\tpass\n");
            let err = Indentation::analyze(&parsed).unwrap_err();
            assert!(matches!(err, StubError::TabIndentation { line: 2 }));
        }

        #[test]
        fn smallest_positive_indent_is_the_unit() {
            let parsed = lines("class A:\n  x: int\n  def f(self):\n    pass\n");
            let indentation = Indentation::analyze(&parsed).unwrap();
            assert_eq!(indentation.unit(), Some(2));
            assert_eq!(indentation.step(), 2);
        }

        #[test]
        fn flat_file_has_no_unit() {
            let parsed = lines("import os\ncimport numpy\n");
            let indentation = Indentation::analyze(&parsed).unwrap();
            assert_eq!(indentation.unit(), None);
            assert_eq!(indentation.step(), DEFAULT_STEP);
            assert!(parsed.iter().all(|l| indentation.level(l) == 0));
        }

        #[test]
        fn levels_divide_by_unit() {
            let parsed = lines("def f():\n   a = 1\n   if a:\n      b = 2\n");
            let indentation = Indentation::analyze(&parsed).unwrap();
            let levels: Vec<_> = parsed.iter().map(|l| indentation.level(l)).collect();
            assert_eq!(levels, vec![0, 1, 1, 2]);
        }

        #[test]
        fn rejects_indent_not_divisible_by_unit() {
            let parsed = lines("\n    good_indentation:str\n     bad_indentation:str");
            let err = Indentation::analyze(&parsed).unwrap_err();
            match err {
                StubError::InconsistentIndentation { line, found, unit } => {
                    assert_eq!(line, 3);
                    assert_eq!(found, 5);
                    assert_eq!(unit, 4);
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn mixed_two_and_three_spaces() {
            let parsed = lines("class A:\n  a = 1\n   b = 2\n");
            let err = Indentation::analyze(&parsed).unwrap_err().to_string();
            assert!(err.contains('3'), "{err}");
            assert!(err.contains('2'), "{err}");
        }
    }
}
