//! Line classification and scope tracking
//!
//! Every source line gets a [`LineKind`] from its own trimmed text and the
//! names the file imports from `cython`. Whether a non-definition line
//! survives into the stub depends on the scopes that are open when it is
//! reached, so [`scan`] folds a [`ScopeStack`] left to right over the file and
//! records the [`ScopeState`] that applies to each line.

use super::StubError;
use super::indent::{Indentation, SourceLine};

/// Keywords that introduce a natively typed definition
pub const NATIVE_DEF_KEYWORDS: &[&str] = &["cdef", "cpdef"];

/// Keyword that introduces a plain Python definition
pub const PLAIN_DEF_KEYWORD: &str = "def";

/// Words following `cdef` that open a C declaration block, not a definition
const NATIVE_BLOCK_KEYWORDS: &[&str] = &[
    "struct", "union", "extern", "cppclass", "fused", "packed", "enum",
];

/// Words opening a compound statement whose contents are never stub material
const STATEMENT_BLOCK_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "with", "try", "except", "finally", "async",
    "match", "case", "ctypedef",
];

/// What a single line is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `import x`, `cimport x`, `from x import y`, `from x cimport y`
    Import,
    /// `class X:` or `cdef class X(Base):`
    ClassDef,
    /// `cdef enum X:` / `cpdef enum X:`
    EnumDef,
    /// `def`, `cdef` or `cpdef` function header
    FunctionDef {
        /// Declared with `cdef`/`cpdef` and therefore carrying C types
        native: bool,
    },
    /// `@property`, `@staticmethod`, any user decorator
    PropertyOrDecorator,
    /// `@cython.boundscheck(False)` and friends; never emitted
    Directive,
    /// `if ...:`, `cdef:`, `cdef struct P:` and other statement blocks; never
    /// emitted
    BlockStatement,
    /// Anything else
    PlainStatement,
}

impl LineKind {
    /// Classify a line of a file that imports nothing from `cython`
    #[must_use]
    pub fn of(text: &str) -> Self {
        Self::of_in(text, &CythonImports::default())
    }

    /// Classify one trimmed, comment-free line
    ///
    /// A definition with its body on the same line is classified by its
    /// header. Only function headers count; `cdef class A: pass` stays a
    /// statement.
    #[must_use]
    pub fn of_in(text: &str, imports: &CythonImports) -> Self {
        let header = definition_header(text);
        if header.len() < text.len() {
            return match Self::of_header(header, imports) {
                kind @ Self::FunctionDef { .. } => kind,
                _ => Self::PlainStatement,
            };
        }
        Self::of_header(text, imports)
    }

    fn of_header(text: &str, imports: &CythonImports) -> Self {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let Some(&first) = tokens.first() else {
            return Self::PlainStatement;
        };

        if is_import(&tokens) {
            return Self::Import;
        }

        if let Some(decorator) = text.strip_prefix('@') {
            return if is_directive(decorator, imports) {
                Self::Directive
            } else {
                Self::PropertyOrDecorator
            };
        }

        if !text.ends_with(':') {
            return Self::PlainStatement;
        }

        let native_head = NATIVE_DEF_KEYWORDS.contains(&first);

        if (first == "class" || native_head) && tokens.contains(&"class") {
            return Self::ClassDef;
        }

        if native_head {
            match tokens.get(1).copied() {
                Some("enum") if tokens.len() > 2 => return Self::EnumDef,
                Some(word) if NATIVE_BLOCK_KEYWORDS.contains(&word.trim_end_matches(':')) => {
                    return Self::BlockStatement;
                }
                _ => return Self::FunctionDef { native: true },
            }
        }

        if first == PLAIN_DEF_KEYWORD
            || (first == "async" && tokens.get(1) == Some(&PLAIN_DEF_KEYWORD))
        {
            return Self::FunctionDef { native: false };
        }

        if first == "cdef:" || STATEMENT_BLOCK_KEYWORDS.contains(&first.trim_end_matches(':')) {
            return Self::BlockStatement;
        }

        Self::PlainStatement
    }

    /// Definition lines are emitted regardless of scope
    #[must_use]
    #[inline]
    pub const fn is_definition(self) -> bool {
        matches!(
            self,
            Self::Import
                | Self::ClassDef
                | Self::EnumDef
                | Self::FunctionDef { .. }
                | Self::PropertyOrDecorator
        )
    }
}

fn is_import(tokens: &[&str]) -> bool {
    match tokens {
        ["import" | "cimport", _, ..] => true,
        ["from", _, "import" | "cimport", _, ..] => true,
        _ => false,
    }
}

fn is_directive(decorator: &str, imports: &CythonImports) -> bool {
    let name = decorator
        .split('(')
        .next()
        .unwrap_or(decorator)
        .trim();

    name == "cython" || name.starts_with("cython.") || imports.contains(name)
}

/// Names a file binds with `from cython cimport ...`
///
/// A bare decorator is a compiler directive only when its name comes from
/// the `cython` module, so `@final` from `typing` stays in the stub.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CythonImports {
    names: Vec<String>,
}

impl CythonImports {
    /// Collect the names bound by `from cython cimport`/`import` lines
    #[must_use]
    pub fn collect(lines: &[SourceLine]) -> Self {
        let names = lines
            .iter()
            .filter_map(|line| names_from_cython(&line.text))
            .flatten()
            .collect();
        Self { names }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|imported| imported == name)
    }
}

/// `from cython cimport boundscheck, final as sealed` -> `boundscheck`, `sealed`
fn names_from_cython(text: &str) -> Option<Vec<String>> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let ["from", "cython", "import" | "cimport", names @ ..] = tokens.as_slice() else {
        return None;
    };

    let names = names
        .join(" ")
        .trim_matches(['(', ')'])
        .split(',')
        .filter_map(|item| match item.split_whitespace().collect::<Vec<_>>().as_slice() {
            [name] | [_, "as", name] => Some((*name).to_string()),
            _ => None,
        })
        .collect();
    Some(names)
}

/// Whether a definition header continues on the next physical line
///
/// Matches lines such as `cpdef int add(int a,` whose parenthesis is still
/// open. Calls with an `=` before the parenthesis (`cdef int x = f(`) are
/// variable declarations, not headers.
#[must_use]
pub fn opens_multiline_signature(text: &str) -> bool {
    if !starts_definition(text) {
        return false;
    }

    let Some(open) = text.find('(') else {
        return false;
    };
    if text[..open].contains('=') {
        return false;
    }

    paren_depth(definition_header(text)) > 0
}

/// Header of a definition whose body follows on the same line
///
/// `cpdef int f(self): return 1` gives `cpdef int f(self):`. Any other line,
/// including a header that ends the line, is returned whole.
#[must_use]
pub fn definition_header(text: &str) -> &str {
    if !starts_definition(text) {
        return text;
    }
    match header_colon(text) {
        Some(colon) if !text[colon + 1..].trim().is_empty() => &text[..=colon],
        _ => text,
    }
}

fn starts_definition(text: &str) -> bool {
    let mut tokens = text.split_whitespace();
    let first = tokens.next().unwrap_or_default();
    first == PLAIN_DEF_KEYWORD
        || NATIVE_DEF_KEYWORDS.contains(&first)
        || (first == "async" && tokens.next() == Some(PLAIN_DEF_KEYWORD))
}

/// Byte offset of the first `:` outside brackets and string literals
///
/// `None` when an assignment comes first (`cdef object f = lambda x: x`).
fn header_colon(text: &str) -> Option<usize> {
    let mut depth = 0_i64;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            (None, '=') if depth == 0 => return None,
            (None, ':') if depth == 0 => return Some(idx),
            _ => {}
        }
    }

    None
}

/// Net parenthesis depth at the end of `text`, ignoring string literals
fn paren_depth(text: &str) -> i64 {
    let mut depth = 0_i64;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            _ => {}
        }
    }

    depth
}

/// Kind of an open scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Class,
    Function,
}

/// A scope opened by a definition line at some indentation level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub kind: ScopeKind,
    pub level: usize,
}

/// Body flags that apply to one line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeState {
    pub in_class_body: bool,
    pub in_function_body: bool,
}

/// Open scopes, innermost last
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// Close every scope a line at `level` has dedented out of
    #[must_use]
    pub fn close_to(mut self, level: usize) -> Self {
        while self.scopes.last().is_some_and(|scope| scope.level >= level) {
            self.scopes.pop();
        }
        self
    }

    /// Open the scope a definition line introduces, if any
    #[must_use]
    pub fn open(mut self, kind: LineKind, level: usize) -> Self {
        let scope_kind = match kind {
            LineKind::ClassDef | LineKind::EnumDef => Some(ScopeKind::Class),
            LineKind::FunctionDef { .. } => Some(ScopeKind::Function),
            _ => None,
        };
        if let Some(kind) = scope_kind {
            self.scopes.push(Scope { kind, level });
        }
        self
    }

    /// Body flags for a line at `level`, derived from the innermost open scope
    ///
    /// Only lines exactly one level below a class header are its body; the
    /// contents of blocks nested in a class are not.
    #[must_use]
    pub fn state(&self, level: usize) -> ScopeState {
        let innermost = self.scopes.last();
        ScopeState {
            in_class_body: innermost
                .is_some_and(|scope| scope.kind == ScopeKind::Class && level == scope.level + 1),
            in_function_body: innermost.is_some_and(|scope| scope.kind == ScopeKind::Function),
        }
    }

    /// Number of open scopes
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

/// A line's classification together with the scope it sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub kind: LineKind,
    pub level: usize,
    pub state: ScopeState,
}

impl ClassifiedLine {
    /// Whether the line belongs in the stub
    ///
    /// Definitions always do; other lines only directly inside a class body.
    /// Directives and statement blocks never do.
    #[must_use]
    pub const fn is_emitted(&self) -> bool {
        match self.kind {
            LineKind::Directive | LineKind::BlockStatement => false,
            kind if kind.is_definition() => true,
            _ => self.state.in_class_body,
        }
    }
}

/// Advance the scope stack over one line
///
/// Returns the stack to carry to the next line and the state that applies to
/// this one.
#[must_use]
pub fn advance(stack: ScopeStack, kind: LineKind, level: usize) -> (ScopeStack, ScopeState) {
    let stack = stack.close_to(level);
    let state = stack.state(level);
    (stack.open(kind, level), state)
}

/// Classify every line of a file in order
///
/// # Errors
///
/// Returns [`StubError::UnterminatedSignature`] when a definition header
/// spans several physical lines.
pub fn scan(
    lines: &[SourceLine],
    indentation: Indentation,
) -> Result<Vec<ClassifiedLine>, StubError> {
    let imports = CythonImports::collect(lines);
    let (_, classified) = lines.iter().try_fold(
        (ScopeStack::default(), Vec::with_capacity(lines.len())),
        |(stack, mut classified), line| {
            if opens_multiline_signature(&line.text) {
                return Err(StubError::UnterminatedSignature {
                    line: line.number,
                    text: line.text.clone(),
                });
            }

            let kind = LineKind::of_in(&line.text, &imports);
            let level = indentation.level(line);
            let (stack, state) = advance(stack, kind, level);
            classified.push(ClassifiedLine { kind, level, state });
            Ok((stack, classified))
        },
    )?;

    Ok(classified)
}
