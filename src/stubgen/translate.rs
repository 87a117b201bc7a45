//! Stub translation of classified lines
//!
//! Definition headers are rewritten into their stub form: `cimport` becomes
//! `import`, `cdef class` becomes `class`, and native function headers lose
//! their C types in favour of annotations. Every function header is followed
//! by a synthetic `...` body one indentation step deeper.

use super::StubError;
use super::classify::{LineKind, NATIVE_DEF_KEYWORDS, PLAIN_DEF_KEYWORD, definition_header, scan};
use super::indent::{Indentation, SourceLine, collapse_whitespace};
use super::types::{TypePosition, map_type};

/// Words allowed between `cdef`/`cpdef` and the return type
const FUNCTION_QUALIFIERS: &[&str] = &["inline", "public", "api", "readonly", "static"];

/// Header emitted once when the stub contains native enums
pub const ENUM_IMPORT: &str = "from enum import Enum";

/// Body placed under every function header
pub const ELLIPSIS: &str = "...";

/// Translate classified source lines into stub lines
///
/// # Errors
///
/// Propagates classification errors (multi-line signatures).
pub fn translate(lines: &[SourceLine], indentation: Indentation) -> Result<Vec<String>, StubError> {
    let classified = scan(lines, indentation)?;
    let mut stub = Vec::with_capacity(lines.len());
    let mut has_enum = false;

    for (line, info) in lines.iter().zip(&classified) {
        if !info.is_emitted() {
            continue;
        }

        let indent = " ".repeat(line.spaces);
        match info.kind {
            LineKind::Import => stub.push(format!("{indent}{}", translate_import(&line.text))),
            LineKind::ClassDef => stub.push(format!("{indent}{}", translate_class(&line.text))),
            LineKind::EnumDef => {
                has_enum = true;
                stub.push(format!("{indent}{}", translate_enum(&line.text)));
            }
            LineKind::FunctionDef { native } => {
                let header = definition_header(&line.text);
                stub.push(format!("{indent}{}", translate_function(header, native)));
                let body_indent = " ".repeat(line.spaces + indentation.step());
                stub.push(format!("{body_indent}{ELLIPSIS}"));
            }
            LineKind::PropertyOrDecorator | LineKind::PlainStatement => {
                stub.push(format!("{indent}{}", collapse_whitespace(&line.text)));
            }
            LineKind::Directive | LineKind::BlockStatement => {}
        }
    }

    if has_enum {
        let mut with_header = vec![ENUM_IMPORT.to_string(), String::new()];
        with_header.append(&mut stub);
        return Ok(with_header);
    }

    Ok(stub)
}

/// `cimport x` -> `import x`, `from a cimport b` -> `from a import b`
#[must_use]
pub fn translate_import(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let from_import = tokens.first() == Some(&"from");

    tokens
        .iter()
        .enumerate()
        .map(|(idx, &token)| match (idx, token) {
            (0, "cimport") => "import",
            (2, "cimport") if from_import => "import",
            _ => token,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop native qualifiers in front of `class` and any extension type clause
///
/// `cdef public class Node [object NodeObj, type NodeType]:` -> `class Node:`
#[must_use]
pub fn translate_class(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let tokens: Vec<&str> = collapsed.split(' ').collect();
    let header = tokens
        .iter()
        .position(|&token| token == "class")
        .and_then(|idx| tokens.get(idx..))
        .map_or_else(|| collapsed.clone(), |rest| rest.join(" "));

    let signature = header.trim_end_matches(':').trim_end();
    if signature.ends_with(']')
        && let Some(open) = signature.rfind('[')
    {
        return format!("{}:", signature[..open].trim_end());
    }

    header
}

/// `cpdef enum Color:` -> `class Color(Enum):`
#[must_use]
pub fn translate_enum(text: &str) -> String {
    let name = text
        .split_whitespace()
        .nth(2)
        .unwrap_or_default()
        .trim_end_matches(':');
    format!("class {name}(Enum):")
}

/// Rewrite a function header into its stub signature (without body)
///
/// Plain `def` headers already carry Python annotations and only get their
/// whitespace normalized. Native headers are parsed as
/// `kw [qualifiers] [return type] name ( args ) [suffix] [-> type] :`.
#[must_use]
pub fn translate_function(text: &str, native: bool) -> String {
    let collapsed = collapse_whitespace(text);
    if !native {
        return collapsed;
    }

    let signature = collapsed.trim_end_matches(':').trim_end();
    let Some((open, close)) = outer_parens(signature) else {
        crate::debug!("no argument list in '{collapsed}', passing through");
        return replace_native_keyword(&collapsed);
    };

    let head = &signature[..open];
    let args = &signature[open + 1..close];
    let tail = signature[close + 1..].trim();

    let mut head_tokens: Vec<&str> = head
        .split_whitespace()
        .filter(|token| !NATIVE_DEF_KEYWORDS.contains(token))
        .skip_while(|token| FUNCTION_QUALIFIERS.contains(token))
        .collect();
    let Some(raw_name) = head_tokens.pop() else {
        crate::debug!("no function name in '{collapsed}', passing through");
        return replace_native_keyword(&collapsed);
    };

    let name = raw_name.trim_start_matches('*');
    let mut native_return = head_tokens.join(" ");
    native_return.push_str(&"*".repeat(raw_name.len() - name.len()));

    let explicit_return = tail
        .split_once("->")
        .map(|(_, ret)| ret.trim())
        .filter(|ret| !ret.is_empty());
    let return_type = explicit_return
        .or_else(|| Some(native_return.as_str()).filter(|ret| !ret.is_empty()))
        .map(|ret| map_type(ret, TypePosition::Return));

    let arguments = split_top_level(args, ',')
        .into_iter()
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .map(translate_argument)
        .collect::<Vec<_>>()
        .join(", ");

    match return_type {
        Some(ret) => format!("{PLAIN_DEF_KEYWORD} {name}({arguments}) -> {ret}:"),
        None => format!("{PLAIN_DEF_KEYWORD} {name}({arguments}):"),
    }
}

/// Rewrite one native argument into `name:type[=default]`
///
/// Arguments without a native type (`self`, `*args`, already annotated
/// `x: int`) are returned unchanged.
#[must_use]
pub fn translate_argument(arg: &str) -> String {
    let arg = arg.trim();
    let (declaration, default) = match find_assignment(arg) {
        Some(idx) => (arg[..idx].trim(), Some(arg[idx + 1..].trim())),
        None => (arg, None),
    };

    if is_annotated(declaration) {
        return arg.to_string();
    }

    let mut tokens: Vec<&str> = declaration.split_whitespace().collect();
    if tokens.len() > 2 && matches!(tokens.as_slice(), [.., "not" | "or", "None"]) {
        tokens.truncate(tokens.len() - 2);
    }

    let Some(raw_name) = tokens.pop() else {
        return arg.to_string();
    };
    if tokens.is_empty() {
        return match default {
            Some(default) => format!("{raw_name}={default}"),
            None => raw_name.to_string(),
        };
    }

    let name = raw_name.trim_start_matches('*');
    let mut native_type = tokens.join(" ");
    native_type.push_str(&"*".repeat(raw_name.len() - name.len()));
    let stub_type = map_type(&native_type, TypePosition::Argument);

    match default {
        Some(default) => format!("{name}:{stub_type}={default}"),
        None => format!("{name}:{stub_type}"),
    }
}

fn replace_native_keyword(text: &str) -> String {
    text.split(' ')
        .map(|token| {
            if NATIVE_DEF_KEYWORDS.contains(&token) {
                PLAIN_DEF_KEYWORD
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Byte offsets of the first `(` and its matching `)`
fn outer_parens(text: &str) -> Option<(usize, usize)> {
    let open = text.find('(')?;
    let mut depth = 0_usize;

    for (idx, ch) in scan_code(text).filter(|&(idx, _)| idx >= open) {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (ch == ')').then_some((open, idx));
                }
            }
            _ => {}
        }
    }

    None
}

/// Split on `sep` where it is not nested in brackets or a string literal
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0_usize;

    for (idx, ch) in scan_code(text) {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
}

/// Offsets of `target` outside brackets and string literals
fn top_level(text: &str, target: char) -> impl Iterator<Item = usize> + '_ {
    let mut depth = 0_usize;

    scan_code(text).filter_map(move |(idx, ch)| {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            c if c == target && depth == 0 => return Some(idx),
            _ => {}
        }
        None
    })
}

fn byte_around(text: &str, idx: usize) -> (Option<u8>, Option<u8>) {
    let bytes = text.as_bytes();
    let prev = idx.checked_sub(1).and_then(|i| bytes.get(i)).copied();
    (prev, bytes.get(idx + 1).copied())
}

/// Offset of a default-value `=`, skipping `==`, `<=`, `>=` and `!=`
fn find_assignment(arg: &str) -> Option<usize> {
    top_level(arg, '=').find(|&idx| {
        let (prev, next) = byte_around(arg, idx);
        !matches!(prev, Some(b'=' | b'<' | b'>' | b'!')) && next != Some(b'=')
    })
}

/// Whether a declaration already carries a `name: type` annotation
///
/// C++ scope operators (`std::string`) do not count.
fn is_annotated(declaration: &str) -> bool {
    top_level(declaration, ':').any(|idx| {
        let (prev, next) = byte_around(declaration, idx);
        prev != Some(b':') && next != Some(b':')
    })
}

/// Characters of `text` that are code, i.e. outside string literals
fn scan_code(text: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    text.char_indices().filter(move |&(_, ch)| {
        if escaped {
            escaped = false;
            return false;
        }
        match (quote, ch) {
            (Some(_), '\\') => {
                escaped = true;
                false
            }
            (Some(open), c) if c == open => {
                quote = None;
                false
            }
            (Some(_), _) => false,
            (None, '\'' | '"') => {
                quote = Some(ch);
                false
            }
            (None, _) => true,
        }
    })
}
