//! Native to stub type mapping
//!
//! Cython signatures spell C types (`double`, `long long`, `char*`, ...).
//! Stubs need the Python type a caller actually sees. The table is a static
//! slice; lookups are case-insensitive and whitespace-normalized, and anything
//! absent from the table is assumed to already be a valid stub type (an
//! imported class, `object`, `list`, `np.ndarray[...]`).

/// Where a native type appears in a signature
///
/// `void` only has a stub meaning in return position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePosition {
    Argument,
    Return,
}

/// Native spellings and the stub type each one maps to
const TYPE_TABLE: &[(&str, &str)] = &[
    ("bint", "bool"),
    ("bool", "bool"),
    ("char", "int"),
    ("short", "int"),
    ("int", "int"),
    ("long", "int"),
    ("long long", "int"),
    ("signed char", "int"),
    ("signed short", "int"),
    ("signed int", "int"),
    ("signed long", "int"),
    ("signed long long", "int"),
    ("unsigned char", "int"),
    ("unsigned short", "int"),
    ("unsigned int", "int"),
    ("unsigned long", "int"),
    ("unsigned long long", "int"),
    ("unsigned", "int"),
    ("size_t", "int"),
    ("ssize_t", "int"),
    ("py_ssize_t", "int"),
    ("py_hash_t", "int"),
    ("float", "float"),
    ("double", "float"),
    ("long double", "float"),
    ("float complex", "complex"),
    ("double complex", "complex"),
    ("complex", "complex"),
    ("char*", "str"),
    ("const char*", "str"),
    ("std::string", "str"),
    ("str", "str"),
    ("unicode", "str"),
];

/// Normalize a native spelling for table lookup
///
/// Lowercases, collapses runs of whitespace and glues pointer stars to the
/// type (`char *` and `char*` are the same key).
#[must_use]
pub fn normalize_native(native: &str) -> String {
    let joined = native.split_whitespace().collect::<Vec<_>>().join(" ");
    joined.replace(" *", "*").to_lowercase()
}

/// Look up the stub spelling of a native type, if the table knows it
#[must_use]
pub fn lookup(native: &str, position: TypePosition) -> Option<&'static str> {
    let key = normalize_native(native);

    if key == "void" {
        return match position {
            TypePosition::Return => Some("None"),
            TypePosition::Argument => None,
        };
    }

    TYPE_TABLE
        .iter()
        .find(|(spelling, _)| *spelling == key)
        .map(|(_, stub)| *stub)
}

/// Map a native type to its stub spelling
///
/// Unknown spellings are returned unchanged (trimmed).
#[must_use]
pub fn map_type(native: &str, position: TypePosition) -> String {
    lookup(native, position).map_or_else(
        || {
            crate::debug!("type '{}' not in mapping table, passing through", native.trim());
            native.trim().to_string()
        },
        str::to_string,
    )
}

/// All native spellings the table knows, in table order
pub fn known_spellings() -> impl Iterator<Item = &'static str> {
    TYPE_TABLE.iter().map(|(spelling, _)| *spelling)
}
