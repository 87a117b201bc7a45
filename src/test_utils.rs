//! Shared test utilities for cythonbuilder tests
//!
//! Fixture `.pyx` sources, small filesystem helpers and assertions used by
//! unit tests across modules.

#[cfg(test)]
pub mod fixtures {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// One native function
    pub const SIMPLE_PYX: &str = "cpdef int add(int a, int b):\n    return a + b\n";

    /// A class with a typed attribute and one method of each definition kind
    pub const CLASS_PYX: &str = "\
cdef class MyClass(object):
    test:str
    cdef test_def(self, int num) -> int:
        return num * num

    cpdef test_cdef(self, long num) -> float:
        return num * num

    def test_cpdef(self, long num) -> float:
        return num * num
";

    /// Native enum plus a main guard that must not reach the stub
    pub const ENUM_PYX: &str = "\
cpdef enum PluginType:
    RED='RED'
    BLUE='BLUE'

if __name__ == \"__main__\":
    print(\"ok\")
";

    /// Write `content` to `dir/name`, creating parent directories
    pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    /// Create a temporary project with `.pyx` files at the given relative paths
    pub fn create_test_project(sources: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for source in sources {
            write_file(temp_dir.path(), source, SIMPLE_PYX);
        }
        temp_dir
    }
}

#[cfg(test)]
pub mod assertions {
    /// Assert that an error message contains a specific substring
    pub fn assert_error_contains(error_msg: &str, expected_text: &str) {
        assert!(
            error_msg.to_lowercase().contains(&expected_text.to_lowercase()),
            "Error message '{error_msg}' does not contain '{expected_text}'"
        );
    }

    /// Assert that a string matches a regex pattern
    pub fn assert_matches_pattern(text: &str, pattern: &str) {
        let re = regex::Regex::new(pattern).expect("Invalid regex pattern");
        assert!(
            re.is_match(text),
            "Text '{text}' does not match pattern '{pattern}'"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_project_writes_sources() {
        let temp = fixtures::create_test_project(&["a.pyx", "pkg/b.pyx"]);
        assert!(temp.path().join("a.pyx").exists());
        assert!(temp.path().join("pkg/b.pyx").exists());
    }

    #[test]
    fn fixtures_are_indented_in_fours() {
        for fixture in [fixtures::SIMPLE_PYX, fixtures::CLASS_PYX, fixtures::ENUM_PYX] {
            for line in fixture.lines() {
                assertions::assert_matches_pattern(line, r"^(    )*\S|^$");
            }
        }
    }

    #[test]
    fn error_assertion_ignores_case() {
        assertions::assert_error_contains("Inconsistent Indentation", "inconsistent");
    }
}
