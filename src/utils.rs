use std::path::{Component, PathBuf};

/// Lexically resolves `.` and `..` so registry paths stay inside their source.
pub fn normalize_path(source: &str) -> PathBuf {
    let input = PathBuf::from(source);

    let mut new_path = PathBuf::new();

    for component in input.components() {
        match component {
            // Skip the current-dir marker "."
            Component::CurDir => {}

            // For "..", pop the last component if possible
            Component::ParentDir => {
                new_path.pop();
            }

            // Absolute prefixes would escape the source directory
            Component::RootDir | Component::Prefix(_) => {}

            // For normal components, push them
            other => new_path.push(other.as_os_str()),
        }
    }

    new_path
}

/// Local time in the format used for the `Generated on:` footer.
pub fn generated_on() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./a/./b"), PathBuf::from("a/b"));
        assert_eq!(normalize_path("a/../../b"), PathBuf::from("b"));
        assert_eq!(normalize_path("/etc/passwd"), PathBuf::from("etc/passwd"));
    }

    #[test]
    fn test_generated_on_format() {
        let stamp = generated_on();
        assert_eq!(stamp.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
