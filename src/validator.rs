use std::collections::HashSet;
use treetext::PathEntry;

const INVALID_CHARACTERS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Parses `text` and checks the result. An empty list means the sketch is valid.
pub fn validate_text(text: &str) -> Vec<String> {
    match treetext::parse(text) {
        Ok(entries) => validate_entries(&entries),
        Err(error) => vec![format!("Parse error: {}", error)],
    }
}

/// Checks entries for names that cannot be created portably or safely.
pub fn validate_entries(entries: &[PathEntry]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for entry in entries {
        let path = entry.path.as_str();
        if path.is_empty() {
            errors.push("Empty path found in structure".to_string());
            continue;
        }

        if !seen.insert(path) {
            errors.push(format!("Duplicate path: {}", path));
        }

        if path.contains(INVALID_CHARACTERS) {
            errors.push(format!("Invalid characters in path: {}", path));
        }

        let basename = path.rsplit('/').next().unwrap_or(path);
        if RESERVED_NAMES.contains(&basename.to_uppercase().as_str()) {
            errors.push(format!("Reserved filename: {}", path));
        }

        if path.split('/').any(|segment| segment == "..") {
            errors.push(format!("Path traversal segment in path: {}", path));
        }
    }

    errors
}
