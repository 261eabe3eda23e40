use crate::entry::{EntryKind, PathEntry};
use crate::errors::ParseError;
use std::collections::HashSet;

const FENCE: &str = "```";
const INDENT_WIDTH: usize = 4;

const VERTICALS: [char; 2] = ['\u{2502}', '|']; // │ |
const BRANCHES: [&str; 5] = [
    "\u{251c}\u{2500}\u{2500}", // ├──
    "\u{2514}\u{2500}\u{2500}", // └──
    "|--",
    "`--",
    "+--",
];

const DIRECTORY_INDICATORS: [char; 2] = ['/', '\\'];

/// Parses every fenced block of `text` into a flat list of entries, sorted by path.
///
/// Indentation is read best-effort: a line with broken box-drawing still gets the
/// depth its prefix adds up to. Errors are reserved for lines that cannot be
/// turned into a path consistent with their depth.
pub fn parse(text: &str) -> Result<Vec<PathEntry>, ParseError> {
    let mut in_code_block = false;
    let mut stack: Vec<String> = Vec::new();
    // depth of the first entry in the block, so trees drawn without a root line still start at 0
    let mut base_depth: Option<usize> = None;
    let mut entries: Vec<PathEntry> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;

        if line.starts_with(FENCE) {
            in_code_block = !in_code_block;
            if in_code_block {
                stack.clear();
                base_depth = None;
            }
            continue;
        }
        if !in_code_block || line.trim().is_empty() {
            continue;
        }

        let Some(parsed) = parse_line(line) else {
            continue;
        };

        let base = *base_depth.get_or_insert(parsed.depth);
        let indent = parsed.depth.saturating_sub(base);

        // a line indented deeper than its parent chain hangs off the deepest known ancestor
        stack.truncate(indent.min(stack.len()));

        // `src/lib.rs` on one line is shorthand for a nested chain
        let segments: Vec<&str> = parsed
            .name
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect();
        let Some((last, intermediate)) = segments.split_last() else {
            continue;
        };

        for segment in intermediate {
            stack.push(segment.to_string());
            entries.push(entry_at(
                &stack,
                line_number,
                EntryKind::Directory,
                None,
            )?);
        }

        stack.push(last.to_string());
        entries.push(entry_at(&stack, line_number, parsed.kind, parsed.content)?);
    }

    Ok(clean_entries(entries))
}

fn entry_at(
    stack: &[String],
    line: usize,
    kind: EntryKind,
    content: Option<String>,
) -> Result<PathEntry, ParseError> {
    let depth = stack.len() - 1;
    let path = stack.join("/");
    if path.split('/').count() - 1 != depth {
        return Err(ParseError::DepthMismatch { line, path, depth });
    }

    Ok(PathEntry {
        path,
        kind,
        name: stack[depth].clone(),
        depth,
        content,
    })
}

struct ParsedLine {
    name: String,
    kind: EntryKind,
    depth: usize,
    content: Option<String>,
}

fn parse_line(line: &str) -> Option<ParsedLine> {
    let (depth, rest) = split_prefix(line);
    let raw = rest.trim();
    if raw.is_empty() {
        return None;
    }

    let (raw, inline) = split_inline_content(raw);
    let kind = classify(raw);
    let name = match kind {
        EntryKind::Directory => raw.trim_end_matches(DIRECTORY_INDICATORS),
        EntryKind::File => raw,
    };
    if name.is_empty() {
        return None;
    }

    let content = match kind {
        EntryKind::Directory => None,
        EntryKind::File => inline.or_else(|| default_content(name).map(str::to_string)),
    };

    Some(ParsedLine {
        name: name.to_string(),
        kind,
        depth,
        content,
    })
}

/// Consumes the tree-drawing prefix of `line` and returns `(depth, remainder)`.
///
/// Each 4-column unit counts one level: a vertical connector with its padding,
/// four columns of blank indentation, or the branch glyph that introduces the name.
fn split_prefix(line: &str) -> (usize, &str) {
    let mut depth = 0;
    let mut rest = line;

    loop {
        let columns = leading_whitespace_columns(rest);
        depth += columns / INDENT_WIDTH;
        rest = rest.trim_start_matches([' ', '\t']);

        if let Some(branch) = BRANCHES.iter().find(|b| rest.starts_with(**b)) {
            depth += 1;
            rest = &rest[branch.len()..];
            // long dashes such as "├───" are still one branch
            rest = rest.trim_start_matches(['\u{2500}', '-']);
            return (depth, rest);
        }

        match rest.chars().next() {
            Some(c) if VERTICALS.contains(&c) => {
                depth += 1;
                rest = &rest[c.len_utf8()..];
                rest = skip_padding(rest, INDENT_WIDTH - 1);
            }
            _ => return (depth, rest),
        }
    }
}

fn leading_whitespace_columns(text: &str) -> usize {
    text.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { INDENT_WIDTH } else { 1 })
        .sum()
}

fn skip_padding(text: &str, max: usize) -> &str {
    let skipped: usize = text
        .chars()
        .take(max)
        .take_while(|c| *c == ' ' || *c == '\u{a0}')
        .map(char::len_utf8)
        .sum();
    &text[skipped..]
}

/// Splits `name [content]` into the name and its inline content.
fn split_inline_content(raw: &str) -> (&str, Option<String>) {
    if !raw.ends_with(']') {
        return (raw, None);
    }
    let Some(open) = raw.find('[') else {
        return (raw, None);
    };
    let inner = &raw[open + 1..raw.len() - 1];
    let name = raw[..open].trim_end();
    if inner.is_empty() || name.is_empty() {
        return (raw, None);
    }
    (name, Some(inner.to_string()))
}

/// A trailing separator always means a directory. Otherwise hidden names and
/// anything with an extension (`.php`, `.lock`, `.min`, ...) are files, and bare
/// names such as `src` or `Makefile` are directories.
fn classify(name: &str) -> EntryKind {
    if name.ends_with(DIRECTORY_INDICATORS) {
        EntryKind::Directory
    } else if name.starts_with('.') || extension(name).is_some() {
        EntryKind::File
    } else {
        EntryKind::Directory
    }
}

fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Boilerplate written into new files, keyed by extension.
pub fn default_content(name: &str) -> Option<&'static str> {
    let ext = extension(name)?.to_lowercase();
    let content = match ext.as_str() {
        "php" => "<?php\n\ndeclare(strict_types=1);\n",
        "js" => "'use strict';\n",
        "css" => "/* Stylesheet */\n",
        "html" => {
            "<!DOCTYPE html>\n<html>\n<head>\n\t<title>Page Title</title>\n</head>\n<body>\n\n</body>\n</html>\n"
        }
        "md" => "# Title\n\nContent here.\n",
        "json" => "{\n\t\n}\n",
        "yml" | "yaml" => "# Configuration\n",
        "txt" => "",
        _ => return None,
    };
    Some(content)
}

/// Drops empty, `.` and repeated paths, then orders parents before their descendants.
fn clean_entries(entries: Vec<PathEntry>) -> Vec<PathEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut cleaned: Vec<PathEntry> = entries
        .into_iter()
        .filter(|entry| !entry.path.is_empty() && entry.path != ".")
        .filter(|entry| seen.insert(entry.path.clone()))
        .collect();

    cleaned.sort_by(|a, b| a.path.as_bytes().cmp(b.path.as_bytes()));
    cleaned
}
