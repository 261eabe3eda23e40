use crate::node::StructureNode;

const BRANCH: &str = "\u{251c}\u{2500}\u{2500} "; // ├──
const LAST_BRANCH: &str = "\u{2514}\u{2500}\u{2500} "; // └──
const CONTINUATION: &str = "\u{2502}   "; // │
const BLANK: &str = "    ";

pub const DOCUMENT_TITLE: &str = "# Project Structure";

/// One rendered row of a tree: box-drawing prefix plus the node it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine<'a> {
    pub prefix: String,
    pub name: &'a str,
    pub is_directory: bool,
}

impl std::fmt::Display for TreeLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = if self.is_directory { "/" } else { "" };
        write!(f, "{}{}{}", self.prefix, self.name, suffix)
    }
}

/// Lays out `root` and its descendants in display order.
///
/// The root has no prefix. Every other node gets one continuation unit per
/// ancestor below the root (`│   ` if that ancestor has later siblings, blank
/// if it was the last child) followed by its own branch glyph.
pub fn tree_lines(root: &StructureNode) -> Vec<TreeLine<'_>> {
    let mut lines = vec![TreeLine {
        prefix: String::new(),
        name: root.name(),
        is_directory: root.is_directory(),
    }];

    // (node, continuation inherited from ancestors, is last among siblings)
    let mut pending: Vec<(&StructureNode, String, bool)> = Vec::new();
    push_children(&mut pending, root, String::new());

    while let Some((node, continuation, is_last)) = pending.pop() {
        let branch = if is_last { LAST_BRANCH } else { BRANCH };
        lines.push(TreeLine {
            prefix: format!("{}{}", continuation, branch),
            name: node.name(),
            is_directory: node.is_directory(),
        });

        let unit = if is_last { BLANK } else { CONTINUATION };
        push_children(&mut pending, node, format!("{}{}", continuation, unit));
    }

    lines
}

/// Queues the children of `node` so they pop off `pending` in display order.
fn push_children<'a>(
    pending: &mut Vec<(&'a StructureNode, String, bool)>,
    node: &'a StructureNode,
    continuation: String,
) {
    let StructureNode::Directory(dir) = node else {
        return;
    };
    let children = dir.children();
    let last = children.len().saturating_sub(1);
    for (index, child) in children.into_iter().enumerate().rev() {
        pending.push((child, continuation.clone(), index == last));
    }
}

/// Renders the tree as plain text, one `\n`-terminated line per node.
pub fn render_tree(root: &StructureNode) -> String {
    tree_lines(root)
        .iter()
        .map(|line| format!("{}\n", line))
        .collect()
}

/// Wraps the rendered tree in a titled markdown document with a generation footer.
pub fn render_document(root: &StructureNode, generated_on: &str) -> String {
    format!(
        "{}\n\n```\n{}```\n\nGenerated on: {}\n",
        DOCUMENT_TITLE,
        render_tree(root),
        generated_on
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DirectoryNode;

    fn tree(paths: &[&str]) -> StructureNode {
        let mut root = DirectoryNode::new("project", "");
        for path in paths {
            match path.strip_suffix('/') {
                Some(dir) => root.insert_path(dir, false, None),
                None => root.insert_path(path, true, None),
            };
        }
        StructureNode::Directory(root)
    }

    #[test]
    fn test_render_worked_example() {
        let root = tree(&["src/App.php", "README.md"]);

        assert_eq!(
            render_tree(&root),
            "project/\n├── src/\n│   └── App.php\n└── README.md\n"
        );
    }

    #[test]
    fn test_last_child_directory_has_blank_continuation() {
        let root = tree(&["alpha/one.txt", "beta/inner/deep.txt", "beta/two.txt"]);

        let expected = "\
project/
├── alpha/
│   └── one.txt
└── beta/
    ├── inner/
    │   └── deep.txt
    └── two.txt
";
        assert_eq!(render_tree(&root), expected);
    }

    #[test]
    fn test_continuation_tracked_per_ancestor() {
        let root = tree(&["a/b/c/d.txt", "a/b/e.txt", "a/f.txt", "g.txt"]);

        let expected = "\
project/
├── a/
│   ├── b/
│   │   ├── c/
│   │   │   └── d.txt
│   │   └── e.txt
│   └── f.txt
└── g.txt
";
        assert_eq!(render_tree(&root), expected);
    }

    #[test]
    fn test_directories_before_files_case_insensitive() {
        let root = tree(&["b.txt", "A.txt", "zdir/", "Cdir/"]);
        let names: Vec<String> = tree_lines(&root).iter().map(|l| l.to_string()).collect();

        assert_eq!(
            names,
            vec!["project/", "├── Cdir/", "├── zdir/", "├── A.txt", "└── b.txt"]
        );
    }

    #[test]
    fn test_single_file_root() {
        let root = StructureNode::File(crate::node::FileNode::new("notes.txt", "notes.txt"));
        assert_eq!(render_tree(&root), "notes.txt\n");
    }

    #[test]
    fn test_render_document_wraps_tree() {
        let root = tree(&["src/"]);
        let doc = render_document(&root, "2024-01-01 00:00:00");

        assert_eq!(
            doc,
            "# Project Structure\n\n```\nproject/\n└── src/\n```\n\nGenerated on: 2024-01-01 00:00:00\n"
        );
    }
}
