use colored::Colorize;
use treetext::{tree_lines, DirectoryNode, PathEntry, StructureNode, TreeLine};

/// Colours one rendered row: yellow drawing, blue directories, green files.
fn paint(line: &TreeLine<'_>) -> String {
    let name = if line.is_directory {
        format!("{}/", line.name).blue()
    } else {
        line.name.green()
    };
    format!("{}{}", line.prefix.yellow(), name)
}

/// Coloured rendering of `root`, one row per line.
pub fn colored_tree(root: &StructureNode) -> String {
    tree_lines(root)
        .iter()
        .map(|line| format!("{}\n", paint(line)))
        .collect()
}

/// Prints what a build of `entries` into `destination` would produce.
pub fn preview_entries(entries: &[PathEntry], destination: &str) {
    let root = StructureNode::Directory(DirectoryNode::from_entries(destination, entries));

    println!(
        "Legend: {} = (directory), {} = (file)",
        "blue".blue(),
        "green".green()
    );

    let fancy_prompt = format!(
        "{} {}\n",
        "┌─".bold().bright_blue(),
        "Preview".bold().bright_blue(),
    );

    println!("{}", fancy_prompt);

    print!("{}", colored_tree(&root));

    println!("\n{}", "└─".bold().bright_blue());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colored_tree_keeps_layout() {
        colored::control::set_override(false);
        let entries = treetext::parse("```\napp/\n├── src/\n└── main.rs\n```").unwrap();
        let root = StructureNode::Directory(DirectoryNode::from_entries(".", &entries));

        assert_eq!(
            colored_tree(&root),
            "./\n└── app/\n    ├── src/\n    └── main.rs\n"
        );
    }
}
