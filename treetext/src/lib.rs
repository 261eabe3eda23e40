//! Text protocol for sketching directory layouts as box-drawing trees.
//!
//! [`parse`] turns a fenced tree sketch into a flat, ordered list of
//! [`PathEntry`] values; [`render_tree`] and [`render_document`] turn a
//! [`StructureNode`] tree back into the same text.
//!
//! ```
//! let text = "```\nproject/\n├── src/\n│   └── App.php\n└── README.md\n```\n";
//! let entries = treetext::parse(text).unwrap();
//! assert_eq!(entries.len(), 4);
//!
//! let root = treetext::DirectoryNode::from_entries("workspace", &entries);
//! let root = treetext::StructureNode::Directory(root);
//! assert!(treetext::render_tree(&root).starts_with("workspace/\n└── project/\n"));
//! ```
pub mod entry;
pub mod errors;
pub mod node;
pub mod parser;
pub mod render;

pub use entry::{EntryKind, PathEntry};
pub use errors::ParseError;
pub use node::{DirectoryNode, FileNode, StructureNode};
pub use parser::{default_content, parse};
pub use render::{render_document, render_tree, tree_lines, TreeLine};
