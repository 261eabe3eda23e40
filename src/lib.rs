//! Sketch a project layout as a text tree, create it on disk, and snapshot
//! existing directories back into the same text format.
//!
//! The text format itself lives in the `treetext` crate; this crate adds the
//! filesystem side: validation, building, scanning, templates and the CLI.
//!
//! ```no_run
//! use treeform::api::{create_structure, CreateOptions, StructureInput};
//!
//! let options = CreateOptions {
//!     target: "./my-project".into(),
//!     force: true,
//!     ..CreateOptions::default()
//! };
//! create_structure(&StructureInput::File("STRUCTURE.md".into()), &options).unwrap();
//! ```

pub mod api;
pub mod builder;
pub mod config;
pub mod errors;
pub mod preview;
pub mod prompt;
pub mod scanner;
pub mod source;
pub mod template;
pub mod utils;
pub mod validator;
pub mod vfs;

pub use api::TreeformError;
pub use treetext;
