// Integration tests drive the binary as a subprocess and the library directly.
use assert_cmd::Command;
use predicates::prelude::*;
use std::{fs, path::Path};
use tempfile::TempDir;
use treeform::api::{
    create_structure, generate_structure, CreateOptions, CreateOutcome, GenerateOptions,
    StructureInput,
};

const SKETCH: &str = "# Layout

```
my-lib/
├── src/
│   ├── Client.php
│   └── Http/
│       └── Request.php
├── tests/
│   └── ClientTest.php
├── composer.json
└── README.md
```
";

fn workspace_with(files: &[(&str, &str)]) -> TempDir {
    let tmp = tempfile::tempdir().unwrap();
    for (path, content) in files {
        let full = tmp.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    tmp
}

fn treeform() -> Command {
    let mut cmd = Command::cargo_bin("treeform").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn create_builds_the_sketch() {
    let tmp = workspace_with(&[("STRUCTURE.md", SKETCH)]);

    treeform()
        .current_dir(tmp.path())
        .args(["create", "STRUCTURE.md", "--target", "out", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("my-lib/src/Http/Request.php"));

    let root = tmp.path().join("out/my-lib");
    assert!(root.join("src/Http").is_dir());
    assert!(root.join("tests/ClientTest.php").is_file());
    assert_eq!(
        fs::read_to_string(root.join("src/Client.php")).unwrap(),
        "<?php\n\ndeclare(strict_types=1);\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("composer.json")).unwrap(),
        "{\n\t\n}\n"
    );
}

#[test]
fn create_requires_existing_target_without_force() {
    let tmp = workspace_with(&[("STRUCTURE.md", SKETCH)]);

    treeform()
        .current_dir(tmp.path())
        .args(["create", "STRUCTURE.md", "--target", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    assert!(!tmp.path().join("missing").exists());
}

#[test]
fn dry_run_touches_nothing() {
    let tmp = workspace_with(&[("STRUCTURE.md", SKETCH)]);

    treeform()
        .current_dir(tmp.path())
        .args(["create", "STRUCTURE.md", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would create my-lib/README.md"))
        .stdout(predicate::str::contains("Dry run: 4 directories, 5 files"));

    assert!(!tmp.path().join("my-lib").exists());
}

#[test]
fn create_twice_is_idempotent() {
    let tmp = workspace_with(&[("STRUCTURE.md", SKETCH)]);

    for _ in 0..2 {
        treeform()
            .current_dir(tmp.path())
            .args(["create", "STRUCTURE.md"])
            .assert()
            .success();
    }

    assert!(tmp.path().join("my-lib/README.md").is_file());
}

#[test]
fn inline_content_is_written() {
    let tmp = workspace_with(&[(
        "STRUCTURE.md",
        "```\napp/\n└── version.txt [1.0.0]\n```\n",
    )]);

    treeform()
        .current_dir(tmp.path())
        .args(["create", "STRUCTURE.md"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(tmp.path().join("app/version.txt")).unwrap(),
        "1.0.0"
    );
}

#[test]
fn validate_lists_every_problem() {
    let tmp = workspace_with(&[(
        "STRUCTURE.md",
        "```\napp/\n├── what?.txt\n└── CON\n```\n",
    )]);

    treeform()
        .current_dir(tmp.path())
        .args(["validate", "STRUCTURE.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid characters in path: app/what?.txt"))
        .stderr(predicate::str::contains("Reserved filename: app/CON"));

    treeform()
        .current_dir(tmp.path())
        .args(["create", "STRUCTURE.md"])
        .assert()
        .failure();
    assert!(!tmp.path().join("app").exists());
}

#[test]
fn validate_accepts_a_clean_sketch() {
    let tmp = workspace_with(&[("STRUCTURE.md", SKETCH)]);

    treeform()
        .current_dir(tmp.path())
        .args(["validate", "STRUCTURE.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid (9 entries)"));
}

#[test]
fn generate_prints_markdown_and_skips_excluded() {
    let tmp = workspace_with(&[
        ("project/src/main.rs", "fn main() {}"),
        ("project/node_modules/left-pad/index.js", ""),
        ("project/README.md", "# hi"),
    ]);

    treeform()
        .current_dir(tmp.path())
        .args(["generate", "project", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Project Structure\n\n```\nproject/\n"))
        .stdout(predicate::str::contains("├── src/\n│   └── main.rs\n└── README.md\n```"))
        .stdout(predicate::str::contains("Generated on: "))
        .stdout(predicate::str::contains("node_modules").not());
}

#[test]
fn generate_saves_inside_the_scanned_directory() {
    let tmp = workspace_with(&[
        ("project/lib/a.txt", ""),
        ("project/scratch/b.txt", ""),
    ]);

    treeform()
        .current_dir(tmp.path())
        .args(["generate", "project", "-o", "TREE.md", "-e", "scratch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 directories, 1 files"));

    let saved = fs::read_to_string(tmp.path().join("project/TREE.md")).unwrap();
    assert!(saved.contains("└── lib/\n    └── a.txt\n"));
    assert!(!saved.contains("scratch"));
}

#[test]
fn generate_reads_config_defaults() {
    let tmp = workspace_with(&[
        ("treeform.toml", "[generate]\nmax_depth = 0\n"),
        ("project/top.txt", ""),
        ("project/nested/inner.txt", ""),
    ]);

    treeform()
        .current_dir(tmp.path())
        .args(["generate", "project", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("top.txt"))
        .stdout(predicate::str::contains("inner.txt").not());
}

#[test]
fn templates_are_listed_and_expanded() {
    let tmp = workspace_with(&[
        (
            "layouts/templates.toml",
            "[service]\npath = \"service.md\"\ndescription = \"HTTP service\"\n",
        ),
        (
            "layouts/service.md",
            "```\n{{NAME}}/\n├── src/\n{{if DOCKER}}├── Dockerfile\n{{/if}}└── README.md\n```\n",
        ),
        ("layouts/templates/cli.md", "```\ncli/\n```\n"),
    ]);

    treeform()
        .current_dir(tmp.path())
        .args(["templates", "--source", "layouts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("service  HTTP service"))
        .stdout(predicate::str::contains("cli"));

    treeform()
        .current_dir(tmp.path())
        .args([
            "create", "service", "--template", "--source", "layouts", "--var", "NAME=billing",
            "--var", "DOCKER=0",
        ])
        .assert()
        .success();

    assert!(tmp.path().join("billing/src").is_dir());
    assert!(tmp.path().join("billing/README.md").is_file());
    assert!(!tmp.path().join("billing/Dockerfile").exists());
}

#[test]
fn unknown_template_fails() {
    let tmp = workspace_with(&[("layouts/templates/cli.md", "```\ncli/\n```\n")]);

    treeform()
        .current_dir(tmp.path())
        .args(["create", "web", "--template", "--source", "layouts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("web"));
}

fn relative_files(root: &Path) -> Vec<String> {
    let mut paths: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    paths.sort();
    paths
}

#[test]
fn render_of_scan_parses_back_to_the_same_tree() {
    let original = workspace_with(&[("STRUCTURE.md", SKETCH)]);
    treeform()
        .current_dir(original.path())
        .args(["create", "STRUCTURE.md", "--target", "built", "--force"])
        .assert()
        .success();

    let built = original.path().join("built");
    let snapshot = generate_structure(&built, &GenerateOptions::default()).unwrap();

    let reparsed = treetext::parse(&snapshot.markdown).unwrap();
    let mut reparsed_paths: Vec<String> = reparsed
        .iter()
        .filter_map(|entry| entry.path.strip_prefix("built/").map(str::to_string))
        .collect();
    reparsed_paths.sort();

    assert_eq!(reparsed_paths, relative_files(&built));

    let rebuilt = tempfile::tempdir().unwrap();
    let mut store = treeform::vfs::LocalFileStore::new(rebuilt.path());
    treeform::api::build_into(&reparsed, &mut store, false).unwrap();

    assert_eq!(
        relative_files(&rebuilt.path().join("built")),
        relative_files(&built)
    );
}

#[test]
fn create_structure_validates_then_builds() {
    let tmp = workspace_with(&[("STRUCTURE.md", "```\nsvc/\n└── src/main.rs\n```\n")]);
    let input = StructureInput::File(tmp.path().join("STRUCTURE.md"));

    let validated = create_structure(
        &input,
        &CreateOptions {
            target: tmp.path().join("out"),
            validate_only: true,
            ..CreateOptions::default()
        },
    )
    .unwrap();
    match validated {
        CreateOutcome::Validated { entries } => assert_eq!(entries.len(), 3),
        other => panic!("expected validation only, got {:?}", other),
    }
    assert!(!tmp.path().join("out").exists());

    let built = create_structure(
        &input,
        &CreateOptions {
            target: tmp.path().join("out"),
            force: true,
            ..CreateOptions::default()
        },
    )
    .unwrap();
    match built {
        CreateOutcome::Built { report, .. } => {
            assert_eq!(report.created_directories, vec!["svc", "svc/src"]);
            assert_eq!(report.created_files, vec!["svc/src/main.rs"]);
        }
        other => panic!("expected a build, got {:?}", other),
    }
    assert!(tmp.path().join("out/svc/src/main.rs").is_file());
}
