use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    ArgMatches, Command,
};
use colored::Colorize;
use std::path::PathBuf;
use treeform::{
    api::{
        check_structure, choose_template, create_structure, generate_structure, list_templates,
        load_structure, save_snapshot, CreateOptions, CreateOutcome, GenerateOptions,
        StructureInput,
    },
    builder::BuildReport,
    config::Config,
    preview, prompt, template, TreeformError,
};

const DEFAULT_SOURCE: &str = ".";

// The CLI layer only parses inputs, prints results and forwards to library code.
fn main() -> miette::Result<()> {
    let matches = Command::new(crate_name!())
        .about(crate_description!())
        .author(crate_authors!())
        .version(crate_version!())
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("create")
                .about("Creates the files and directories described by a structure file")
                .arg(
                    Arg::new("structure")
                        .help("markdown file with the tree, or a template name with --template")
                        .required_unless_present("template"),
                )
                .arg(
                    Arg::new("target")
                        .short('t')
                        .long("target")
                        .help("directory the structure is created in")
                        .default_value("."),
                )
                .arg(
                    Arg::new("template")
                        .short('T')
                        .long("template")
                        .help("treat <structure> as a template name; pick one when omitted")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("source")
                        .short('s')
                        .long("source")
                        .help("template source: a directory or a git reference (gh:user/repo)"),
                )
                .arg(
                    Arg::new("var")
                        .long("var")
                        .value_name("KEY=VALUE")
                        .help("template variable, may be repeated")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("show what would be created without touching the disk")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("create the target directory when it does not exist")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("validate-only")
                        .long("validate-only")
                        .help("stop after validating the structure")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("interactive")
                        .short('i')
                        .long("interactive")
                        .help("prompt for missing variables and confirm before writing")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Writes the tree of an existing directory as markdown")
                .arg(
                    Arg::new("path")
                        .help("directory to scan")
                        .default_value("."),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("file written inside the scanned directory"),
                )
                .arg(
                    Arg::new("exclude")
                        .short('e')
                        .long("exclude")
                        .value_name("PATTERN")
                        .help("extra exclusion pattern, may be repeated")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("max-depth")
                        .short('d')
                        .long("max-depth")
                        .help("deepest level to descend into")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("preview")
                        .short('p')
                        .long("preview")
                        .help("show the tree and ask before saving")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("stdout")
                        .long("stdout")
                        .help("print the markdown instead of saving it")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Checks a structure file without creating anything")
                .arg(
                    Arg::new("structure")
                        .help("markdown file with the tree")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("templates")
                .about("Lists the templates of a source")
                .arg(
                    Arg::new("source")
                        .short('s')
                        .long("source")
                        .help("template source: a directory or a git reference (gh:user/repo)"),
                ),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    let config = Config::discover(".").map_err(TreeformError::from)?;

    match matches.subcommand() {
        Some(("create", args)) => handle_create(args, &config)?,
        Some(("generate", args)) => handle_generate(args, &config)?,
        Some(("validate", args)) => handle_validate(args)?,
        Some(("templates", args)) => handle_templates(args, &config)?,
        _ => unreachable!(),
    }

    Ok(())
}

fn init_logging(is_verbose: bool) {
    let default_filter = if is_verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn template_source(args: &ArgMatches, config: &Config) -> String {
    args.get_one::<String>("source")
        .cloned()
        .or_else(|| config.create.templates.clone())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string())
}

fn handle_create(args: &ArgMatches, config: &Config) -> Result<(), TreeformError> {
    let target = args.get_one::<String>("target").expect("target has a default");

    let options = CreateOptions {
        target: PathBuf::from(target),
        dry_run: args.get_flag("dry-run"),
        force: args.get_flag("force"),
        validate_only: args.get_flag("validate-only"),
        interactive: args.get_flag("interactive"),
        preview: args.get_flag("dry-run") || args.get_flag("interactive"),
    };

    let input = if args.get_flag("template") {
        let source = template_source(args, config);
        let name = match args.get_one::<String>("structure") {
            Some(name) => name.clone(),
            None => choose_template(&source)?,
        };
        let variables = template::parse_variables(
            args.get_many::<String>("var")
                .unwrap_or_default()
                .map(String::as_str),
        );

        StructureInput::Template {
            source,
            name,
            variables,
        }
    } else {
        let structure = args
            .get_one::<String>("structure")
            .expect("structure required without --template");
        StructureInput::File(PathBuf::from(structure))
    };

    match create_structure(&input, &options)? {
        CreateOutcome::Validated { entries } => println!(
            "{} structure is valid ({} entries)",
            "✓".green().bold(),
            entries.len()
        ),
        CreateOutcome::Declined { .. } => println!("{}", "Nothing was created".yellow()),
        CreateOutcome::Built { report, .. } => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &BuildReport) {
    let verb = if report.dry_run { "would create" } else { "create" };

    for directory in &report.created_directories {
        println!("{} {}/", verb.green(), directory);
    }
    for file in &report.created_files {
        println!("{} {}", verb.green(), file);
    }

    let summary = format!(
        "{} directories, {} files",
        report.created_directories.len(),
        report.created_files.len()
    );
    if report.dry_run {
        println!("{} {}", "Dry run:".bold().yellow(), summary);
    } else {
        println!("{} {}", "Done:".bold().green(), summary);
    }
}

fn handle_generate(args: &ArgMatches, config: &Config) -> Result<(), TreeformError> {
    let path = PathBuf::from(args.get_one::<String>("path").expect("path has a default"));

    let mut excludes = config.generate.exclude.clone();
    if let Some(extra) = args.get_many::<String>("exclude") {
        excludes.extend(extra.cloned());
    }

    let options = GenerateOptions {
        max_depth: args
            .get_one::<usize>("max-depth")
            .copied()
            .unwrap_or(config.generate.max_depth),
        excludes,
    };
    let output = args
        .get_one::<String>("output")
        .cloned()
        .unwrap_or_else(|| config.generate.output.clone());

    let snapshot = generate_structure(&path, &options)?;

    if args.get_flag("stdout") {
        print!("{}", snapshot.markdown);
        return Ok(());
    }

    if args.get_flag("preview") {
        print!("{}", preview::colored_tree(&snapshot.root));
        if !prompt::confirm(&format!("Save to {}?", output), true)? {
            println!("{}", "Nothing was saved".yellow());
            return Ok(());
        }
    }

    let written = save_snapshot(&path, &output, &snapshot)?;
    println!("{} {}", "Saved".bold().green(), written.display());
    println!(
        "{} directories, {} files",
        snapshot.directories, snapshot.files
    );

    Ok(())
}

fn handle_validate(args: &ArgMatches) -> Result<(), TreeformError> {
    let structure = args
        .get_one::<String>("structure")
        .expect("structure required");

    let text = load_structure(&StructureInput::File(PathBuf::from(structure)), false)?;
    let entries = check_structure(&text)?;

    println!(
        "{} {} is valid ({} entries)",
        "✓".green().bold(),
        structure,
        entries.len()
    );

    Ok(())
}

fn handle_templates(args: &ArgMatches, config: &Config) -> Result<(), TreeformError> {
    let source = template_source(args, config);
    let templates = list_templates(&source)?;

    if templates.is_empty() {
        println!("{} no templates found in {}", "!".yellow().bold(), source);
        return Ok(());
    }

    for (name, description) in templates {
        match description {
            Some(description) => println!("{}  {}", name.bold(), description.dimmed()),
            None => println!("{}", name.bold()),
        }
    }

    Ok(())
}
