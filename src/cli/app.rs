//! Main CLI application

use crate::config::{
    load_env_file, manifest_options, parse_manifest_auto, parse_manifest_file, validate_manifest,
    Manifest, MANIFEST_FILE_NAMES,
};
use crate::error::{ConfigError, TaskrigError};
use crate::runner::{
    define_manifest_pipelines, define_standard_pipelines, discover_yaml, Context, DisabledTasks,
    Flags, OptionDecl, OptionRegistry, TaskRegistry,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use colored::Colorize;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Verbosity {
    /// Log filter used when `RUST_LOG` is not set
    pub fn default_filter(self) -> &'static str {
        match self {
            Verbosity::Silent => "off",
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// CLI application
pub struct App {
    /// The clap command
    command: Command,
    /// Parsed manifest
    manifest: Manifest,
    /// Manifest file path
    manifest_path: PathBuf,
    /// Standard options plus the manifest's own
    options: OptionRegistry,
}

impl App {
    /// Create a new app from the manifest in the current directory
    pub fn new() -> Result<Self, TaskrigError> {
        let (manifest, manifest_path) = parse_manifest_auto()?;
        Self::from_manifest(manifest, manifest_path)
    }

    /// Create app with a specific manifest file
    pub fn with_manifest_file(path: PathBuf) -> Result<Self, TaskrigError> {
        let manifest = parse_manifest_file(&path)?;
        Self::from_manifest(manifest, path)
    }

    /// Create app from an already parsed manifest
    pub fn from_manifest(manifest: Manifest, manifest_path: PathBuf) -> Result<Self, TaskrigError> {
        validate_manifest(&manifest)?;
        let options = manifest_options(&manifest)?;
        let command = build_command(&manifest, &options);

        Ok(App {
            command,
            manifest,
            manifest_path,
            options,
        })
    }

    /// Build the task registry described by the manifest
    ///
    /// Manifest tasks are discovered first, then the standard pipelines and
    /// finally the manifest pipelines are registered on top.
    pub fn build_registry(&self) -> Result<TaskRegistry, TaskrigError> {
        let disabled = DisabledTasks::new(self.manifest.disabled_tasks.clone(), self.manifest_file_name());
        let mut registry = TaskRegistry::new(disabled);

        discover_yaml(&self.manifest.tasks, &mut registry)?;
        define_standard_pipelines(&mut registry);
        define_manifest_pipelines(&self.manifest.pipelines, &mut registry);

        for name in registry.unmatched_disabled() {
            tracing::warn!(task = %name, "Disabled task '{}' is not a registered task", name);
        }

        Ok(registry)
    }

    /// Run the application with the process arguments
    pub fn run(self) -> Result<(), TaskrigError> {
        self.run_from(std::env::args_os())
    }

    /// Run the application with the given arguments
    pub fn run_from<I, T>(mut self, args: I) -> Result<(), TaskrigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.clone().get_matches_from(args);

        // Handle global flags first
        let verbosity = get_verbosity(&matches);
        init_logging(verbosity);

        if let Some(shell) = matches.get_one::<Shell>("completions").copied() {
            clap_complete::generate(shell, &mut self.command, "taskrig", &mut io::stdout());
            return Ok(());
        }

        if load_env_file(&self.manifest_path)? {
            tracing::debug!("Loaded .env next to {}", self.manifest_path.display());
        }

        let registry = self.build_registry()?;

        if matches.get_flag("list") {
            print_task_list(&registry);
            return Ok(());
        }

        let task_name = match matches.get_one::<String>("task") {
            Some(name) => name.clone(),
            None => {
                // No task specified, show help
                self.command.print_help()?;
                println!();
                return Ok(());
            }
        };

        let flags = parse_flags(&self.options, &matches);
        let mut ctx = Context::new(registry, flags).with_working_dir(self.working_dir());
        if let Some(interpreter) = &self.manifest.interpreter {
            ctx = ctx.with_interpreter(interpreter.clone());
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(ctx.run_task(&task_name))?;

        Ok(())
    }

    /// Directory command tasks run in
    fn working_dir(&self) -> PathBuf {
        self.manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn manifest_file_name(&self) -> String {
        self.manifest_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.manifest_path.display().to_string())
    }
}

/// Build the clap command from the manifest and the declared options
fn build_command(manifest: &Manifest, options: &OptionRegistry) -> Command {
    let about = match &manifest.name {
        Some(name) => format!("Build tasks for {}", name),
        None => "A composable build-task runner".to_string(),
    };

    let mut cmd = Command::new("taskrig")
        .version(env!("CARGO_PKG_VERSION"))
        .about(about)
        .arg(
            Arg::new("task")
                .value_name("TASK")
                .help("Task or pipeline to run"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to taskrig.yml manifest"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List registered tasks and pipelines")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .help("Print a shell completion script")
                .value_parser(clap::value_parser!(Shell)),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        );

    for decl in options.iter() {
        cmd = cmd.arg(option_arg(decl));
    }

    cmd
}

/// Turn an option declaration into a command line argument
///
/// Single character aliases become short flags, longer ones long aliases.
fn option_arg(decl: &OptionDecl) -> Arg {
    let mut arg = Arg::new(decl.name.clone()).long(decl.name.clone()).help(
        decl.usage
            .clone()
            .unwrap_or_else(|| format!("Option: {}", decl.name)),
    );

    let mut shorts = decl.aliases.iter().filter_map(|a| single_char(a));
    if let Some(c) = shorts.next() {
        arg = arg.short(c);
    }
    for c in shorts {
        arg = arg.short_alias(c);
    }
    for alias in decl.aliases.iter().filter(|a| single_char(a).is_none()) {
        arg = arg.visible_alias(alias.clone());
    }

    if decl.takes_value {
        arg.value_name(decl.name.to_uppercase()).action(ArgAction::Set)
    } else {
        arg.action(ArgAction::SetTrue)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Collect runtime flag values from matches
fn parse_flags(options: &OptionRegistry, matches: &ArgMatches) -> Flags {
    let mut flags = Flags::new(options.clone());

    for decl in options.iter() {
        if decl.takes_value {
            if let Some(value) = matches.get_one::<String>(&decl.name) {
                flags.set(&decl.name, value.clone());
            }
        } else if matches.get_flag(&decl.name) {
            flags.set(&decl.name, true);
        }
    }

    flags
}

/// Install the stderr log subscriber
fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_filter()));

    // A subscriber may already be installed when the app runs more than once
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .try_init();
}

/// Print registered names, marking disabled ones
fn print_task_list(registry: &TaskRegistry) {
    for name in registry.names() {
        if registry.is_disabled(name) {
            println!("{} {}", name, "(disabled)".yellow());
        } else {
            println!("{}", name.cyan());
        }
    }
}

/// Run the CLI application with provided arguments
pub fn run() -> Result<(), TaskrigError> {
    // Check if --file flag is provided first
    let args: Vec<String> = std::env::args().collect();
    let file_path = extract_file_arg(&args);

    let app = match file_path {
        Some(path) => App::with_manifest_file(path)?,
        None => match App::new() {
            Ok(app) => app,
            // Help, version and completions only need the standard options
            Err(TaskrigError::Config(ConfigError::NotFound(_))) if manifest_optional(&args) => {
                App::from_manifest(Manifest::default(), PathBuf::from(MANIFEST_FILE_NAMES[0]))?
            }
            Err(e) => return Err(e),
        },
    };

    app.run_from(args)
}

/// Whether the arguments only ask for output that needs no manifest
fn manifest_optional(args: &[String]) -> bool {
    args.iter().skip(1).any(|a| {
        matches!(a.as_str(), "-h" | "--help" | "-V" | "--version" | "--completions")
            || a.starts_with("--completions=")
    })
}

/// Extract --file argument before clap parsing
fn extract_file_arg(args: &[String]) -> Option<PathBuf> {
    for i in 0..args.len() {
        if let Some(path) = args[i].strip_prefix("--file=") {
            return Some(PathBuf::from(path));
        }
        if (args[i] == "--file" || args[i] == "-f") && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
    }
    None
}
