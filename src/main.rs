use buildpage::{config, embed, html, output, title};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Template flags shared by `build` and `deps`.
#[derive(clap::Args, Clone)]
struct TemplateArgs {
    /// HTML template page to build on top of
    #[arg(short = 't', long = "template")]
    template: PathBuf,

    /// File to write the result to (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Load VALUE wherever NAME is embedded (repeatable)
    #[arg(
        short = 'D',
        long = "define",
        num_args = 2,
        value_names = ["NAME", "VALUE"],
        action = ArgAction::Append
    )]
    define: Vec<String>,
}

impl TemplateArgs {
    fn defines(&self) -> Vec<(String, String)> {
        self.define
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }
}

#[derive(Parser)]
#[command(name = "buildpage")]
#[command(about = "Build static HTML pages from templates")]
#[command(long_about = "\
Build static HTML pages from templates

Templates include other files with a custom tag:

  <embed-file src=\"nav.html\"></embed-file>

The tag is replaced by the contents of the first nav.html found on the
search path. Embedded files may embed further files; they are resolved
until none are left. A file that ends up embedding itself never finishes.

Search order: --search-path directories, then search_path from
buildpage.toml, then the working directory.

Without a subcommand the flags work as in earlier releases:
'buildpage -t T [-o O] [-p DIR...] [-D NAME VALUE]' builds, and adding
-d/--dependencies lists dependencies instead.

Run 'buildpage gen-config' to generate a documented buildpage.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./buildpage.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    direct: DirectArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Flag-only form: `buildpage -t T [-d] ...`.
#[derive(clap::Args)]
struct DirectArgs {
    /// HTML template page to build on top of
    #[arg(short = 't', long = "template")]
    template: Option<PathBuf>,

    /// File to write the result to (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Directories to search for embedded files (repeatable)
    #[arg(short = 'p', long = "search-path", num_args = 1.., action = ArgAction::Append)]
    search_path: Vec<PathBuf>,

    /// Load VALUE wherever NAME is embedded (repeatable)
    #[arg(
        short = 'D',
        long = "define",
        num_args = 2,
        value_names = ["NAME", "VALUE"],
        action = ArgAction::Append
    )]
    define: Vec<String>,

    /// List direct dependencies instead of building
    #[arg(short = 'd', long = "dependencies")]
    dependencies: bool,
}

impl DirectArgs {
    /// The subcommand this flag set stands for, or `None` without `-t`.
    fn into_command(self) -> Option<Command> {
        let template = TemplateArgs {
            template: self.template?,
            output: self.output,
            define: self.define,
        };
        if self.dependencies {
            if !self.search_path.is_empty() {
                tracing::warn!("--search-path has no effect with --dependencies");
            }
            Some(Command::Deps { template })
        } else {
            Some(Command::Build {
                template,
                search_path: self.search_path,
            })
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Expand every <embed-file> tag in a template
    Build {
        #[command(flatten)]
        template: TemplateArgs,

        /// Directories to search for embedded files (repeatable)
        #[arg(short = 'p', long = "search-path", num_args = 1.., action = ArgAction::Append)]
        search_path: Vec<PathBuf>,
    },
    /// List the files a template embeds directly, without reading them
    Deps {
        #[command(flatten)]
        template: TemplateArgs,
    },
    /// Write a <title> snippet for a key from [titles.pages]
    Title {
        /// Title key
        key: String,

        /// Directory to write KEY.html to (default: titles.output_dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the snippet instead of writing it
        #[arg(long)]
        stdout: bool,
    },
    /// Print a stock buildpage.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let command = match cli.command {
        Some(command) => command,
        None => cli.direct.into_command().unwrap_or_else(|| {
            Cli::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    "a subcommand or -t/--template is required",
                )
                .exit()
        }),
    };

    match run(cli.config.as_deref(), command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr; stdout carries the page or dependency list.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("BUILDPAGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config_path: Option<&Path>, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Build {
            template,
            search_path,
        } => {
            let config = load_config(config_path)?;
            let search = config.search_path_with(&search_path);
            let renames = config.rename_table_with(&template.defines());
            tracing::debug!(dirs = ?search.dirs(), defines = renames.len(), "building");

            let mut doc = read_template(&template.template)?;
            let page = embed::expand(&mut doc, &search, &renames)?;
            output::emit(&page, template.output.as_deref().into())?;
        }
        Command::Deps { template } => {
            let config = load_config(config_path)?;
            let renames = config.rename_table_with(&template.defines());

            let doc = read_template(&template.template)?;
            let deps = embed::list_dependencies(&doc, &renames)?;
            output::emit(&deps, template.output.as_deref().into())?;
        }
        Command::Title {
            key,
            output_dir,
            stdout,
        } => {
            let config = load_config(config_path)?;
            if stdout {
                let snippet = title::render_title(&config.titles, &key)?;
                output::emit(&snippet, output::Destination::Stdout)?;
            } else {
                let dir = output_dir.unwrap_or_else(|| config.titles.output_dir.clone());
                title::write_title(&config.titles, &key, &dir)?;
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Explicit `--config`, else `buildpage.toml` in the working directory.
fn load_config(path: Option<&Path>) -> Result<config::BuildConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

fn read_template(path: &Path) -> Result<html::Document, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read template {}: {e}", path.display()))?;
    Ok(html::parse_document(&source)?)
}
