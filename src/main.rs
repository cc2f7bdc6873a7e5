use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use adc_core::channel::create_channel;
use adc_core::hierarchy::ViewHierarchyIndex;
use adc_core::settings::Settings;
use adc_core::{executor, interpreter, logger, resolver};

#[derive(Debug, Parser)]
#[command(name = "adc", about = "Drive a device's input with text macros", version)]
struct Cli {
    /// Directory that receives app.log
    #[arg(long, global = true, default_value = "logs")]
    logs: PathBuf,

    /// Echo log lines to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute a macro against the stub device and print what it was sent.
    Run {
        /// Macro text, or `-` to read it from stdin
        #[arg(value_name = "MACRO")]
        source: String,
        /// Hierarchy dump the stub device serves
        #[arg(long)]
        dump: Option<PathBuf>,
        #[arg(long, default_value = "settings.json")]
        settings: PathBuf,
    },

    /// Print the actions a macro resolves to, without executing them.
    Plan {
        #[arg(value_name = "MACRO")]
        source: String,
        #[arg(long)]
        dump: Option<PathBuf>,
        #[arg(long, default_value = "settings.json")]
        settings: PathBuf,
    },

    /// Print the resource-id table of a hierarchy dump.
    Index { dump: PathBuf },

    /// Print the coordinates an `@reference` resolves to.
    Resolve {
        dump: PathBuf,
        /// Reference with or without the leading `@`, e.g. `id/ok[10,90]`
        reference: String,
    },

    /// Write the default settings file.
    #[command(name = "init-settings")]
    InitSettings {
        #[arg(long, default_value = "settings.json")]
        settings: PathBuf,
    },
}

fn read_macro(source: String) -> Result<String> {
    if source != "-" {
        return Ok(source);
    }
    let mut text = String::new();
    io::stdin().read_to_string(&mut text).context("reading macro from stdin")?;
    Ok(text)
}

fn read_dump(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading dump {}", path.display()))
}

fn read_index(path: Option<&Path>) -> Result<ViewHierarchyIndex> {
    Ok(match path {
        Some(p) => ViewHierarchyIndex::parse(&read_dump(p)?),
        None => ViewHierarchyIndex::new(),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init(&cli.logs);
    logger::set_echo(cli.verbose);
    logger::info("adc started");

    match cli.command {
        Commands::Run { source, dump, settings } => {
            let source = read_macro(source)?;
            let settings = Settings::load(&settings);
            let dump = dump.as_deref().map(read_dump).transpose()?;
            let mut channel = create_channel(dump);

            let report = executor::run_macro(&source, &mut channel, &settings, None);
            for command in channel.sent() {
                println!("{}", command);
            }
            for failure in &report.failures {
                eprintln!("failed: {} ({})", failure.action, failure.error);
            }
        }
        Commands::Plan { source, dump, settings } => {
            let source = read_macro(source)?;
            let settings = Settings::load(&settings);
            let index = read_index(dump.as_deref())?;
            for action in interpreter::plan(&source, &index, settings.macro_options()) {
                println!("{}", action);
            }
        }
        Commands::Index { dump } => {
            let index = read_index(Some(&dump))?;
            for (id, rect) in index.iter() {
                println!("{:<48} {}", id, rect);
            }
        }
        Commands::Resolve { dump, reference } => {
            let index = read_index(Some(&dump))?;
            let token = reference.strip_prefix('@').unwrap_or(&reference);
            let (x, y) = resolver::resolve(token, &index);
            println!("{} {}", x, y);
        }
        Commands::InitSettings { settings } => {
            Settings::default().save(&settings)?;
            println!("wrote {}", settings.display());
        }
    }

    Ok(())
}
