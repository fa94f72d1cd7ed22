mod host;

use clap::Parser;
use cspfix_lib::config::CONFIG_FILE_NAME;
use cspfix_lib::{run_command, Config, ConvertResult, Converter, Host, Workspace};
use host::{FileHost, StdioHost};
use log::{debug, warn};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cspfix")]
#[command(about = "Replace an inline style with shared CSS classes")]
struct Args {
    /// Selected text. Read from stdin when neither this nor --file is given.
    #[arg(conflicts_with = "file")]
    text: Option<String>,

    /// Convert a byte range of this file in place.
    #[arg(long, requires_all = ["start", "end"])]
    file: Option<PathBuf>,

    #[arg(long, requires = "file")]
    start: Option<usize>,

    #[arg(long, requires = "file")]
    end: Option<usize>,

    /// Workspace root that stylesheet paths are relative to.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Config file. Defaults to cspfix.toml in the root.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stylesheet to search, relative to the root. Replaces the configured list.
    #[arg(long = "source")]
    sources: Vec<String>,

    /// Stylesheet that new rules are appended to.
    #[arg(long)]
    generated: Option<String>,

    /// Prefix for generated class names.
    #[arg(long)]
    prefix: Option<String>,

    /// More output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Config file first, then command line overrides.
fn load_config(args: &Args) -> ConvertResult<Config> {
    let (mut config, origin) = match &args.config {
        Some(path) => (Config::load(path)?, path.clone()),
        None => (
            Config::load_from_root(&args.root)?,
            args.root.join(CONFIG_FILE_NAME),
        ),
    };

    if !args.sources.is_empty() {
        config.source_css_files = args.sources.clone();
    }
    if let Some(generated) = &args.generated {
        config.generated_css_file = generated.clone();
    }
    if let Some(prefix) = &args.prefix {
        config.class_prefix = prefix.clone();
    }
    config.validate(&origin)?;
    Ok(config)
}

fn read_stdin() -> io::Result<String> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

fn run<H: Host>(host: &mut H, converter: &mut Converter, sink: &Path) -> bool {
    match run_command(host, converter) {
        Ok(Some(conversion)) => {
            for rule in &conversion.created_rules {
                debug!("appended {} to {}", rule, sink.display());
            }
            true
        }
        Ok(None) => {
            host.show_info("Nothing to convert");
            true
        }
        Err(e) => {
            if !e.is_before_mutation() {
                warn!(
                    "{} may already hold rules written before the failure",
                    sink.display()
                );
            }
            false
        }
    }
}

fn main() {
    let args: Args = Args::parse();
    init_logging(args.verbose);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let workspace = Workspace::new(&args.root, config);
    let sink = workspace.sink_path();
    debug!("workspace root {}, sink {}", workspace.root().display(), sink.display());
    let mut converter = Converter::new(workspace);

    let succeeded = match (&args.file, args.start, args.end) {
        (Some(path), Some(start), Some(end)) => {
            run(&mut FileHost::new(path.clone(), start, end), &mut converter, &sink)
        }
        _ => {
            let text = match &args.text {
                Some(text) => text.clone(),
                None => match read_stdin() {
                    Ok(text) => text,
                    Err(e) => {
                        eprintln!("Error reading stdin: {}", e);
                        std::process::exit(1);
                    }
                },
            };
            run(&mut StdioHost::new(text, io::stdout()), &mut converter, &sink)
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
}
