// SPDX-FileCopyrightText: 2025 some100 <ootinnyoo@outlook.com>
// SPDX-License-Identifier: MIT

//! A command line interface frontend to `blscan`.
//!
//! This lists the BLS entries found under a root, dumps them as JSON for other tools, or parses a single entry to
//! show exactly why it is rejected.

use std::{env, path::PathBuf, process::ExitCode};

use anyhow::anyhow;
use blscan_core::{
    config::{ScanConfig, parsers::bls::parse_entry_with},
    scan::scan_with,
    system::{
        fs::{FileSystem, StdFileSystem},
        log_backend::StderrLogger,
        logger::LogFacade,
    },
};
use getargs::{Arg, Options};
use log::{LevelFilter, warn};

/// What the program was asked to do.
#[derive(Debug, PartialEq, Eq)]
enum Mode {
    /// Print one line per entry.
    List,

    /// Print every entry as JSON.
    Json,

    /// Parse a single entry file.
    Entry(PathBuf),

    /// Print the usage.
    Help,
}

/// The parsed command line.
#[derive(Debug)]
struct Args {
    /// What to do.
    mode: Mode,

    /// The path to a [`ScanConfig`] file, if one was given.
    config: Option<PathBuf>,

    /// Whether informational messages are logged.
    verbose: bool,

    /// The root to scan.
    root: Option<PathBuf>,
}

/// Parses the command line arguments, without the program name.
///
/// # Errors
///
/// May return an `Error` if an argument is unknown, or if a value is missing.
fn parse_args<'a>(args: impl Iterator<Item = &'a str>) -> anyhow::Result<Args> {
    let mut parsed = Args {
        mode: Mode::List,
        config: None,
        verbose: false,
        root: None,
    };

    let mut opts = Options::new(args);
    while let Some(arg) = opts.next_arg().map_err(|e| anyhow!("{e}"))? {
        match arg {
            Arg::Short('l') | Arg::Long("list") => parsed.mode = Mode::List,
            Arg::Short('j') | Arg::Long("json") => parsed.mode = Mode::Json,
            Arg::Short('e') | Arg::Long("entry") => {
                let value = opts
                    .value()
                    .map_err(|_| anyhow!("An entry file was not passed into the entry argument"))?;
                parsed.mode = Mode::Entry(PathBuf::from(value));
            }
            Arg::Short('c') | Arg::Long("config") => {
                let value = opts
                    .value()
                    .map_err(|_| anyhow!("A file was not passed into the config argument"))?;
                parsed.config = Some(PathBuf::from(value));
            }
            Arg::Short('v') | Arg::Long("verbose") => parsed.verbose = true,
            Arg::Short('h') | Arg::Long("help") => {
                parsed.mode = Mode::Help;
                break; // ignore any other arguments when help is specified
            }
            Arg::Positional(root) if parsed.root.is_none() => parsed.root = Some(PathBuf::from(root)),
            Arg::Short(invalid) => return Err(anyhow!("Unknown short argument: -{invalid}")),
            Arg::Long(invalid) => return Err(anyhow!("Unknown long argument: --{invalid}")),
            Arg::Positional(invalid) => return Err(anyhow!("Unknown positional argument: {invalid}")),
        }
    }

    Ok(parsed)
}

/// Loads the [`ScanConfig`], falling back to the default if it could not be read.
fn load_config(path: Option<&PathBuf>) -> ScanConfig {
    let Some(path) = path else {
        return ScanConfig::default();
    };

    match StdFileSystem.read(path) {
        Ok(content) => ScanConfig::from_bytes(&content),
        Err(e) => {
            warn!("{e}");
            ScanConfig::default()
        }
    }
}

/// Prints the usage of the program.
fn print_usage(app_filename: &str) {
    println!(
        r"Usage: {app_filename} [OPTIONS] ROOT

-h, --help            display this help and exit
-l, --list            display boot entries (default)
-j, --json            display boot entries as JSON
-e, --entry FILE      parse a single entry file against ROOT
-c, --config FILE     read scan options from FILE
-v, --verbose         log informational messages
"
    );
}

/// The actual main function of the program, which returns an [`anyhow::Result`].
///
/// # Errors
///
/// May return an `Error` if the arguments are invalid, the entries directory could not be read, or a single entry
/// passed with `--entry` could not be parsed.
fn main_func() -> anyhow::Result<()> {
    let argv: Vec<String> = env::args().collect();
    let app_filename = argv.first().map_or("blscan", String::as_str);
    let args = parse_args(argv.iter().skip(1).map(String::as_str))?;

    let level = if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    let _ = StderrLogger::static_new(level).init();

    let Some(root) = args.root.as_deref() else {
        print_usage(app_filename);
        return Ok(());
    };

    let config = load_config(args.config.as_ref());

    match &args.mode {
        Mode::Help => print_usage(app_filename),
        Mode::Entry(path) => {
            let image = parse_entry_with(&StdFileSystem, path, root, &config)?;
            println!("{image}");
        }
        Mode::List => {
            let images = scan_with(&LogFacade, &StdFileSystem, root, &config)?;
            log::info!("found {} entries under {}", images.len(), root.display());
            for (i, image) in images.iter().enumerate() {
                println!("{i}: {} ({})", image.label(), image.id());
            }
        }
        Mode::Json => {
            let images = scan_with(&LogFacade, &StdFileSystem, root, &config)?;
            println!("{}", serde_json::to_string_pretty(&images)?);
        }
    }

    Ok(())
}

/// The main function of the program.
fn main() -> ExitCode {
    match main_func() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
