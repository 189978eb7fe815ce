mod debug_report;

use dissector::{DissectConfig, DissectMetrics, Dissector, Event, RepeatedDelimiters};
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Once;

const DEFAULT_SOURCE_FIELD: &str = "message";

static TRACING_INIT: Once = Once::new();

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let dissector = match Dissector::new(&config.dissect) {
        Ok(dissector) => dissector,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&dissector, &config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so `--json` output stays clean. Enable with `RUST_LOG=dissector=debug`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr).with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

struct CliConfig {
    dissect: DissectConfig,
    input: Input,
    json: bool,
    color: bool,
}

enum Input {
    /// One record built from the remaining command-line arguments.
    Message(String),
    Stdin,
}

fn run(dissector: &Dissector, config: &CliConfig) -> Result<(), String> {
    let metrics = DissectMetrics::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut index = 0;

    let mut handle = |mut event: Event| -> Result<(), String> {
        if config.json {
            dissector.dissect(&mut event, &metrics);
            let line = serde_json::to_string(&event).map_err(|err| format!("failed to encode record: {err}"))?;
            writeln!(out, "{line}").map_err(|err| format!("failed to write output: {err}"))?;
        } else {
            let report = dissector.dissect_verbose(&mut event, &metrics);
            debug_report::print_run(index, &event, &report, config.color);
        }
        index += 1;
        Ok(())
    };

    match &config.input {
        Input::Message(message) => handle(Event::with_fields([(DEFAULT_SOURCE_FIELD, message.as_str())]))?,
        Input::Stdin => {
            for line in io::stdin().lock().lines() {
                let line = line.map_err(|err| format!("failed to read stdin: {err}"))?;
                if line.trim().is_empty() {
                    continue;
                }
                handle(parse_record(&line))?;
            }
        }
    }

    tracing::info!(matches = metrics.matches(), failures = metrics.failures(), "dissection finished");
    Ok(())
}

/// A JSON object line becomes a record as-is; anything else is the `message` of a new record.
fn parse_record(line: &str) -> Event {
    if line.trim_start().starts_with('{') {
        match serde_json::from_str::<Event>(line) {
            Ok(event) => return event,
            Err(err) => tracing::debug!(%err, "line is not a JSON record, using it as a message"),
        }
    }
    Event::with_fields([(DEFAULT_SOURCE_FIELD, line)])
}

fn parse_args() -> Result<CliConfig, String> {
    let mut config_file: Option<String> = None;
    let mut mapping: Vec<(String, String)> = Vec::new();
    let mut conversions: Vec<(String, String)> = Vec::new();
    let mut tags: Vec<String> = Vec::new();
    let mut preserve_repeats = false;
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut message: Option<String> = None;
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("dissector {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--preserve-repeats" => preserve_repeats = true,
            "-m" | "--mapping" => {
                let value = args.next().ok_or_else(|| "error: --mapping expects FIELD=PATTERN".to_string())?;
                mapping.push(split_pair("--mapping", &value)?);
            }
            "-c" | "--config" => {
                let value = args.next().ok_or_else(|| "error: --config expects a file".to_string())?;
                if config_file.is_some() {
                    return Err("error: --config provided multiple times".to_string());
                }
                config_file = Some(value);
            }
            "--convert" => {
                let value = args.next().ok_or_else(|| "error: --convert expects FIELD=TYPE".to_string())?;
                conversions.push(split_pair("--convert", &value)?);
            }
            "--tag-on-failure" => {
                tags.push(args.next().ok_or_else(|| "error: --tag-on-failure expects a value".to_string())?);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    message = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--mapping=") => mapping.push(split_pair("--mapping", &arg["--mapping=".len()..])?),
            _ if arg.starts_with("--convert=") => {
                conversions.push(split_pair("--convert", &arg["--convert=".len()..])?)
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                message = Some(std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" "));
                break;
            }
        }
    }

    let mut dissect = match config_file {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|err| format!("error: failed to read '{path}': {err}"))?;
            DissectConfig::from_json(&text).map_err(|err| format!("error: '{path}': {err}"))?
        }
        None => DissectConfig::new(),
    };
    dissect.mapping.extend(mapping);
    dissect.convert_datatype.extend(conversions);
    if !tags.is_empty() {
        dissect.tag_on_failure = tags;
    }
    if preserve_repeats {
        dissect.repeated_delimiters = RepeatedDelimiters::Preserve;
    }

    if dissect.mapping.is_empty() && dissect.convert_datatype.is_empty() {
        return Err(format!("error: nothing to do, give --mapping, --convert or --config\n\n{}", help_text()));
    }

    let input = match message {
        Some(message) => Input::Message(message),
        None if io::stdin().is_terminal() => {
            return Err(format!("error: no input provided\n\n{}", help_text()));
        }
        None => Input::Stdin,
    };

    Ok(CliConfig { dissect, input, json, color })
}

fn split_pair(option: &str, value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((field, rest)) if !field.is_empty() => Ok((field.to_string(), rest.to_string())),
        _ => Err(format!("error: {option} expects FIELD=VALUE, got '{value}'")),
    }
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "dissector {version}

Split log lines into fields with dissect patterns.

Usage:
  dissector [OPTIONS] [--] <message...>
  dissector [OPTIONS] < records.jsonl

Options:
  -m, --mapping <FIELD=PATTERN>  Dissect FIELD with PATTERN. Repeatable, applied in order.
  -c, --config <file>            JSON configuration (mapping, tag_on_failure,
                                 convert_datatype, repeated_delimiters).
  --convert <FIELD=TYPE>         Convert FIELD to int or float after dissection.
  --tag-on-failure <tag>         Tag added when an entry fails. Repeatable.
                                 Default: {default_tag}
  --preserve-repeats             Only collapse repeated delimiters after `->` fields.
  --json                         Print dissected records as JSON lines.
  --color                        Force ANSI color output.
  --no-color                     Disable ANSI color output.
  -h, --help                     Show this help message.
  -V, --version                  Print version information.

Input:
  Remaining arguments form the `{source}` field of a single record. Without them,
  stdin is read line by line: JSON objects are used as records, other lines become
  the `{source}` field of a new record.

Exit codes:
  0  Success.
  1  Runtime error (I/O, output encoding).
  2  Invalid arguments or configuration.
",
        version = env!("CARGO_PKG_VERSION"),
        default_tag = dissector::DEFAULT_FAILURE_TAG,
        source = DEFAULT_SOURCE_FIELD,
    )
}
