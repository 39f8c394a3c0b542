use clap::{Arg, ArgAction, ArgMatches, Command};
use collectiontools::loader::{
    InlineSource, TextSource, open_source, update_from_json, update_from_key_value,
};
use collectiontools::{
    ErrorPolicy, JsonOptions, KeyValueOptions, LoadResult, MissingValue, Translator,
    contains_path, value_lookup,
};
use serde_json::{Map, Value};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Document format of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    KeyValue,
    Json,
}

impl Format {
    fn detect(location: &str, force_json: bool) -> Self {
        if force_json || location.to_ascii_lowercase().ends_with(".json") {
            Format::Json
        } else {
            Format::KeyValue
        }
    }
}

fn cli() -> Command {
    let source = Arg::new("source")
        .help("File path, http(s) URL, or - for standard input")
        .required(true);
    let json = Arg::new("json")
        .long("json")
        .help("Read sources as JSON (default: only files ending in .json)")
        .action(ArgAction::SetTrue);
    let separator = Arg::new("separator")
        .long("separator")
        .short('s')
        .help("Separator between key and value in key-value sources")
        .default_value("=");

    Command::new("collectiontools")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Load configuration collections and substitute placeholders")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log loader activity to stderr")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("load")
                .about("Merge sources into one map and print it as JSON")
                .arg(source.clone().num_args(1..))
                .arg(json.clone())
                .arg(separator.clone())
                .arg(
                    Arg::new("no-strip")
                        .long("no-strip")
                        .help("Keep whitespace around keys and values")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("require")
                        .long("require")
                        .short('r')
                        .help("Key path that JSON sources must contain (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("reraise")
                        .long("reraise")
                        .help("Stop at the first failing source")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("has-path")
                .about("Check whether a dotted key path exists in a source")
                .arg(source.clone())
                .arg(Arg::new("path").help("Key path, e.g. database.url").required(true))
                .arg(json.clone())
                .arg(separator.clone())
                .arg(
                    Arg::new("path-separator")
                        .long("path-separator")
                        .help("Separator between key path elements")
                        .default_value("."),
                ),
        )
        .subcommand(
            Command::new("translate")
                .about("Replace placeholders in a JSON document with loaded values")
                .arg(Arg::new("document").help("JSON document, or - for standard input").required(true))
                .arg(
                    Arg::new("values")
                        .long("values")
                        .help("Source of placeholder values (repeatable)")
                        .required(true)
                        .action(ArgAction::Append),
                )
                .arg(json)
                .arg(separator)
                .arg(
                    Arg::new("pattern")
                        .long("pattern")
                        .short('p')
                        .help("Regular expression matching a placeholder, delimiters included"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help("Fail on placeholders without a value instead of keeping them")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn string_arg<'a>(matches: &'a ArgMatches, name: &str, default: &'a str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or(default)
}

fn many_args<'a>(matches: &'a ArgMatches, name: &str) -> Vec<&'a str> {
    matches
        .get_many::<String>(name)
        .map(|values| values.map(String::as_str).collect())
        .unwrap_or_default()
}

async fn resolve_source(location: &str) -> LoadResult<Box<dyn TextSource>> {
    if location != "-" {
        return open_source(location);
    }

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .map_err(|e| collectiontools::LoadError::Read {
            location: "<stdin>".to_string(),
            reason: e.to_string(),
        })?;
    Ok(Box::new(InlineSource::new("<stdin>", text)))
}

async fn load_into(
    dest: &mut Map<String, Value>,
    location: &str,
    format: Format,
    key_value: &KeyValueOptions,
    json: &JsonOptions,
    policy: ErrorPolicy<'_>,
) -> LoadResult<bool> {
    let source = match resolve_source(location).await {
        Ok(source) => source,
        Err(err) => return policy.settle(Err(err)),
    };

    match format {
        Format::KeyValue => update_from_key_value(dest, source.as_ref(), key_value, policy).await,
        Format::Json => update_from_json(dest, source.as_ref(), json, policy).await,
    }
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_load(matches: &ArgMatches) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let force_json = matches.get_flag("json");
    let reraise = matches.get_flag("reraise");
    let key_value = KeyValueOptions {
        separator: string_arg(matches, "separator", "=").to_string(),
        strip: !matches.get_flag("no-strip"),
    };
    let json = JsonOptions::with_mandatory_keys(many_args(matches, "require"));

    let mut collection = Map::new();
    let mut stderr = std::io::stderr();
    let mut failed = 0;

    for location in many_args(matches, "source") {
        let policy = if reraise {
            ErrorPolicy::reraise()
        } else {
            ErrorPolicy::report_to(&mut stderr)
        };
        let format = Format::detect(location, force_json);
        if !load_into(&mut collection, location, format, &key_value, &json, policy).await? {
            failed += 1;
        }
    }

    print_json(&Value::Object(collection))?;
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_has_path(matches: &ArgMatches) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let location = string_arg(matches, "source", "-");
    let path = string_arg(matches, "path", "");
    let path_separator = string_arg(matches, "path-separator", ".");
    let key_value = KeyValueOptions {
        separator: string_arg(matches, "separator", "=").to_string(),
        ..KeyValueOptions::default()
    };

    let mut collection = Map::new();
    load_into(
        &mut collection,
        location,
        Format::detect(location, matches.get_flag("json")),
        &key_value,
        &JsonOptions::default(),
        ErrorPolicy::reraise(),
    )
    .await?;

    let found = contains_path(&collection, path, path_separator);
    println!("{}", found);
    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_translate(matches: &ArgMatches) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let force_json = matches.get_flag("json");
    let key_value = KeyValueOptions {
        separator: string_arg(matches, "separator", "=").to_string(),
        ..KeyValueOptions::default()
    };
    let json = JsonOptions::default();

    let mut values = Map::new();
    for location in many_args(matches, "values") {
        let format = Format::detect(location, force_json);
        load_into(&mut values, location, format, &key_value, &json, ErrorPolicy::reraise()).await?;
    }

    let missing = if matches.get_flag("strict") {
        MissingValue::Fail
    } else {
        MissingValue::Keep
    };
    let mut translator = Translator::from_fn(value_lookup(values, &json.path_separator, missing));
    if let Some(pattern) = matches.get_one::<String>("pattern") {
        translator.with_pattern(pattern)?;
    }

    let document_location = string_arg(matches, "document", "-");
    let document = resolve_source(document_location).await?.fetch_text().await?;
    let document: Value = serde_json::from_str(&document)?;
    tracing::debug!(document = document_location, translator = ?translator, "translating");

    print_json(&translator.translate(document)?)?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("load", sub)) => run_load(sub).await,
        Some(("has-path", sub)) => run_has_path(sub).await,
        Some(("translate", sub)) => run_translate(sub).await,
        _ => unreachable!("clap requires a subcommand"),
    }
}
