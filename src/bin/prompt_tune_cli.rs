//! prompt-tune CLI: optimize prompts from the command line
//!
//! Usage:
//!   prompt-tune-cli optimize <description> [OPTIONS]   Optimize a prompt
//!   prompt-tune-cli models [--config <path>]           List configured models
//!   prompt-tune-cli library <action> [OPTIONS]         Manage saved prompts
//!   prompt-tune-cli version                            Show version

use anyhow::{bail, Context};
use futures::StreamExt;
use prompt_tune::config::Settings;
use prompt_tune::library::{PromptLibrary, SavePrompt};
use prompt_tune::OptimizeRequest;
use std::io::Write;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "optimize" => cmd_optimize(&args[2..]).await,
        "models" => cmd_models(&args[2..]),
        "library" => cmd_library(&args[2..]),
        "version" | "--version" | "-V" => {
            println!("prompt-tune-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"prompt-tune-cli: prompt optimization

USAGE:
    prompt-tune-cli <COMMAND> [OPTIONS]

COMMANDS:
    optimize <description>      Optimize a prompt and print the JSON result
        --context <text>        Extra context for the request
        --model <alias>         Model alias (default from settings)
        --max-tokens <n>        Generation limit
        --temperature <t>       Sampling temperature, 0.0-1.0
        --stream                Print server-sent events instead of one JSON object
        --config <path>         YAML settings file
        --save <name>           Also save the optimized prompt to the library
    models [--config <path>]    List model aliases and prices
    library save <name> <prompt> [--description <text>] [--tags a,b]
    library list                List saved prompts, newest first
    library get <id>            Show a prompt and count the use
    library delete <id>         Remove a prompt
    library stats               Usage totals and most used prompts
        --library <path>        Library file (default from settings)
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    AWS_BEARER_TOKEN_BEDROCK    Provider API key
    PROMPT_TUNE_*               Settings overrides (see crate docs)
    PROMPT_TUNE_LIBRARY_PATH    Library file
    RUST_LOG                    Log filter, e.g. prompt_tune=debug"#
    );
}

/// Value following `flag`, if present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Arguments that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    const VALUED: [&str; 9] = [
        "--context",
        "--model",
        "--max-tokens",
        "--temperature",
        "--config",
        "--save",
        "--library",
        "--description",
        "--tags",
    ];
    let mut out = Vec::new();
    let mut skip = false;
    for a in args {
        if skip {
            skip = false;
        } else if VALUED.contains(&a.as_str()) {
            skip = true;
        } else if !a.starts_with("--") {
            out.push(a.as_str());
        }
    }
    out
}

fn load_settings(args: &[String]) -> anyhow::Result<Settings> {
    let path = flag_value(args, "--config").map(PathBuf::from);
    Settings::resolve(path.as_deref()).context("failed to load settings")
}

async fn cmd_optimize(args: &[String]) -> anyhow::Result<()> {
    let Some(description) = args.first().filter(|a| !a.starts_with("--")) else {
        bail!("optimize requires a description");
    };
    let settings = load_settings(args)?;

    let mut request = OptimizeRequest::new(description.clone())
        .with_model(flag_value(args, "--model").unwrap_or(settings.default_model.as_str()));
    if let Some(ctx) = flag_value(args, "--context") {
        request = request.with_context(ctx);
    }
    if let Some(n) = flag_value(args, "--max-tokens") {
        request = request.with_max_tokens(n.parse().context("--max-tokens must be an integer")?);
    }
    if let Some(t) = flag_value(args, "--temperature") {
        request = request.with_temperature(t.parse().context("--temperature must be a number")?);
    }
    request.validate()?;

    let pipeline = settings.build_pipeline()?;

    if args.iter().any(|a| a == "--stream") {
        let mut events = pipeline.optimize_stream(request);
        let mut stdout = std::io::stdout();
        while let Some(event) = events.next().await {
            stdout.write_all(event.to_sse().as_bytes())?;
            stdout.flush()?;
        }
    } else {
        let result = pipeline.optimize(&request).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        if let Some(name) = flag_value(args, "--save") {
            let library = open_library(&settings, args)?;
            let entry = library.save(
                SavePrompt::new(name, result.optimized_prompt.clone())
                    .with_description(request.description.clone()),
            )?;
            persist_library(&library, &settings, args)?;
            eprintln!("Saved as {}", entry.id);
        }
    }
    Ok(())
}

fn library_path(settings: &Settings, args: &[String]) -> PathBuf {
    flag_value(args, "--library")
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.library_path.clone())
}

fn open_library(settings: &Settings, args: &[String]) -> anyhow::Result<PromptLibrary> {
    let path = library_path(settings, args);
    PromptLibrary::open(&path).with_context(|| format!("failed to open library {}", path.display()))
}

fn persist_library(library: &PromptLibrary, settings: &Settings, args: &[String]) -> anyhow::Result<()> {
    let path = library_path(settings, args);
    library
        .persist(&path)
        .with_context(|| format!("failed to write library {}", path.display()))
}

fn cmd_library(args: &[String]) -> anyhow::Result<()> {
    let settings = load_settings(args)?;
    let library = open_library(&settings, args)?;
    let positional = positionals(args);

    match positional.as_slice() {
        ["save", name, prompt, ..] => {
            let mut request = SavePrompt::new(*name, *prompt);
            if let Some(d) = flag_value(args, "--description") {
                request = request.with_description(d);
            }
            if let Some(tags) = flag_value(args, "--tags") {
                request = request.with_tags(
                    tags.split(',').map(str::trim).filter(|t| !t.is_empty()),
                );
            }
            let entry = library.save(request)?;
            persist_library(&library, &settings, args)?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        ["list", ..] => println!("{}", serde_json::to_string_pretty(&library.list())?),
        ["get", id, ..] => {
            let entry = library.get(id)?;
            persist_library(&library, &settings, args)?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        ["delete", id, ..] => {
            let entry = library.delete(id)?;
            persist_library(&library, &settings, args)?;
            println!("Deleted {}", entry.id);
        }
        ["stats", ..] => println!("{}", serde_json::to_string_pretty(&library.usage_stats())?),
        _ => bail!("usage: library <save <name> <prompt> | list | get <id> | delete <id> | stats>"),
    }
    Ok(())
}

fn cmd_models(args: &[String]) -> anyhow::Result<()> {
    let settings = load_settings(args)?;
    let catalog = settings.catalog();
    println!("{:<20} {:<48} {:>10} {:>10}", "ALIAS", "MODEL ID", "IN/1K", "OUT/1K");
    for spec in catalog.list() {
        let marker = if spec.alias == catalog.default_alias() { " (default)" } else { "" };
        println!(
            "{:<20} {:<48} {:>10.5} {:>10.5}{}",
            spec.alias,
            spec.model_id,
            spec.pricing.input_cost_per_1k,
            spec.pricing.output_cost_per_1k,
            marker
        );
    }
    Ok(())
}
