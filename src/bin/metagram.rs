//! Parse input with a grammar compiled from a definition file.
//!
//! Usage:
//!   metagram <grammar> <input> [--start <name>] [--prefix]
//!   metagram <grammar> --text <text> [--start <name>] [--prefix]

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "metagram", version, about = "Parse input with a grammar definition")]
struct Args {
    /// Path to the grammar definition.
    grammar: PathBuf,

    /// Path to the input to parse.
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Parse this text instead of reading an input file.
    #[arg(long)]
    text: Option<String>,

    /// Production to start parsing from.
    #[arg(long, short, default_value = "S")]
    start: String,

    /// Allow matching only a prefix of the input.
    #[arg(long)]
    prefix: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let definition = fs::read_to_string(&args.grammar)
        .with_context(|| format!("read grammar: {}", args.grammar.display()))?;
    let grammar = metagram::compile(&definition)
        .with_context(|| format!("compile grammar: {}", args.grammar.display()))?;

    let input = match (&args.text, &args.input) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("read input: {}", path.display()))?,
        (None, None) => return Err(anyhow!("no input provided")),
    };

    if args.prefix {
        let outcome = metagram::parse(&grammar, &args.start, &input, 0)?;
        println!("offset: {}", outcome.offset);
        println!("{}", outcome.value);
    } else {
        let value = metagram::parse_all(&grammar, &args.start, &input)?;
        println!("{}", value);
    }

    Ok(())
}
