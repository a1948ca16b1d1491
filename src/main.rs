//! `BibleLink` - print a scripture passage ready to paste into a note.
//!
//! Usage:
//!   biblelink [--translation KJV] [--output text|link|codeblock] [--option verse]... <reference>
//!   biblelink --block "KJV John 3:16-18 [verse|link]"

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use biblelink::bible::{parse_reference, BibleDatabase};
use biblelink::config::Config;
use biblelink::error::Error;
use biblelink::services::passage::{resolve_passage, BlockOption, CodeBlockRequest, OutputType, RenderOptions};
use biblelink::services::scripture::RuleProvider;

/// What the command line asked for.
struct Request {
    translation: String,
    reference: String,
    output: OutputType,
    options: Vec<BlockOption>,
}

fn parse_args(args: impl IntoIterator<Item = String>, config: &Config) -> anyhow::Result<Request> {
    let mut request = Request {
        translation: config.default_translation.clone(),
        reference: String::new(),
        output: config.output_type,
        options: Vec::new(),
    };
    let mut words = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--translation" | "-t" => request.translation = value(arg.as_str())?,
            "--output" | "-o" => request.output = value(arg.as_str())?.parse()?,
            "--option" => {
                let name = value(arg.as_str())?;
                let opt = BlockOption::from_keyword(&name)
                    .with_context(|| format!("unknown option '{name}'"))?;
                request.options.push(opt);
            }
            "--block" => {
                let block = CodeBlockRequest::parse(&value(arg.as_str())?)?;
                request.translation = block.translation;
                request.reference = block.reference;
                request.options = block.options;
                request.output = OutputType::CodeBlock;
            }
            other => words.push(other.to_string()),
        }
    }

    if !words.is_empty() {
        request.reference = words.join(" ");
    }
    if request.reference.trim().is_empty() {
        bail!("no reference given (e.g. biblelink John 3:16)");
    }
    Ok(request)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().context("loading configuration")?;
    let request = parse_args(std::env::args().skip(1), &config)?;
    let range = parse_reference(&request.reference)?;

    let db = BibleDatabase::load(&config.data_path)
        .with_context(|| format!("loading {}", config.data_path.display()))?;

    if !db.has_translation(&request.translation) {
        let known: Vec<_> = db.translations().iter().map(|t| t.abbreviation.clone()).collect();
        bail!(
            "translation '{}' not found (available: {})",
            request.translation,
            if known.is_empty() { "none".to_string() } else { known.join(", ") }
        );
    }

    let passage = match resolve_passage(&range, &request.translation, &db) {
        Ok(p) => p,
        Err(Error::Scripture { message, suggestion: Some(s) }) => {
            bail!("{message} (did you mean \"{s}\"?)")
        }
        Err(e) => return Err(e.into()),
    };

    let mut options = RenderOptions::from_config(&config);
    options.block_options = request.options;
    let formatter = db.formatter(&request.translation);
    println!("{}", passage.render(request.output, &options, &formatter));

    Ok(())
}
