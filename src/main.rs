//! Glava CLI - translate scraped chapter HTML from the command line.

use anyhow::{Context, Result};
use clap::Parser;
use glava::config::Config;
use glava::console::Console;
use glava::translate::Translator;
use std::io::Read;
use std::path::PathBuf;

/// HTML-to-translated-HTML pipeline for web novel chapters.
#[derive(Parser, Debug)]
#[command(name = "glava")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// HTML file to translate. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Target language (overrides config).
    #[arg(long)]
    target_lang: Option<String>,

    /// Source language, e.g. "auto", "zh-CN", "zh-TW" (overrides config).
    #[arg(long)]
    source_lang: Option<String>,

    /// Use the legacy one-request-per-chunk path instead of the batched
    /// endpoint.
    #[arg(long)]
    legacy: bool,

    /// Path to an alternate config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path).context("Failed to load configuration")?,
        None => Config::load().context("Failed to load configuration")?,
    };

    if let Some(lang) = args.target_lang {
        config.translation.target_lang = lang;
    }
    if let Some(lang) = args.source_lang {
        config.translation.source_lang = lang;
    }

    config.validate().context("Invalid configuration")?;

    let html = match &args.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    console.step(&format!(
        "Translating {} chars ({} -> {}, {})",
        html.chars().count(),
        config.translation.source_lang,
        config.translation.target_lang,
        if args.legacy { "legacy path" } else { "batched path" },
    ));

    let translator = Translator::new(config.endpoints, config.translation);

    let translated = if args.legacy {
        translator.translate_text(&html).await
    } else {
        translator.translate_html(&html).await
    };

    // Remote failures come back inline rather than as errors; surface
    // them on stderr too so shell users notice.
    if translated.contains("HTTP error") || translated.contains("Fetch failed:") {
        console.warning("Translation service reported an error; output contains diagnostics");
    } else {
        console.success("Done");
    }

    println!("{}", translated);
    Ok(())
}
