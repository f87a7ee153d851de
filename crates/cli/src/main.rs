//! CLI tool for turning Notion pages and Markdown documents into slides.

mod store;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use deckify::{
    build_presentation, detect, extract_as, load_document, DeckFormatter, Logger, Presentation,
    SlideStore, SourceType,
};
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::JsonFileStore;

/// Output formats.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// The presentation as JSON.
    Json,
    /// A Markdown deck with `---` between slides.
    Markdown,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Turn saved Notion pages and Markdown documents into slides.
#[derive(Parser, Debug)]
#[command(name = "deckify")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s): saved HTML pages or Markdown
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Page URL the input was saved from (default: the input path)
    #[arg(short, long)]
    url: Option<String>,

    /// Source type instead of detecting it (notion, markdown, rendered-markdown, raw-markdown)
    #[arg(short, long, value_parser = parse_source)]
    source: Option<SourceType>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Also append the slides to this JSON store
    #[arg(long)]
    save: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_source(name: &str) -> std::result::Result<SourceType, String> {
    SourceType::from_name(name).ok_or_else(|| format!("unknown source type: {name}"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let logger = Logger::new();
    let mut store = args.save.as_ref().map(JsonFileStore::new);

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &logger) {
            Ok((url, presentation)) => {
                if let Some(store) = store.as_mut() {
                    store
                        .save_slides(&url, presentation.slides())
                        .with_context(|| format!("Failed to save to {}", store.path().display()))?;
                }

                let output = render(&presentation, args.format)?;
                if args.print {
                    print!("{}", output);
                } else {
                    let output_path =
                        get_output_path(input_path, args.output.as_ref(), args.format)?;
                    fs::write(&output_path, &output)
                        .with_context(|| format!("Failed to write to {}", output_path.display()))?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

/// Extract one file. Returns the URL used and the presentation.
fn process_file(input_path: &Path, args: &Args, logger: &Logger) -> Result<(String, Presentation)> {
    let content = fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;
    let url = args
        .url
        .clone()
        .unwrap_or_else(|| input_path.display().to_string());

    let doc = load_document(&content, &url);
    let source = args
        .source
        .or_else(|| detect(&doc, &url))
        .ok_or_else(|| anyhow::anyhow!("Could not detect source type; pass --source"))?;
    log::debug!("Extracting {} as {}", url, source);

    let slides = extract_as(&doc, &url, source, logger).map_err(|e| anyhow::anyhow!("{}", e))?;
    let presentation = build_presentation(&doc, source, slides);

    if args.verbose {
        eprintln!(
            "  Found {} slides ({} with subslides)",
            presentation.slide_count(),
            presentation.total_slide_count()
        );
    }

    Ok((url, presentation))
}

fn render(presentation: &Presentation, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(presentation)
                .context("Failed to serialize presentation")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Markdown => Ok(DeckFormatter::new().format_with_newline(presentation.slides())),
    }
}

/// Determine the output path for a processed file.
fn get_output_path(
    input_path: &Path,
    output_dir: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    // `.slides.` keeps a Markdown deck from overwriting a Markdown input.
    let output_filename = format!("{}.slides.{}", stem, format.extension());

    let output_path = match output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => match input_path.parent() {
            Some(parent) => parent.join(output_filename),
            None => PathBuf::from(output_filename),
        },
    };

    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!(parse_source("raw-markdown"), Ok(SourceType::RawMarkdown));
        assert!(parse_source("slides").is_err());
    }

    #[test]
    fn test_output_path() {
        let path = get_output_path(Path::new("docs/talk.md"), None, OutputFormat::Markdown).unwrap();
        assert_eq!(path, PathBuf::from("docs/talk.slides.md"));
        let path = get_output_path(Path::new("page.html"), None, OutputFormat::Json).unwrap();
        assert_eq!(path, PathBuf::from("page.slides.json"));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "deckify", "page.html", "--source", "notion", "--format", "markdown", "--print",
        ]);
        assert_eq!(args.source, Some(SourceType::Notion));
        assert_eq!(args.format, OutputFormat::Markdown);
        assert!(args.print);
    }
}
