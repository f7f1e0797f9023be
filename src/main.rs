use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};

use chatmark::Config;

const DEFAULT_CONFIG_FILE: &str = "chatmark.toml";

#[derive(Parser)]
#[command(name = "chatmark")]
#[command(about = "Render chat assistant replies written in Markdown")]
struct Cli {
    /// Input file, or `-` to read from stdin
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Output file (defaults to stdout, or the input name with .pdf for PDF)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (defaults to ./chatmark.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wrap HTML output in a complete document
    #[arg(long)]
    standalone: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Html,
    Typst,
    Pdf,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = Config::load(&config_path)?;

    let output = match (&cli.output, cli.format) {
        (Some(path), _) => Some(path.clone()),
        (None, Format::Pdf) if is_stdin(&cli.input) => {
            bail!("--output is required when writing PDF from stdin")
        }
        (None, Format::Pdf) => Some(cli.input.with_extension("pdf")),
        (None, _) => None,
    };

    let markdown = read_input(&cli.input)?;

    let rendered = match cli.format {
        Format::Html => {
            let body = chatmark::markdown_to_html_with_config(&markdown, &config);
            let body = if cli.standalone {
                chatmark::standalone_document(&document_title(&cli.input), &body)
            } else {
                body
            };
            body.into_bytes()
        }
        Format::Typst => chatmark::markdown_to_typst_with_config(&markdown, &config).into_bytes(),
        Format::Pdf => chatmark::markdown_to_pdf_with_config(&markdown, &config)?,
    };

    match output {
        Some(path) => {
            fs::write(&path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("Created {}", path.display());
        }
        None => {
            io::stdout()
                .write_all(&rendered)
                .context("failed to write to stdout")?;
        }
    }

    Ok(())
}

fn is_stdin(input: &Path) -> bool {
    input.as_os_str() == "-"
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if is_stdin(input) {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    fs::read_to_string(input).map_err(|source| {
        chatmark::Error::Io {
            path: input.to_path_buf(),
            source,
        }
        .into()
    })
}

fn document_title(input: &Path) -> String {
    input
        .file_stem()
        .filter(|_| !is_stdin(input))
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chatmark".to_string())
}
