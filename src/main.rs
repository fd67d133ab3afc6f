//! mdpack CLI
//!
//! Edit, store and export Markdown notes that embed locally uploaded images.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use mdpack::app::domain::{AppSettings, DocumentId, Selection};
use mdpack::app::infrastructure::logging;
use mdpack::app::services::archive::{ExportFormat, PayloadKind};
use mdpack::app::services::asset_store::{AssetStore, mime_for_extension};
use mdpack::app::services::export::Exporter;
use mdpack::app::services::history::{EditHistory, Snapshot};
use mdpack::app::services::storage::DocumentStore;
use mdpack::app::services::text_ops::{count_words, select_next_occurrence};
use mdpack::app::services::transform::{TransformOp, TransformResult, apply_transform};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mdpack")]
#[command(version)]
#[command(about = "Markdown notes with bundled image export")]
struct Cli {
    /// Settings file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save a note
    Save {
        name: String,

        /// Content file (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Save a note under its old name, then move it to a new one
    Rename {
        from: String,
        to: String,

        /// New content (default: keep the stored content)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Print a note, or its starter template when it does not exist yet
    Show { name: String },

    /// List stored notes
    List,

    /// Export a note, bundling referenced images into an archive
    Export {
        name: String,

        /// md or html
        #[arg(short, long, default_value = "md")]
        format: String,

        /// Output file (default: the suggested download name)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Apply editing transforms and print the result as JSON
    Transform {
        /// Transform names, applied in order
        #[arg(required = true)]
        ops: Vec<String>,

        #[arg(long, default_value_t = 0)]
        start: usize,

        #[arg(long, default_value_t = 0)]
        end: usize,

        /// Steps to undo after applying
        #[arg(long, default_value_t = 0)]
        undo: usize,

        /// Text file (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Select the next occurrence of the selection and print it as JSON
    FindNext {
        #[arg(long, default_value_t = 0)]
        start: usize,

        #[arg(long, default_value_t = 0)]
        end: usize,

        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Store an image in the asset directory and print its URL
    Upload {
        file: PathBuf,

        /// MIME type (default: guessed from the extension)
        #[arg(long)]
        mime: Option<String>,
    },

    /// Count characters of a note, ignoring markup and code blocks
    Words {
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = match &cli.config {
        Some(path) => AppSettings::load_from(path),
        None => AppSettings::load(),
    };
    settings.validate()?;

    match cli.command {
        Commands::Save { name, input } => {
            let store = DocumentStore::new(&settings.notes_dir);
            let id = DocumentId::parse(&name)?;
            let content = read_input(input.as_deref())?;
            store
                .save(&id, &content)
                .with_context(|| format!("Failed to save {}", id))?;
            if cli.verbose {
                println!("Saved: {} ({} bytes)", store.path_of(&id).display(), content.len());
            }
        }
        Commands::Rename { from, to, input } => {
            let store = DocumentStore::new(&settings.notes_dir);
            let from = DocumentId::parse(&from)?;
            let to = DocumentId::parse(&to)?;
            let content = match input {
                Some(path) => read_input(Some(path.as_path()))?,
                None => store.load(&from)?.content,
            };
            store
                .rename(&from, &to, &content)
                .with_context(|| format!("Failed to rename {} to {}", from, to))?;
        }
        Commands::Show { name } => {
            let store = DocumentStore::new(&settings.notes_dir);
            let doc = store.load(&DocumentId::parse(&name)?)?;
            print!("{}", doc.content);
        }
        Commands::List => {
            let store = DocumentStore::new(&settings.notes_dir);
            for id in store.list()? {
                println!("{}", id);
            }
        }
        Commands::Export { name, format, output } => {
            export_note(&settings, &name, &format, output, cli.verbose)?;
        }
        Commands::Transform {
            ops,
            start,
            end,
            undo,
            input,
        } => {
            let text = read_input(input.as_deref())?;
            let result = run_transforms(&text, Selection::new(start, end), &ops, undo, settings.history_limit)?;
            println!("{}", serde_json::to_string(&result)?);
        }
        Commands::FindNext { start, end, input } => {
            let text = read_input(input.as_deref())?;
            let next = select_next_occurrence(&text, Selection::new(start, end));
            println!("{}", serde_json::to_string(&next)?);
        }
        Commands::Upload { file, mime } => {
            let bytes = fs::read(&file).with_context(|| format!("Failed to read: {}", file.display()))?;
            let mime = match mime {
                Some(m) => m,
                None => guess_mime(&file)?.to_string(),
            };
            let store = AssetStore::from_settings(&settings);
            let stored = store.store_upload(
                &bytes,
                &mime,
                settings.max_upload_bytes,
                settings.public_url_prefix.as_deref(),
            )?;
            println!("{}", stored.url);
        }
        Commands::Words { input } => {
            let text = read_input(input.as_deref())?;
            println!("{}", count_words(&text));
        }
    }

    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn guess_mime(file: &Path) -> Result<&'static str> {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("Cannot guess MIME type of {}; pass --mime", file.display()))?;
    mime_for_extension(ext).ok_or_else(|| anyhow!("Unsupported image type: .{}", ext))
}

fn export_note(settings: &AppSettings, name: &str, format: &str, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    let format = ExportFormat::parse(format).ok_or_else(|| anyhow!("Unknown export format: {}", format))?;
    let store = DocumentStore::new(&settings.notes_dir);
    let doc = store.load(&DocumentId::parse(name)?)?;

    let payload = Exporter::from_settings(settings).export(&doc, format);
    let output = output.unwrap_or_else(|| PathBuf::from(&payload.file_name));
    fs::write(&output, &payload.bytes).with_context(|| format!("Failed to write: {}", output.display()))?;

    if verbose {
        let kind = match payload.kind {
            PayloadKind::Archive => "archive",
            PayloadKind::Raw => "document",
        };
        println!(
            "Exported {} as {} ({}, {} bytes)",
            doc.id,
            output.display(),
            kind,
            payload.bytes.len()
        );
    }
    Ok(())
}

/// Apply `ops` in order, then step back `undo` times through the edit history.
fn run_transforms(text: &str, selection: Selection, ops: &[String], undo: usize, limit: usize) -> Result<TransformResult> {
    let mut history = EditHistory::new(limit);
    history.record(Snapshot::new(text, selection.normalized(text)));

    for name in ops {
        let op: TransformOp = name.parse()?;
        let Some(current) = history.current().cloned() else { break };
        let result = apply_transform(&current.text, current.selection, op).with_context(|| format!("{} failed", op))?;
        history.record(Snapshot::new(result.text, result.selection));
    }
    for _ in 0..undo {
        if history.undo().is_none() {
            break;
        }
    }

    let current = history
        .current()
        .ok_or_else(|| anyhow!("edit history is empty"))?;
    Ok(TransformResult {
        text: current.text.clone(),
        selection: current.selection,
    })
}
