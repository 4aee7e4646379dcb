//! CLI: load declarations → (show | apply | check)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde_json::Value;

use shape_algebra::decl::{self, Document};
use shape_algebra::render::render_definitions;
use shape_algebra::{compatible, Pipeline, Shape};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// transform structural shape declarations with utility-type operators
#[derive(Parser, Debug)]
#[command(name = "shape-algebra", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print every definition (or one) in TypeScript-like syntax
    Show(ShowCmd),
    /// apply a directive pipeline to one definition of each document
    Apply(ApplyCmd),
    /// report whether one definition is compatible with another
    Check(CheckCmd),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// jq filter run over each file; every output is one declaration document
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ShowCmd {
    #[command(flatten)]
    input_settings: InputSettings,

    /// only this definition
    #[arg(long)]
    definition: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct ApplyCmd {
    #[command(flatten)]
    input_settings: InputSettings,

    /// definition to transform (the document's `root` if omitted)
    #[arg(long)]
    root: Option<String>,

    /// pipeline: a path to a JSON file, or inline JSON
    #[arg(long)]
    ops: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Ts)]
    format: OutputFormat,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckCmd {
    #[command(flatten)]
    input_settings: InputSettings,

    #[arg(long)]
    left: String,

    #[arg(long)]
    right: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// TypeScript-like text
    Ts,
    /// declaration document JSON
    Json,
}

/// One declaration document and where it came from.
struct Loaded {
    origin: String,
    document: Document,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Loaded>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        tracing::info!(files = source_paths.len(), "loading declarations");
        let per_file = source_paths
            .par_iter()
            .map(|path| self.load_file(path))
            .collect::<Result<Vec<_>>>()?;
        Ok(per_file.into_iter().flatten().collect())
    }

    fn load_file(&self, source_path: &Path) -> Result<Vec<Loaded>> {
        let source_path_str = source_path.to_string_lossy().to_string();
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read source file {source_path_str}"))?;
        let json_value = serde_json::from_str::<Value>(&source)
            .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;

        let values = match self.jq_expr.as_ref() {
            None => vec![json_value],
            Some(jq_expr) => crate::jq_exec::select_documents(jq_expr, &json_value)
                .with_context(|| format!("failed to apply jq expression to {source_path_str}"))?,
        };
        let many = values.len() > 1;
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let origin = if many { format!("{source_path_str}#{i}") } else { source_path_str.clone() };
                let document = decl::load_value(value)
                    .with_context(|| format!("invalid declaration document {origin}"))?;
                Ok(Loaded { origin, document })
            })
            .collect()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Show(target) => target.run(),
            Command::Apply(target) => target.run(),
            Command::Check(target) => target.run(),
        }
    }
}

impl ShowCmd {
    fn run(&self) -> Result<()> {
        let loaded = self.input_settings.load_documents()?;
        let many = loaded.len() > 1;
        for Loaded { origin, document } in &loaded {
            if many {
                println!("// {origin}");
            }
            let text = match self.definition.as_deref() {
                None => render_definitions(document.definitions.refs()),
                Some(name) => {
                    let only = document
                        .definitions
                        .refs()
                        .filter(|r| r.name() == name)
                        .collect::<Vec<_>>();
                    if only.is_empty() {
                        bail!("{origin}: no definition named `{name}`");
                    }
                    render_definitions(only)
                }
            };
            print!("{text}");
        }
        Ok(())
    }
}

impl ApplyCmd {
    fn run(&self) -> Result<()> {
        let pipeline = load_pipeline(&self.ops)?;
        let loaded = self.input_settings.load_documents()?;

        // shapes are immutable; each document transforms independently
        let rendered = loaded
            .par_iter()
            .map(|Loaded { origin, document }| -> Result<String> {
                let root = document
                    .select(self.root.as_deref())
                    .with_context(|| format!("{origin}: cannot select the root shape"))?;
                let out = pipeline
                    .apply(&root, &document.definitions)
                    .with_context(|| format!("{origin}: pipeline failed"))?;
                render(&out, self.format)
            })
            .collect::<Result<Vec<_>>>()?;

        let out_src = rendered.join("\n");
        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, &out_src)
                .with_context(|| format!("failed to write {}", out.display()))?;
        } else {
            println!("{out_src}");
        }
        Ok(())
    }
}

impl CheckCmd {
    fn run(&self) -> Result<()> {
        for Loaded { origin, document } in self.input_settings.load_documents()? {
            let left = document.definitions.require(&self.left)?;
            let right = document.definitions.require(&self.right)?;
            let verdict = compatible(&left, &right);
            println!("{origin}: {} → {}: {verdict}", self.left, self.right);
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn render(shape: &Shape, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Ts => {
            let mut text = format!("type Result = {shape};\n");
            let emitted = decl::load_decl(&decl::to_document(shape))?;
            text.push_str(&render_definitions(emitted.definitions.refs()));
            Ok(text)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&decl::to_value(shape)?)?),
    }
}

fn load_pipeline(ops: &str) -> Result<Pipeline> {
    let trimmed = ops.trim_start();
    let source = if trimmed.starts_with('[') {
        ops.to_string()
    } else {
        std::fs::read_to_string(ops).with_context(|| format!("failed to read pipeline file {ops}"))?
    };
    Ok(Pipeline::from_json(&source)?)
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
