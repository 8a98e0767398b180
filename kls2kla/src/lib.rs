pub mod lexer;
pub mod parser;
pub mod binary;
pub mod export;
pub mod include_processor;

pub use keylayer_core::*;

use keylayer_core::kla::KlaLoader;
use log::{info, warn};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Output choices of [`convert_kls_to_kla`]
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Also write a `.keylayout` file next to each `.kla`
    pub keylayout: bool,
    /// A previously shipped `.kla` used as the base document
    pub base: Option<PathBuf>,
}

pub fn convert_kls_to_kla(
    input_path: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> std::result::Result<Vec<PathBuf>, KlsError> {
    let source = compile_kls_file(input_path)?;

    let base = match &options.base {
        Some(path) => Some(load_kla_file(path)?),
        None => None,
    };

    let artifacts = build_layout(&source, base)?;

    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();
    for artifact in &artifacts {
        let kla_path = output_dir.join(format!("{}.kla", file_stem_for(&artifact.name)));
        write_kla(&artifact.document, &kla_path)?;
        info!("Wrote {}", kla_path.display());
        written.push(kla_path);

        if options.keylayout {
            let xml_path = output_dir.join(format!("{}.keylayout", file_stem_for(&artifact.name)));
            fs::write(&xml_path, export::to_keylayout(&artifact.document))?;
            info!("Wrote {}", xml_path.display());
            written.push(xml_path);
        }
    }

    Ok(written)
}

/// File name stem for a layout name; separators would escape the output directory
fn file_stem_for(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Compile KLS source text; includes resolve against the working directory
pub fn compile_kls(input: &str) -> std::result::Result<LayoutSource, KlsError> {
    let mut processor = include_processor::IncludeProcessor::new();
    let ast = processor.process_string(input, None)?;

    binary::Compiler::new().compile(ast)
}

pub fn compile_kls_file(input_path: &Path) -> std::result::Result<LayoutSource, KlsError> {
    let mut processor = include_processor::IncludeProcessor::new();
    let ast = processor.process_file(input_path)?;

    let default_name = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string());

    binary::Compiler::with_default_name(default_name).compile(ast)
}

/// Build configuration with the script's options applied
pub fn build_config(source: &LayoutSource) -> std::result::Result<BuildConfig, KlsError> {
    let mut config = BuildConfig::default();

    if let Some(value) = source.options.get("CASE_VARIANTS") {
        config.expansion.enabled = binary::parse_bool_option("CASE_VARIANTS", value)?;
    }

    Ok(config)
}

/// Build every variant of a compiled layout.
///
/// A loaded `base` replaces the script's own key maps and actions.
pub fn build_layout(source: &LayoutSource, base: Option<Document>) -> std::result::Result<Vec<VariantArtifact>, KlsError> {
    let config = build_config(source)?;

    let mut source = source.clone();
    if let Some(base) = base {
        if !source.base.keymaps.is_empty() || !source.base.actions.is_empty() {
            warn!(
                "Script key maps and actions are ignored: building on loaded document '{}'",
                base.name
            );
        }
        source.base = base;
    }

    let mut pipeline = Pipeline::with_timestamps(config);
    Ok(pipeline.build_layout(&source)?)
}

pub fn write_kla(document: &Document, output_path: &Path) -> std::result::Result<(), KlsError> {
    let file = File::create(output_path)?;
    let writer = BufWriter::new(file);
    binary::KlaWriter::new(writer).write_document(document)
}

pub fn load_kla_file(path: &Path) -> std::result::Result<Document, KlsError> {
    let data = fs::read(path)?;
    Ok(KlaLoader::load(&data).map_err(Error::from)?)
}
