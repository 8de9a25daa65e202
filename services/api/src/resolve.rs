use clap::Args;
use gourmet_ai::error::AppError;
use gourmet_ai::resolver::merge;
use gourmet_ai::resolver::raw::RawExtraction;
use gourmet_ai::taxonomy::{self, Taxonomy};
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug)]
pub(crate) struct ResolveArgs {
    /// Extraction JSON, e.g. '{"genre":"居酒屋","location":"天神"}'
    #[arg(conflicts_with = "file")]
    pub(crate) extraction: Option<String>,
    /// Read the extraction JSON from a file instead
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
    /// Taxonomy document path (defaults to the conventional search paths)
    #[arg(long)]
    pub(crate) taxonomy: Option<PathBuf>,
}

/// Offline resolution for demos and debugging: extraction JSON in, resolved
/// parameter record out, no network involved.
pub(crate) fn run_resolve(args: ResolveArgs) -> Result<(), AppError> {
    let raw = match (&args.extraction, &args.file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "pass an extraction JSON argument or --file",
            )))
        }
    };

    let taxonomy = match &args.taxonomy {
        Some(path) => taxonomy::load_from_path(path),
        None => taxonomy::load_default(),
    }
    .unwrap_or_else(|err| {
        warn!(error = %err, "taxonomy unavailable, resolution will degrade");
        Taxonomy::empty()
    });

    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let (extraction, issues) = RawExtraction::from_value(&value);
    for issue in &issues {
        eprintln!("warning: field '{}' could not be decoded", issue.field);
    }

    let resolution = merge(&extraction, &taxonomy);
    println!("{}", serde_json::to_string_pretty(&resolution)?);
    Ok(())
}
