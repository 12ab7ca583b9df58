use crate::error::CraftError;
use crate::model::Dataset;
use log::info;
use serde::Deserialize;
use std::path::Path;

/// File format of the exported dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `var data = {...};`, loadable with a plain `<script>` tag
    #[default]
    Javascript,
    /// Bare JSON document
    Json,
}

/// Render the dataset in the requested format
pub fn render(dataset: &Dataset, format: OutputFormat) -> Result<String, CraftError> {
    let json = serde_json::to_string(dataset)?;
    Ok(match format {
        OutputFormat::Javascript => format!("var data = {json};"),
        OutputFormat::Json => json,
    })
}

/// Write the rendered dataset to `path`, creating parent directories
pub async fn write(dataset: &Dataset, path: &Path, format: OutputFormat) -> Result<(), CraftError> {
    let rendered = render(dataset, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, rendered).await?;
    info!("Wrote {} recipes to {}", dataset.recipes.len(), path.display());
    Ok(())
}
