use std::{fs, path::Path};

use crate::{error::RirmapError, net::record::ResolvedRecord};

pub const DEFAULT_JSON_EXPORT: &str = "out.json";

/// Write records as a flat, indented JSON array
pub fn write_json(path: &Path, records: &[ResolvedRecord]) -> Result<(), RirmapError> {
    let json = serde_json::to_string_pretty(records).map_err(|source| RirmapError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| RirmapError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}
