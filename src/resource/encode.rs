// src/resource/encode.rs

//! Resources → YAML.

use std::path::Path;

use crate::errors::Result;
use crate::fs::FileSystem;

use super::Resource;

const DOCUMENT_SEPARATOR: &str = "---\n";

/// Encode resources as one YAML stream, documents separated by `---`.
///
/// Each resource is encoded independently, in the order given.
pub fn to_yaml<'a, I>(resources: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Resource>,
{
    let mut out = String::new();
    for resource in resources {
        if !out.is_empty() {
            out.push_str(DOCUMENT_SEPARATOR);
        }
        out.push_str(&serde_yaml::to_string(resource)?);
    }
    Ok(out)
}

/// Encode resources and write them to `path` through `fs`.
pub fn write_yaml<'a, I>(fs: &dyn FileSystem, path: &Path, resources: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Resource>,
{
    let yaml = to_yaml(resources)?;
    fs.write(path, yaml.as_bytes())?;
    Ok(())
}
