use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Commented starter config written by `sector-scout init`.
pub const STARTER_CONFIG: &str = r#"# sector-scout configuration
#
# Source tables may be JSON (.json) or YAML (.yaml/.yml).
# Relative paths are resolved against this file's directory.
data:
  # [{ province: "Ankara", values: { <indicator>: <number>, ... } }, ...]
  values: data/values.json
  # [{ indicator: "<id>", direction: benefit | cost, label: "<optional>" }, ...]
  directions: data/directions.yaml
  # [{ sector: "Lojistik", indicator: "<id>", weight: 20 }, ...]
  weights: data/weights.yaml
  # { provinces: [...], sectors: [...], aliases: { afyon: Afyonkarahisar } }
  registry: data/registry.yaml

policy:
  # Scores closer than this are ordered by name
  tie_epsilon: 1.0e-9
  # zero: undeclared weights count as 0 (logged); reject: fail the load
  missing_weight: zero

output:
  top: 5
  reasons: 2
  include_risk: true
"#;

/// Write the starter config to `path` atomically.
///
/// Refuses to overwrite an existing file. Creates parent directories as needed.
pub fn write_starter_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(STARTER_CONFIG.as_bytes())
        .context("Failed to write starter config")?;
    file.commit().context("Failed to save starter config")?;

    Ok(())
}
