//! Dimension resolver: merge an override document into default parameters.
//!
//! The override document is plain text, one `KEY = VALUE` (or `KEY: VALUE`)
//! per line. Blank lines and `#` comments are skipped, unknown keys are
//! ignored and values that do not coerce keep the previous value. Panel
//! width/height that are absent or `<= 0` are derived from the checker.
//! Nothing in here fails on inconsistent input; only `validate` can.

use crate::config::{
    ConfigError, DimensionParams, ParamKey, ParamValue, RigConfig, PANEL_SIZE_TOLERANCE_MM,
};
use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// File name looked up next to the working directory when none is given.
pub const DEFAULT_DIMENSIONS_FILE: &str = "dimensionsdoc";

/// One `key = value` line, with the key already normalized to upper case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverrideEntry {
    pub line: usize,
    pub key: String,
    pub value: String,
}

/// Advisory issue found while resolving; never aborts the run.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum ConfigWarning {
    #[error("line {line}: skipping invalid value for {key}: {value:?}")]
    InvalidValue {
        line: usize,
        key: ParamKey,
        value: String,
    },
    #[error(
        "panel size does not match checker area + margins: expected {expected_w:.2}x{expected_h:.2} mm, got {got_w:.2}x{got_h:.2} mm"
    )]
    PanelSizeMismatch {
        expected_w: f64,
        expected_h: f64,
        got_w: f64,
        got_h: f64,
    },
}

/// Merged parameters, the validated config and the warnings raised on the way.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub params: DimensionParams,
    pub config: RigConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Split one raw line into an override entry.
///
/// The split happens at the first `=`; only lines without `=` fall back to
/// the first `:`. Returns `None` for blanks, comments and lines with neither.
pub fn parse_override_line(line_no: usize, raw: &str) -> Option<OverrideEntry> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=').or_else(|| line.split_once(':'))?;
    Some(OverrideEntry {
        line: line_no,
        key: key.trim().to_ascii_uppercase(),
        value: value.trim().to_string(),
    })
}

/// Merge override text into `defaults`, collecting advisory warnings.
pub fn merge_overrides(
    defaults: &DimensionParams,
    text: &str,
) -> (DimensionParams, Vec<ConfigWarning>) {
    let mut merged = *defaults;
    let mut warnings = Vec::new();

    for entry in text
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| parse_override_line(i + 1, raw))
    {
        let Some(key) = ParamKey::from_name(&entry.key) else {
            debug!("line {}: ignoring unknown key {}", entry.line, entry.key);
            continue;
        };
        match ParamValue::parse_for(key, &entry.value) {
            Some(value) => merged.set(key, value),
            None => {
                let w = ConfigWarning::InvalidValue {
                    line: entry.line,
                    key,
                    value: entry.value,
                };
                warn!("{w}");
                warnings.push(w);
            }
        }
    }

    (merged, warnings)
}

/// Fill in absent panel sizes from the checker geometry.
fn derive_panel_size(params: &mut DimensionParams) {
    if params.panel_w_mm <= 0.0 {
        params.panel_w_mm = params.expected_panel_w_mm();
        debug!("derived panel width {:.2} mm", params.panel_w_mm);
    }
    if params.panel_h_mm <= 0.0 {
        params.panel_h_mm = params.expected_panel_h_mm();
        debug!("derived panel height {:.2} mm", params.panel_h_mm);
    }
}

fn check_panel_consistency(params: &DimensionParams) -> Option<ConfigWarning> {
    let expected_w = params.expected_panel_w_mm();
    let expected_h = params.expected_panel_h_mm();
    let off_w = (params.panel_w_mm - expected_w).abs() > PANEL_SIZE_TOLERANCE_MM;
    let off_h = (params.panel_h_mm - expected_h).abs() > PANEL_SIZE_TOLERANCE_MM;
    (off_w || off_h).then_some(ConfigWarning::PanelSizeMismatch {
        expected_w,
        expected_h,
        got_w: params.panel_w_mm,
        got_h: params.panel_h_mm,
    })
}

/// Resolve an in-memory override document against `defaults`.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(defaults, text)))]
pub fn resolve_str(defaults: &DimensionParams, text: &str) -> Result<Resolution, ConfigError> {
    let (mut params, mut warnings) = merge_overrides(defaults, text);
    derive_panel_size(&mut params);
    if let Some(w) = check_panel_consistency(&params) {
        warn!("{w}");
        warnings.push(w);
    }
    let config = params.validate()?;
    Ok(Resolution {
        params,
        config,
        warnings,
    })
}

/// Resolve an override file; a missing file silently falls back to defaults.
pub fn resolve_file(
    defaults: &DimensionParams,
    path: impl AsRef<Path>,
) -> Result<Resolution, ConfigError> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(
                "dimensions file not found: {} (using defaults)",
                path.display()
            );
            String::new()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    resolve_str(defaults, &text)
}
