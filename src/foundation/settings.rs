use crate::foundation::error::{StriplineError, StriplineResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tunables for interactive editing.
///
/// All fields have defaults, so a settings JSON file only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditSettings {
    /// Nominal handle width in pixels before clamping.
    pub handle_size_px: f64,
    /// Lower clamp for handle width on wide strips.
    pub handle_min_px: f64,
    /// Upper clamp for handle width on wide strips.
    pub handle_max_px: f64,
    /// Strips this many pixels wide or narrower get no handles at all.
    pub handle_min_strip_px: f64,
    /// Pointer delta scale while slip "slow" mode is held.
    pub slip_slow_factor: f64,
    /// Default frame count for gap insertion.
    pub gap_insert_frames: i64,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            handle_size_px: 8.0,
            handle_min_px: 7.0,
            handle_max_px: 30.0,
            handle_min_strip_px: 16.0,
            slip_slow_factor: 0.1,
            gap_insert_frames: 10,
        }
    }
}

impl EditSettings {
    /// Parse settings from a JSON reader; missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> StriplineResult<Self> {
        let settings: Self = serde_json::from_reader(r)
            .map_err(|e| StriplineError::serde(format!("parse settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StriplineResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StriplineError::validation(format!("open settings JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> StriplineResult<()> {
        if !(self.handle_min_px > 0.0 && self.handle_min_px <= self.handle_max_px) {
            return Err(StriplineError::validation(
                "handle_min_px must be > 0 and <= handle_max_px",
            ));
        }
        if !(self.slip_slow_factor > 0.0 && self.slip_slow_factor <= 1.0) {
            return Err(StriplineError::validation(
                "slip_slow_factor must be in (0, 1]",
            ));
        }
        if self.gap_insert_frames <= 0 {
            return Err(StriplineError::validation("gap_insert_frames must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/settings.rs"]
mod tests;
