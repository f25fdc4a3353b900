// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Calibration-duration configuration.
//!
//! Durations are stored in minutes.  Every field may be omitted from a TOML
//! file, in which case the observatory defaults apply:
//!
//! ```toml
//! screen_flat = 90.0      # minutes of evening/morning screen flats
//! bias_dark = 480.0       # evening bias/dark block
//! morn_bias_dark = 1.5    # morning bias/dark block
//! longest_screen = 1.25   # longest single screen-flat exposure
//! longest_dark = 6.416667 # longest single dark exposure
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use qtty::{Day, Days, Minutes};

use crate::error::{EventsError, EventsResult};

/// Durations of the calibration blocks that bracket the night.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationDurations {
    #[serde(default = "default_screen_flat")]
    pub screen_flat: f64,
    #[serde(default = "default_bias_dark")]
    pub bias_dark: f64,
    #[serde(default = "default_morn_bias_dark")]
    pub morn_bias_dark: f64,
    #[serde(default = "default_longest_screen")]
    pub longest_screen: f64,
    #[serde(default = "default_longest_dark")]
    pub longest_dark: f64,
}

fn default_screen_flat() -> f64 {
    90.0
}

fn default_bias_dark() -> f64 {
    480.0
}

fn default_morn_bias_dark() -> f64 {
    1.5
}

fn default_longest_screen() -> f64 {
    75.0 / 60.0
}

fn default_longest_dark() -> f64 {
    385.0 / 60.0
}

impl Default for CalibrationDurations {
    fn default() -> Self {
        Self {
            screen_flat: default_screen_flat(),
            bias_dark: default_bias_dark(),
            morn_bias_dark: default_morn_bias_dark(),
            longest_screen: default_longest_screen(),
            longest_dark: default_longest_dark(),
        }
    }
}

fn as_days(minutes: f64) -> Days {
    Minutes::new(minutes).to::<Day>()
}

impl CalibrationDurations {
    /// Parse durations from TOML text and validate them.
    pub fn from_toml_str(content: &str) -> EventsResult<Self> {
        let durations: CalibrationDurations = toml::from_str(content).map_err(|e| {
            EventsError::configuration(format!("Failed to parse calibration durations: {}", e))
        })?;
        durations.validate()?;
        Ok(durations)
    }

    /// Load durations from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> EventsResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            EventsError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject negative or non-finite durations.
    pub fn validate(&self) -> EventsResult<()> {
        let fields = [
            ("screen_flat", self.screen_flat),
            ("bias_dark", self.bias_dark),
            ("morn_bias_dark", self.morn_bias_dark),
            ("longest_screen", self.longest_screen),
            ("longest_dark", self.longest_dark),
        ];
        for (name, minutes) in fields {
            if !minutes.is_finite() || minutes < 0.0 {
                return Err(EventsError::configuration(format!(
                    "calibration duration '{name}' must be a non-negative number of minutes, got {minutes}"
                )));
            }
        }
        Ok(())
    }

    pub fn screen_flat(&self) -> Days {
        as_days(self.screen_flat)
    }

    pub fn bias_dark(&self) -> Days {
        as_days(self.bias_dark)
    }

    pub fn morn_bias_dark(&self) -> Days {
        as_days(self.morn_bias_dark)
    }

    pub fn longest_screen(&self) -> Days {
        as_days(self.longest_screen)
    }

    pub fn longest_dark(&self) -> Days {
        as_days(self.longest_dark)
    }
}
