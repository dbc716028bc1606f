//! Configuration for segmentation and scheduling
//!
//! Both structs are `#[serde(default)]`, so a JSON document only needs the
//! fields it overrides:
//!
//! ```rust
//! use tangerine::config::SchedulerConfig;
//!
//! let config = SchedulerConfig::from_json_str(r#"{ "tile_size": 32 }"#).unwrap();
//! assert_eq!(config.tile_size, 32);
//! assert_eq!(config.max_trace_steps, 128);
//! ```

use serde::{Deserialize, Serialize};

/// Heap entries reserved per tile when no explicit capacity is set
pub const ENTRIES_PER_TILE: u32 = 20;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON for this struct
    #[error("config parse error: {0}")]
    Parse(String),

    /// A field is out of range
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

/// Segmentation options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Split the clip box on the clipped box's corners before clipping
    pub mutual_clip: bool,
    /// Face-merge boxes of the same cluster
    pub coalesce: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        SegmentConfig {
            mutual_clip: false,
            coalesce: true,
        }
    }
}

impl SegmentConfig {
    /// Parse from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Per-frame scheduler options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Tile edge in pixels
    pub tile_size: u32,
    /// Heap entries drawn per Tally/Draw segment; `tiles * 20` when unset
    pub segment_capacity: Option<u32>,
    /// Sphere-tracing iteration budget
    pub max_trace_steps: u32,
    /// Distance under which a trace counts as a hit
    pub hit_epsilon: f32,
    /// Finite-difference step for normals
    pub normal_epsilon: f32,
    /// Test cluster rects against the previous frame's depth pyramid
    pub occlusion_culling: bool,
    /// Select tiles with the narrower intersection-style bound of plain
    /// unions instead of the evaluation bound
    pub narrow_union_culling: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            tile_size: 16,
            segment_capacity: None,
            max_trace_steps: 128,
            hit_epsilon: 0.001,
            normal_epsilon: 0.001,
            occlusion_culling: false,
            narrow_union_culling: false,
        }
    }
}

impl SchedulerConfig {
    /// Parse from JSON and validate
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SchedulerConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::Invalid {
                field: "tile_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.segment_capacity == Some(0) {
            return Err(ConfigError::Invalid {
                field: "segment_capacity",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_trace_steps == 0 {
            return Err(ConfigError::Invalid {
                field: "max_trace_steps",
                reason: "must be at least 1".into(),
            });
        }
        for (field, value) in [
            ("hit_epsilon", self.hit_epsilon),
            ("normal_epsilon", self.normal_epsilon),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {}", value),
                });
            }
        }
        Ok(())
    }

    /// Number of tiles covering a screen, as (columns, rows)
    pub fn tile_grid(&self, width: u32, height: u32) -> (u32, u32) {
        (
            width.div_ceil(self.tile_size),
            height.div_ceil(self.tile_size),
        )
    }

    /// Heap entries per segment for a screen
    pub fn capacity_for(&self, width: u32, height: u32) -> u32 {
        self.segment_capacity.unwrap_or_else(|| {
            let (tiles_x, tiles_y) = self.tile_grid(width, height);
            (tiles_x * tiles_y * ENTRIES_PER_TILE).max(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = SchedulerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SchedulerConfig::default());

        let seg = SegmentConfig::from_json_str(r#"{ "mutual_clip": true }"#).unwrap();
        assert!(seg.mutual_clip);
        assert!(seg.coalesce);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            SchedulerConfig::from_json_str(r#"{ "tile_size": 0 }"#),
            Err(ConfigError::Invalid { field: "tile_size", .. })
        ));
        assert!(matches!(
            SchedulerConfig::from_json_str(r#"{ "hit_epsilon": -1.0 }"#),
            Err(ConfigError::Invalid { field: "hit_epsilon", .. })
        ));
        assert!(matches!(
            SchedulerConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_default_capacity_matches_tile_count() {
        let config = SchedulerConfig::default();
        assert_eq!(config.tile_grid(1920, 1080), (120, 68));
        assert_eq!(config.capacity_for(1920, 1080), 120 * 68 * 20);

        let fixed = SchedulerConfig {
            segment_capacity: Some(7),
            ..SchedulerConfig::default()
        };
        assert_eq!(fixed.capacity_for(1920, 1080), 7);
    }
}
