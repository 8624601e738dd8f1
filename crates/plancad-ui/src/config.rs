//! 编辑器配置
//!
//! 所有字段都有默认值，JSON 中只需给出要覆盖的部分。

use crate::error::ConfigError;
use plancad_core::history::DEFAULT_CAPACITY;
use plancad_core::scene::Color;
use plancad_core::snap::SnapConfig;
use serde::{Deserialize, Serialize};

/// 拉伸会话配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrusionConfig {
    /// 最小高度（cm）
    pub min_height: f64,
    /// 高度量化步长（cm）
    pub step: f64,
    /// 每像素对应的高度
    pub pixel_scale: f64,
    /// 预览更新节流（毫秒）
    pub preview_throttle_ms: u64,
}

impl Default for ExtrusionConfig {
    fn default() -> Self {
        Self {
            min_height: 0.1,
            step: 0.1,
            pixel_scale: 0.05,
            preview_throttle_ms: 16,
        }
    }
}

/// 选择高亮配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub color: Color,
    pub emissive_intensity: f32,
    /// 半透明副本的放大倍数
    pub inflate_factor: f64,
    /// 叠加层不透明度
    pub overlay_opacity: f32,
    /// 轮廓边判定的折角（度）
    pub crease_angle_deg: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0xFFA500),
            emissive_intensity: 0.6,
            inflate_factor: 1.02,
            overlay_opacity: 0.35,
            crease_angle_deg: 30.0,
        }
    }
}

/// 编辑器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub extrusion: ExtrusionConfig,
    pub highlight: HighlightConfig,
    pub history_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            extrusion: ExtrusionConfig::default(),
            highlight: HighlightConfig::default(),
            history_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl EditorConfig {
    /// 从 JSON 加载（缺省字段取默认值）
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f64| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{value} must be positive"),
                })
            }
        };
        positive("snap.snap_distance_px", self.snap.snap_distance_px)?;
        positive("snap.distant_snap_distance_px", self.snap.distant_snap_distance_px)?;
        positive("snap.grid_spacing", self.snap.grid_spacing)?;
        positive("extrusion.min_height", self.extrusion.min_height)?;
        positive("extrusion.step", self.extrusion.step)?;
        positive("extrusion.pixel_scale", self.extrusion.pixel_scale)?;
        positive("highlight.inflate_factor", self.highlight.inflate_factor)?;
        if self.history_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_overrides() {
        let config = EditorConfig::from_json(
            r#"{ "snap": { "snap_distance_px": 14.0 }, "history_capacity": 20 }"#,
        )
        .unwrap();

        assert_eq!(config.snap.snap_distance_px, 14.0);
        assert_eq!(config.snap.alignment_tolerance, 0.5);
        assert_eq!(config.extrusion, ExtrusionConfig::default());
        assert_eq!(config.history_capacity, 20);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            EditorConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{ "extrusion": { "step": 0.0 } }"#),
            Err(ConfigError::InvalidValue { field: "extrusion.step", .. })
        ));
    }
}
