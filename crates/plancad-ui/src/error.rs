//! 交互层错误定义

use plancad_core::entity::ObjectId;
use thiserror::Error;

/// 高亮叠加层构造失败
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HighlightError {
    #[error("Object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("Object {0} has no geometry to derive an overlay from")]
    MissingGeometry(ObjectId),

    #[error("No feature edges on object {0}")]
    NoEdges(ObjectId),

    #[error("Material of object {0} has no emissive channel")]
    UnsupportedMaterial(ObjectId),
}

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
