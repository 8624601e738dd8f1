//! 核心错误定义

use thiserror::Error;

/// 几何构造/提取错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Degenerate profile: {0}")]
    DegenerateProfile(String),

    #[error("Non-finite coordinate in {0}")]
    NonFinite(&'static str),

    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    #[error("Object {0} has no extrudable geometry")]
    NotExtrudable(crate::entity::ObjectId),

    #[error("Object {0} not found")]
    ObjectNotFound(crate::entity::ObjectId),
}
