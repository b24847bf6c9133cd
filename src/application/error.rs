//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{AudioStorageError, JoinError, TtsError};
use crate::domain::ExtractError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 业务规则违反
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    /// 文档解析错误
    #[error("Document error: {0}")]
    DocumentError(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 音频处理错误
    #[error("Audio error: {0}")]
    AudioError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建业务规则违反错误
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation(message.into())
    }
}

impl From<ExtractError> for ApplicationError {
    fn from(err: ExtractError) -> Self {
        Self::DocumentError(err.to_string())
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        Self::ExternalServiceError(err.to_string())
    }
}

impl From<JoinError> for ApplicationError {
    fn from(err: JoinError) -> Self {
        match err {
            JoinError::External(msg) => Self::ExternalServiceError(msg),
            JoinError::Empty => Self::BusinessRuleViolation(err.to_string()),
            JoinError::UnsupportedFormat(_) => Self::ValidationError(err.to_string()),
            _ => Self::AudioError(err.to_string()),
        }
    }
}

impl From<AudioStorageError> for ApplicationError {
    fn from(err: AudioStorageError) -> Self {
        match err {
            AudioStorageError::FileNotFound(name) => Self::not_found("Audio", name),
            AudioStorageError::InvalidName(name) => {
                Self::ValidationError(format!("Invalid file name: {}", name))
            }
            AudioStorageError::IoError(msg) => Self::StorageError(msg),
        }
    }
}
