//! 错误类型定义

use thiserror::Error;
use type_reflect::{BoxError, ReflectError};

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum InjectError {
    #[error("注入配置错误: {message}")]
    Configuration { message: String },

    #[error("类型解析失败: {source}")]
    Reflect {
        #[from]
        source: ReflectError,
    },

    #[error("调用 {member} 失败: {source}")]
    Invocation { member: String, source: BoxError },

    #[error("未找到绑定: {key}")]
    NotBound { key: String },

    #[error("实例类型不匹配, 期望 {expected}")]
    TypeMismatch { expected: String },
}

impl InjectError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 包装成员调用失败
    pub fn invocation(member: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Invocation {
            member: member.into(),
            source: source.into(),
        }
    }

    pub fn not_bound(key: &impl std::fmt::Display) -> Self {
        Self::NotBound {
            key: key.to_string(),
        }
    }
}

/// 依赖注入结果
pub type InjectResult<T> = Result<T, InjectError>;
