//! 错误类型定义

use thiserror::Error;

/// 类型内省与解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReflectError {
    #[error("不支持的类型表达式: {expression}")]
    InvalidTypeExpression { expression: String },

    #[error("参数无效: {message}")]
    InvalidArgument { message: String },

    #[error("{member} 不是由 {context} 的父类型声明的")]
    NotSupertype { member: String, context: String },

    #[error("类型未注册: {class}")]
    UnknownClass { class: String },

    #[error("类型重复注册: {class}")]
    DuplicateClass { class: String },

    #[error("缺少第 {index} 个注入参数")]
    MissingArgument { index: usize },

    #[error("第 {index} 个参数类型不匹配, 期望 {expected}")]
    ArgumentTypeMismatch { index: usize, expected: String },
}

impl ReflectError {
    /// 构造参数无效错误
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// 类型内省结果
pub type ReflectResult<T> = Result<T, ReflectError>;
