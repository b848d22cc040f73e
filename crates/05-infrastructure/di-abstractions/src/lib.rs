//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义绑定声明与实例获取的核心接口。
//!
//! ## 核心接口
//!
//! - [`Provider`] - 按需产出实例的工厂
//! - [`Injector`] - 按绑定键查找提供者的容器视图
//! - [`Module`] / [`Binder`] / [`BindingConfig`] - 绑定声明
//! - [`BindingKey`] / [`ScopeKey`] - 绑定键与作用域扩展点

pub mod error;
pub mod injector;
pub mod keys;
pub mod module;
pub mod provider;

pub use error::*;
pub use injector::*;
pub use keys::*;
pub use module::*;
pub use provider::*;
