//! # Type Reflect
//!
//! 泛型类型描述与基于注册表的类型内省。
//!
//! ## 核心组件
//!
//! - [`TypeDescriptor`] - 不可变的泛型类型表达式
//! - [`TypeResolver`] - 沿继承层次解析类型变量
//! - [`TypeContext`] - 以某个具体类型为上下文解析成员类型
//! - [`ClassRegistry`] - 类型元数据注册表, 替代运行时反射
//!
//! ## 示例
//!
//! ```
//! use type_reflect::{ClassId, ClassInfo, ClassRegistry, TypeDescriptor, TypeContext};
//! use std::sync::Arc;
//!
//! let mut registry = ClassRegistry::new();
//! registry
//!     .register(ClassInfo::class("demo::Holder").type_parameters(["E"]))
//!     .unwrap();
//!
//! let ty = TypeDescriptor::parameterized(
//!     ClassId::new("demo::Holder"),
//!     vec![TypeDescriptor::class("demo::Item")],
//! )
//! .unwrap();
//! let context = TypeContext::new(ty, Arc::new(registry)).unwrap();
//! let element = TypeDescriptor::class_variable("demo::Holder", "E");
//! assert_eq!(context.resolve(&element), TypeDescriptor::class("demo::Item"));
//! ```

pub mod annotation;
pub mod class_id;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod model;
pub mod resolver;

pub use annotation::*;
pub use class_id::*;
pub use context::*;
pub use descriptor::*;
pub use error::*;
pub use model::*;
pub use resolver::*;
