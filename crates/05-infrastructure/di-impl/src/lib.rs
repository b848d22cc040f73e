//! # 依赖注入具体实现
//!
//! 提供绑定记录、成员注入器、作用域提供者以及注入容器。
//!
//! ## 示例
//!
//! ```
//! use di_abstractions::{Binder, InjectorExt};
//! use di_impl::ContainerBuilder;
//! use std::sync::Arc;
//! use type_reflect::{ClassId, ClassInfo, ClassRegistry, ConstructorInfo};
//!
//! struct Espresso;
//!
//! let mut registry = ClassRegistry::new();
//! registry
//!     .register(ClassInfo::class("shop::Espresso").constructor(ConstructorInfo::no_args(|| Espresso)))
//!     .unwrap();
//!
//! let container = ContainerBuilder::new(Arc::new(registry))
//!     .module(|binder: &mut dyn Binder| {
//!         binder.bind_class(ClassId::new("shop::Espresso"));
//!     })
//!     .build()
//!     .unwrap();
//!
//! let espresso = container.instance_of_class::<Espresso>(&ClassId::new("shop::Espresso"));
//! assert!(espresso.is_ok());
//! ```

pub mod binding;
pub mod config;
pub mod container;
pub mod injection;
pub mod providers;
pub mod scan;
pub mod teardown;

pub use binding::{Binding, BindingRecorder, BindingTarget};
pub use config::ContainerConfig;
pub use container::{Container, ContainerBuilder};
pub use injection::{ConstructorInjector, FieldInjector, Lookup, MemberInjector, MethodInjector};
pub use providers::{singleton_scope, CachedProvider, InstanceProvider, InstanceValueProvider, TransientProvider};
pub use teardown::{TeardownAction, TeardownList};
