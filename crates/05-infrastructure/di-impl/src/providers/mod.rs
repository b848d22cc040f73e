//! 提供者实现

mod instance;
mod scoped;
mod value;

pub use instance::InstanceProvider;
pub use scoped::{singleton_scope, CachedProvider, TransientProvider};
pub use value::InstanceValueProvider;

pub(crate) use value::SelfProvider;
