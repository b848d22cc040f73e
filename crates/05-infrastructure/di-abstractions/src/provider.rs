//! 提供者接口

use crate::error::{InjectError, InjectResult};
use std::any::{type_name, Any};
use std::sync::Arc;
use type_reflect::{Arguments, Instance};

/// 按需产出实例
pub trait Provider: Send + Sync {
    fn get(&self) -> InjectResult<Instance>;
}

/// 共享的提供者
pub type ProviderRef = Arc<dyn Provider>;

impl<F> Provider for F
where
    F: Fn() -> InjectResult<Instance> + Send + Sync,
{
    fn get(&self) -> InjectResult<Instance> {
        self()
    }
}

/// 按类型取出实例
pub trait ProviderExt {
    fn get_as<T: Any + Send + Sync>(&self) -> InjectResult<Arc<T>>;
}

impl<P: Provider + ?Sized> ProviderExt for P {
    fn get_as<T: Any + Send + Sync>(&self) -> InjectResult<Arc<T>> {
        downcast(self.get()?)
    }
}

/// 向下转型实例
pub fn downcast<T: Any + Send + Sync>(instance: Instance) -> InjectResult<Arc<T>> {
    instance.downcast::<T>().map_err(|_| InjectError::TypeMismatch {
        expected: type_name::<T>().to_string(),
    })
}

/// 把提供者包装为可注入的延迟工厂值
pub fn deferred_value(provider: ProviderRef) -> Instance {
    Arc::new(provider)
}

/// 从注入值中取回延迟工厂
pub fn deferred(value: Instance) -> InjectResult<ProviderRef> {
    downcast::<ProviderRef>(value).map(|provider| (*provider).clone())
}

/// 从参数中读取延迟工厂
pub trait DeferredExt {
    /// 第 `index` 个参数的延迟工厂, 缺失时报错
    fn deferred(&self, index: usize) -> InjectResult<ProviderRef>;
}

impl DeferredExt for Arguments {
    fn deferred(&self, index: usize) -> InjectResult<ProviderRef> {
        let provider = self.get::<ProviderRef>(index)?;
        Ok((*provider).clone())
    }
}
