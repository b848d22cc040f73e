//! 注入器接口

use crate::error::{InjectError, InjectResult};
use crate::keys::BindingKey;
use crate::provider::{downcast, ProviderRef};
use std::any::Any;
use std::sync::Arc;
use type_reflect::{ClassId, Instance, TypeDescriptor};

/// 注入器自身的类型名称, 容器总会绑定它
pub const INJECTOR: &str = "Injector";

/// 注入器类型标识
pub fn injector_class() -> ClassId {
    ClassId::new(INJECTOR)
}

/// 按绑定键查找提供者
pub trait Injector: Send + Sync {
    /// 未绑定时返回 `None`
    fn get_provider(&self, key: &BindingKey) -> Option<ProviderRef>;

    fn get_provider_for(&self, ty: &TypeDescriptor) -> Option<ProviderRef> {
        self.get_provider(&BindingKey::of(ty.clone()))
    }

    fn get_provider_for_class(&self, class: &ClassId) -> Option<ProviderRef> {
        self.get_provider_for(&TypeDescriptor::class(class.clone()))
    }

    /// 获取实例, 未绑定时报错
    fn get_instance(&self, key: &BindingKey) -> InjectResult<Instance> {
        self.get_provider(key)
            .ok_or_else(|| InjectError::not_bound(key))?
            .get()
    }

    fn get_instance_for(&self, ty: &TypeDescriptor) -> InjectResult<Instance> {
        self.get_instance(&BindingKey::of(ty.clone()))
    }

    fn get_instance_for_class(&self, class: &ClassId) -> InjectResult<Instance> {
        self.get_instance_for(&TypeDescriptor::class(class.clone()))
    }

    /// 执行已登记的销毁回调
    fn destroy(&self) -> InjectResult<()>;
}

/// 按类型获取实例
pub trait InjectorExt: Injector {
    fn instance_of<T: Any + Send + Sync>(&self, key: &BindingKey) -> InjectResult<Arc<T>> {
        downcast(self.get_instance(key)?)
    }

    fn instance_of_class<T: Any + Send + Sync>(&self, class: &ClassId) -> InjectResult<Arc<T>> {
        downcast(self.get_instance_for_class(class)?)
    }
}

impl<I: Injector + ?Sized> InjectorExt for I {}
