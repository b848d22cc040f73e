//! 模块与绑定声明接口

use crate::keys::ScopeTag;
use crate::provider::ProviderRef;
use type_reflect::{Annotation, ClassId, Instance, TypeDescriptor};

/// 单条绑定的链式配置
///
/// `to_provider` 与 `to_instance` 会清除已设置的实现类型与作用域; 之后再调用 `scoped` 不生效。
pub trait BindingConfig {
    /// 设置限定注解
    fn annotated(&mut self, qualifier: Annotation) -> &mut dyn BindingConfig;

    /// `@Named(name)` 限定
    fn named(&mut self, name: &str) -> &mut dyn BindingConfig {
        self.annotated(Annotation::named(name))
    }

    /// 强制作用域
    fn scoped(&mut self, scope: ScopeTag) -> &mut dyn BindingConfig;

    /// 由实现类型构造
    fn to(&mut self, implementation: TypeDescriptor) -> &mut dyn BindingConfig;

    fn to_class(&mut self, implementation: ClassId) -> &mut dyn BindingConfig {
        self.to(TypeDescriptor::class(implementation))
    }

    /// 由自定义提供者产出
    fn to_provider(&mut self, provider: ProviderRef) -> &mut dyn BindingConfig;

    /// 始终返回同一实例
    fn to_instance(&mut self, instance: Instance) -> &mut dyn BindingConfig;
}

/// 绑定声明入口
pub trait Binder {
    fn bind(&mut self, ty: TypeDescriptor) -> &mut dyn BindingConfig;

    fn bind_class(&mut self, class: ClassId) -> &mut dyn BindingConfig {
        self.bind(TypeDescriptor::class(class))
    }
}

/// 一组绑定声明
pub trait Module: Send + Sync {
    fn install(&self, binder: &mut dyn Binder);
}

impl<F> Module for F
where
    F: Fn(&mut dyn Binder) + Send + Sync,
{
    fn install(&self, binder: &mut dyn Binder) {
        self(binder);
    }
}
