//! 绑定记录

use crate::providers::InstanceValueProvider;
use di_abstractions::{Binder, BindingConfig, BindingKey, InjectResult, ProviderRef, ScopeTag};
use std::fmt;
use std::sync::Arc;
use type_reflect::{Annotation, Instance, TypeDescriptor};

/// 绑定目标
#[derive(Clone)]
pub enum BindingTarget {
    /// 由实现类型构造
    Implementation(TypeDescriptor),
    /// 由自定义提供者产出, 不参与作用域
    Provider(ProviderRef),
}

/// 单条绑定声明, 由 [`BindingConfig`] 链式修改
#[derive(Clone)]
pub struct Binding {
    ty: TypeDescriptor,
    qualifier: Option<Annotation>,
    scope: Option<ScopeTag>,
    target: BindingTarget,
}

impl Binding {
    /// 默认以绑定类型自身为实现
    pub fn new(ty: TypeDescriptor) -> Self {
        Self {
            target: BindingTarget::Implementation(ty.clone()),
            ty,
            qualifier: None,
            scope: None,
        }
    }

    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.ty.clone(), self.qualifier.clone())
    }

    pub fn scope(&self) -> Option<&ScopeTag> {
        self.scope.as_ref()
    }

    pub fn target(&self) -> &BindingTarget {
        &self.target
    }

    /// 生成最终的提供者; 实现类型交给 `build` 按作用域构造
    pub(crate) fn into_provider<F>(self, build: F) -> InjectResult<ProviderRef>
    where
        F: FnOnce(&TypeDescriptor, Option<&ScopeTag>) -> InjectResult<ProviderRef>,
    {
        match &self.target {
            BindingTarget::Provider(provider) => Ok(provider.clone()),
            BindingTarget::Implementation(implementation) => build(implementation, self.scope.as_ref()),
        }
    }
}

impl BindingConfig for Binding {
    fn annotated(&mut self, qualifier: Annotation) -> &mut dyn BindingConfig {
        self.qualifier = Some(qualifier);
        self
    }

    fn scoped(&mut self, scope: ScopeTag) -> &mut dyn BindingConfig {
        self.scope = Some(scope);
        self
    }

    fn to(&mut self, implementation: TypeDescriptor) -> &mut dyn BindingConfig {
        self.target = BindingTarget::Implementation(implementation);
        self
    }

    fn to_provider(&mut self, provider: ProviderRef) -> &mut dyn BindingConfig {
        self.target = BindingTarget::Provider(provider);
        self.scope = None;
        self
    }

    fn to_instance(&mut self, instance: Instance) -> &mut dyn BindingConfig {
        self.to_provider(Arc::new(InstanceValueProvider::new(instance)))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.target {
            BindingTarget::Implementation(implementation) => implementation.to_string(),
            BindingTarget::Provider(_) => "<provider>".to_string(),
        };
        f.debug_struct("Binding")
            .field("key", &self.key().to_string())
            .field("scope", &self.scope)
            .field("target", &target)
            .finish()
    }
}

/// 按声明顺序收集模块中的绑定
#[derive(Debug, Default)]
pub struct BindingRecorder {
    bindings: Vec<Binding>,
}

impl BindingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }
}

impl Binder for BindingRecorder {
    fn bind(&mut self, ty: TypeDescriptor) -> &mut dyn BindingConfig {
        self.bindings.push(Binding::new(ty));
        let index = self.bindings.len() - 1;
        &mut self.bindings[index]
    }
}
