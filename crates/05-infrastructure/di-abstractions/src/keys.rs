//! 绑定键与作用域

use crate::provider::ProviderRef;
use std::fmt;
use std::sync::Arc;
use type_reflect::{Annotation, TypeDescriptor, SINGLETON};

/// 绑定键: 类型加可选限定注解
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    ty: TypeDescriptor,
    qualifier: Option<Annotation>,
}

impl BindingKey {
    pub fn new(ty: TypeDescriptor, qualifier: Option<Annotation>) -> Self {
        Self { ty, qualifier }
    }

    /// 无限定的绑定键
    pub fn of(ty: TypeDescriptor) -> Self {
        Self::new(ty, None)
    }

    pub fn qualified(ty: TypeDescriptor, qualifier: Annotation) -> Self {
        Self::new(ty, Some(qualifier))
    }

    /// `@Named(name)` 限定的绑定键
    pub fn named(ty: TypeDescriptor, name: &str) -> Self {
        Self::qualified(ty, Annotation::named(name))
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn qualifier(&self) -> Option<&Annotation> {
        self.qualifier.as_ref()
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{qualifier} {}", self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}

/// 作用域标签, 即作用域注解的类型名称
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeTag(Arc<str>);

impl ScopeTag {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn singleton() -> Self {
        Self::new(SINGLETON)
    }

    /// 作用域注解对应的标签
    pub fn of(annotation: &Annotation) -> Option<Self> {
        annotation
            .is_scope()
            .then(|| Self::new(annotation.annotation_type()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// 提供者缓存键: 实现类型加生效的作用域
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderKey {
    ty: TypeDescriptor,
    scope: Option<ScopeTag>,
}

impl ProviderKey {
    pub fn new(ty: TypeDescriptor, scope: Option<ScopeTag>) -> Self {
        Self { ty, scope }
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn scope(&self) -> Option<&ScopeTag> {
        self.scope.as_ref()
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{} in {scope}", self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}

/// 把原始提供者包装为带作用域的提供者
pub type Provision = Arc<dyn Fn(ProviderRef) -> ProviderRef + Send + Sync>;

/// 作用域注册项
#[derive(Clone)]
pub struct ScopeKey {
    tag: ScopeTag,
    provision: Provision,
}

impl ScopeKey {
    pub fn new<F>(tag: ScopeTag, provision: F) -> Self
    where
        F: Fn(ProviderRef) -> ProviderRef + Send + Sync + 'static,
    {
        Self {
            tag,
            provision: Arc::new(provision),
        }
    }

    pub fn tag(&self) -> &ScopeTag {
        &self.tag
    }

    /// 包装原始提供者
    pub fn apply(&self, provider: ProviderRef) -> ProviderRef {
        (self.provision)(provider)
    }
}

impl fmt::Debug for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeKey").field("tag", &self.tag).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_binding_key_equality() {
        let ty = || TypeDescriptor::list_of(TypeDescriptor::class("String")).unwrap();
        assert_eq!(BindingKey::of(ty()), BindingKey::of(ty()));
        assert_ne!(BindingKey::of(ty()), BindingKey::named(ty(), "primary"));
        assert_eq!(BindingKey::named(ty(), "primary"), BindingKey::named(ty(), "primary"));

        let mut map = HashMap::new();
        map.insert(BindingKey::named(ty(), "primary"), 1);
        assert_eq!(map.get(&BindingKey::named(ty(), "primary")), Some(&1));
        assert_eq!(map.get(&BindingKey::of(ty())), None);
    }

    #[test]
    fn test_scope_tag_from_annotation() {
        assert_eq!(ScopeTag::of(&Annotation::singleton()), Some(ScopeTag::singleton()));
        assert_eq!(ScopeTag::of(&Annotation::named("x")), None);
    }

    #[test]
    fn test_display() {
        let key = BindingKey::named(TypeDescriptor::class("Heater"), "electric");
        assert_eq!(key.to_string(), "@Named(value=electric) Heater");
        let provider_key = ProviderKey::new(TypeDescriptor::class("Heater"), Some(ScopeTag::singleton()));
        assert_eq!(provider_key.to_string(), "Heater in @Singleton");
    }
}
