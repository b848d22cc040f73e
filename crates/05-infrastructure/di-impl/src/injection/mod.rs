//! 成员注入器
//!
//! 注入器分两阶段工作: 构建时只记录成员与上下文, 之后的 `provider_check` 为每个依赖查找提供者。
//! 声明为 `Provider<T>` 的依赖不会立即查找, 而是在注入时把 `T` 的提供者本身作为值传入。

mod constructor;
mod executable;
mod field;
mod method;

pub use constructor::ConstructorInjector;
pub use field::FieldInjector;
pub use method::MethodInjector;

use crate::scan;
use di_abstractions::{deferred_value, BindingKey, InjectError, InjectResult, ProviderRef};
use std::sync::Arc;
use tracing::trace;
use type_reflect::{
    raw_type_of, Annotations, ClassId, Instance, MemberId, Modifiers, RawType, TypeContext, TypeDescriptor,
    TypeKind,
};

/// 按绑定键查找提供者
pub type Lookup = Arc<dyn Fn(&BindingKey) -> Option<ProviderRef> + Send + Sync>;

/// 字段或方法注入器
pub trait MemberInjector: Send + Sync {
    /// 向实例注入; 静态成员的实例为 `None`
    fn inject(&self, instance: Option<&Instance>) -> InjectResult<()>;

    /// 查找依赖的提供者, 重复调用不生效
    fn provider_check(&self) -> InjectResult<()>;

    fn declaring_class(&self) -> &ClassId;

    fn is_field(&self) -> bool;

    fn member_id(&self) -> MemberId;
}

/// 已查找的依赖
#[derive(Clone)]
pub(crate) enum Dependency {
    /// 直接注入提供者产出的值, 未绑定时为 `None`
    Direct(Option<ProviderRef>),
    /// 注入时再查找 `key` 的提供者, 把提供者本身作为值
    Deferred(BindingKey),
}

impl Dependency {
    fn lookup(key: BindingKey, deferred: bool, lookup: &Lookup) -> Self {
        if deferred {
            Self::Deferred(key)
        } else {
            Self::Direct(lookup(&key))
        }
    }

    /// 注入时求值
    pub(crate) fn value(&self, lookup: &Lookup) -> InjectResult<Option<Instance>> {
        match self {
            Self::Direct(Some(provider)) => provider.get().map(Some),
            Self::Direct(None) => Ok(None),
            Self::Deferred(key) => Ok(lookup(key).map(deferred_value)),
        }
    }
}

/// 为单个注入元素确定依赖
///
/// `declared` 是元素的声明类型, `resolved` 是它在上下文中解析后的类型。
pub(crate) fn resolve_dependency(
    declared: &TypeDescriptor,
    resolved: TypeDescriptor,
    annotations: &Annotations,
    element: &str,
    lookup: &Lookup,
) -> InjectResult<Dependency> {
    let qualifier = scan::qualifier_of(annotations, element)?;
    let is_provider = matches!(raw_type_of(declared)?, RawType::Class(ref id) if id.is_provider());
    if !is_provider {
        return Ok(Dependency::lookup(BindingKey::new(resolved, qualifier), false, lookup));
    }
    match resolved.kind() {
        TypeKind::Parameterized { args, .. } if !args.is_empty() => Ok(Dependency::lookup(
            BindingKey::new(args[0].clone(), qualifier),
            true,
            lookup,
        )),
        _ => Err(InjectError::configuration(format!(
            "{element} 声明为 Provider 但缺少类型参数"
        ))),
    }
}

/// 成员或其声明类型不是公开的, 需要强制访问
pub(crate) fn forced_access(context: &TypeContext, declaring_class: &ClassId, modifiers: Modifiers, member: &str) -> bool {
    let class_public = context
        .introspector()
        .class(declaring_class)
        .map_or(true, |info| info.modifiers().is_public());
    let forced = !class_public || !modifiers.is_public();
    if forced {
        trace!("强制访问非公开成员: {}", member);
    }
    forced
}
