//! 注入点扫描

use di_abstractions::{InjectError, InjectResult, ScopeTag};
use type_reflect::{
    Annotation, Annotations, ClassInfo, ConstructorInfo, Executable, FieldInfo, MethodInfo, INJECT,
    POST_CONSTRUCT, PRE_DESTROY,
};

/// 选择构造器: 唯一的 `@Inject` 构造器, 没有时退回无参构造器
pub fn select_constructor(class: &ClassInfo) -> InjectResult<ConstructorInfo> {
    let mut annotated = class
        .constructors()
        .iter()
        .filter(|constructor| constructor.annotations().has(INJECT));
    match (annotated.next(), annotated.next()) {
        (Some(constructor), None) => Ok(constructor.clone()),
        (Some(_), Some(_)) => Err(InjectError::configuration(format!(
            "{} 上有多个 @Inject 构造器",
            class.id()
        ))),
        (None, _) => class
            .constructors()
            .iter()
            .find(|constructor| constructor.parameters().is_empty())
            .cloned()
            .ok_or_else(|| {
                InjectError::configuration(format!(
                    "{} 既没有 @Inject 构造器也没有无参构造器",
                    class.id()
                ))
            }),
    }
}

/// 带 `@Inject` 的字段, 保持声明顺序
pub fn inject_fields(class: &ClassInfo) -> Vec<FieldInfo> {
    class
        .fields()
        .iter()
        .filter(|field| field.annotations().has(INJECT))
        .cloned()
        .collect()
}

pub fn post_construct_method(class: &ClassInfo) -> InjectResult<Option<MethodInfo>> {
    single_lifecycle_method(class, POST_CONSTRUCT)
}

pub fn pre_destroy_method(class: &ClassInfo) -> InjectResult<Option<MethodInfo>> {
    single_lifecycle_method(class, PRE_DESTROY)
}

/// 只看实现类型自身声明的方法, 至多一个且不能带参数
fn single_lifecycle_method(class: &ClassInfo, annotation: &str) -> InjectResult<Option<MethodInfo>> {
    let mut found: Option<&MethodInfo> = None;
    for method in class.methods() {
        if !method.annotations().has(annotation) {
            continue;
        }
        if !method.parameters().is_empty() {
            return Err(InjectError::configuration(format!(
                "{} 上的 @{annotation} 方法 {} 不能带参数",
                class.id(),
                method.name()
            )));
        }
        if let Some(previous) = found {
            return Err(InjectError::configuration(format!(
                "{} 上有多个 @{annotation} 方法: {}, {}",
                class.id(),
                previous.name(),
                method.name()
            )));
        }
        found = Some(method);
    }
    Ok(found.cloned())
}

/// 元素上的限定注解, 多于一个时报错
pub fn qualifier_of(annotations: &Annotations, element: &str) -> InjectResult<Option<Annotation>> {
    let mut qualifiers = annotations.qualifiers();
    match (qualifiers.next(), qualifiers.next()) {
        (Some(_), Some(_)) => Err(InjectError::configuration(format!(
            "{element} 上有多个限定注解"
        ))),
        (qualifier, _) => Ok(qualifier.cloned()),
    }
}

/// 类型上声明的作用域
pub fn declared_scopes(class: &ClassInfo) -> Vec<ScopeTag> {
    class.annotations().scopes().filter_map(ScopeTag::of).collect()
}
