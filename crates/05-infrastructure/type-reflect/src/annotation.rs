//! 注解值对象
//!
//! 注解按值比较: 类型名称与全部成员值都相同的两个注解相等, 可直接作为绑定键的限定部分。

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 注入点标记
pub const INJECT: &str = "Inject";
/// 名称限定注解
pub const NAMED: &str = "Named";
/// 单例作用域注解
pub const SINGLETON: &str = "Singleton";
/// 构造完成回调标记
pub const POST_CONSTRUCT: &str = "PostConstruct";
/// 销毁前回调标记
pub const PRE_DESTROY: &str = "PreDestroy";

/// 注解在容器中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationRole {
    /// 普通标记
    Marker,
    /// 限定注解, 参与绑定键
    Qualifier,
    /// 作用域注解
    Scope,
}

/// 注解成员值
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for AnnotationValue {
    fn from(value: &str) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<String> for AnnotationValue {
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<bool> for AnnotationValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AnnotationValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// 注解实例
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    annotation_type: Arc<str>,
    role: AnnotationRole,
    members: BTreeMap<Arc<str>, AnnotationValue>,
}

impl Annotation {
    fn with_role(annotation_type: &str, role: AnnotationRole) -> Self {
        Self {
            annotation_type: Arc::from(annotation_type),
            role,
            members: BTreeMap::new(),
        }
    }

    /// 普通标记注解
    pub fn marker(annotation_type: &str) -> Self {
        Self::with_role(annotation_type, AnnotationRole::Marker)
    }

    /// 限定注解
    pub fn qualifier(annotation_type: &str) -> Self {
        Self::with_role(annotation_type, AnnotationRole::Qualifier)
    }

    /// 作用域注解
    pub fn scope(annotation_type: &str) -> Self {
        Self::with_role(annotation_type, AnnotationRole::Scope)
    }

    pub fn inject() -> Self {
        Self::marker(INJECT)
    }

    pub fn post_construct() -> Self {
        Self::marker(POST_CONSTRUCT)
    }

    pub fn pre_destroy() -> Self {
        Self::marker(PRE_DESTROY)
    }

    pub fn singleton() -> Self {
        Self::scope(SINGLETON)
    }

    /// `@Named(value)`
    pub fn named(value: &str) -> Self {
        Self::qualifier(NAMED).with_member("value", value)
    }

    /// 设置成员值
    pub fn with_member(mut self, name: &str, value: impl Into<AnnotationValue>) -> Self {
        self.members.insert(Arc::from(name), value.into());
        self
    }

    pub fn annotation_type(&self) -> &str {
        &self.annotation_type
    }

    pub fn role(&self) -> AnnotationRole {
        self.role
    }

    pub fn member(&self, name: &str) -> Option<&AnnotationValue> {
        self.members.get(name)
    }

    /// 是否为指定类型的注解
    pub fn is(&self, annotation_type: &str) -> bool {
        &*self.annotation_type == annotation_type
    }

    pub fn is_qualifier(&self) -> bool {
        self.role == AnnotationRole::Qualifier
    }

    pub fn is_scope(&self) -> bool {
        self.role == AnnotationRole::Scope
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.annotation_type)?;
        if self.members.is_empty() {
            return Ok(());
        }
        let members: Vec<String> = self
            .members
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        write!(f, "({})", members.join(", "))
    }
}

/// 元素上的注解列表, 保持声明顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    /// 是否带有指定类型的注解
    pub fn has(&self, annotation_type: &str) -> bool {
        self.0.iter().any(|annotation| annotation.is(annotation_type))
    }

    pub fn find(&self, annotation_type: &str) -> Option<&Annotation> {
        self.0.iter().find(|annotation| annotation.is(annotation_type))
    }

    /// 全部限定注解
    pub fn qualifiers(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter().filter(|annotation| annotation.is_qualifier())
    }

    /// 全部作用域注解
    pub fn scopes(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter().filter(|annotation| annotation.is_scope())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Annotation> for Annotations {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
