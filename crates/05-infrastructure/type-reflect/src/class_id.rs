//! 类型标识

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

/// 顶层类型名称
pub const OBJECT: &str = "Object";
/// 延迟工厂契约名称
pub const PROVIDER: &str = "Provider";
/// 空返回类型名称
pub const VOID: &str = "void";

const PRIMITIVES: [&str; 9] = [
    "boolean", "byte", "short", "char", "int", "long", "float", "double", VOID,
];

static OBJECT_ID: Lazy<ClassId> = Lazy::new(|| ClassId::new(OBJECT));
static PROVIDER_ID: Lazy<ClassId> = Lazy::new(|| ClassId::new(PROVIDER));
static VOID_ID: Lazy<ClassId> = Lazy::new(|| ClassId::new(VOID));

/// 名义类型标识, 以 `::` 分隔模块路径
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(Arc<str>);

impl ClassId {
    /// 创建类型标识
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// 顶层类型
    pub fn object() -> Self {
        OBJECT_ID.clone()
    }

    /// 延迟工厂契约
    pub fn provider() -> Self {
        PROVIDER_ID.clone()
    }

    /// 空返回类型
    pub fn void() -> Self {
        VOID_ID.clone()
    }

    /// 完整名称
    pub fn name(&self) -> &str {
        &self.0
    }

    /// 去掉模块前缀后的名称
    pub fn simple_name(&self) -> &str {
        self.0.rsplit_once("::").map_or(&*self.0, |(_, name)| name)
    }

    /// 模块前缀, 顶层类型返回空串
    pub fn package(&self) -> &str {
        self.0.rsplit_once("::").map_or("", |(package, _)| package)
    }

    pub fn is_object(&self) -> bool {
        &*self.0 == OBJECT
    }

    pub fn is_provider(&self) -> bool {
        &*self.0 == PROVIDER
    }

    /// 是否为基本类型 (含 `void`)
    pub fn is_primitive(&self) -> bool {
        PRIMITIVES.contains(&&*self.0)
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ClassId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&ClassId> for ClassId {
    fn from(id: &ClassId) -> Self {
        id.clone()
    }
}

/// 运行时名义类型: 类或数组
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawType {
    Class(ClassId),
    Array(Box<RawType>),
}

impl RawType {
    pub fn class(id: impl Into<ClassId>) -> Self {
        Self::Class(id.into())
    }

    pub fn object() -> Self {
        Self::Class(ClassId::object())
    }

    /// 以 `component` 为元素的数组类型
    pub fn array_of(component: RawType) -> Self {
        Self::Array(Box::new(component))
    }

    pub fn as_class(&self) -> Option<&ClassId> {
        match self {
            Self::Class(id) => Some(id),
            Self::Array(_) => None,
        }
    }

    /// 数组元素类型
    pub fn component(&self) -> Option<&RawType> {
        match self {
            Self::Array(component) => Some(component),
            Self::Class(_) => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn is_object(&self) -> bool {
        self.as_class().is_some_and(ClassId::is_object)
    }

    pub fn is_primitive(&self) -> bool {
        self.as_class().is_some_and(ClassId::is_primitive)
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(id) => write!(f, "{id}"),
            Self::Array(component) => write!(f, "{component}[]"),
        }
    }
}

impl From<ClassId> for RawType {
    fn from(id: ClassId) -> Self {
        Self::Class(id)
    }
}
