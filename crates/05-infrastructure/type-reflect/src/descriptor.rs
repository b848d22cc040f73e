//! 泛型类型表达式
//!
//! [`TypeDescriptor`] 是不可变、可共享的类型表达式树。相等与哈希按规范化后的结构计算,
//! 因此 `Raw(Foo[])` 与 `Array(Raw(Foo))` 视为同一类型; 解析过程中未发生变化的子树
//! 会原样返回同一个 `Arc`, 可用 [`TypeDescriptor::ptr_eq`] 检测。

use crate::class_id::{ClassId, RawType};
use crate::error::{ReflectError, ReflectResult};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 声明类型变量的泛型结构
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericDeclaration {
    Class(ClassId),
    Method { class: ClassId, name: Arc<str> },
    Constructor(ClassId),
}

impl GenericDeclaration {
    /// 声明该变量的类型, 方法或构造器声明的变量返回 `None`
    pub fn declaring_class(&self) -> Option<&ClassId> {
        match self {
            Self::Class(id) => Some(id),
            Self::Method { .. } | Self::Constructor(_) => None,
        }
    }
}

/// 类型变量
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVariable {
    declaration: GenericDeclaration,
    name: Arc<str>,
}

impl TypeVariable {
    pub fn new(declaration: GenericDeclaration, name: &str) -> Self {
        Self {
            declaration,
            name: Arc::from(name),
        }
    }

    pub fn declaration(&self) -> &GenericDeclaration {
        &self.declaration
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// 类型表达式节点
#[derive(Debug)]
pub enum TypeKind {
    /// 名义类型, 可能是数组类
    Raw(RawType),
    /// 参数化类型 `Raw<A, B>`
    Parameterized {
        owner: Option<TypeDescriptor>,
        raw: ClassId,
        args: Vec<TypeDescriptor>,
    },
    /// 泛型数组 `C[]`
    Array(TypeDescriptor),
    /// 通配符, 下界存在时上界为 `Object`
    Wildcard {
        upper: TypeDescriptor,
        lower: Option<TypeDescriptor>,
    },
    Variable(TypeVariable),
}

/// 不可变的泛型类型表达式
#[derive(Clone)]
pub struct TypeDescriptor(Arc<TypeKind>);

impl TypeDescriptor {
    /// 按原样包装节点, 不做规范化与校验
    pub fn new(kind: TypeKind) -> Self {
        Self(Arc::new(kind))
    }

    pub fn kind(&self) -> &TypeKind {
        &self.0
    }

    /// 两个描述符是否为同一个共享节点
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn raw(raw: RawType) -> Self {
        Self::new(TypeKind::Raw(raw))
    }

    pub fn class(id: impl Into<ClassId>) -> Self {
        Self::raw(RawType::Class(id.into()))
    }

    pub fn object() -> Self {
        Self::class(ClassId::object())
    }

    /// 参数化类型, 拒绝基本类型作为类型参数
    pub fn parameterized(raw: impl Into<ClassId>, args: Vec<TypeDescriptor>) -> ReflectResult<Self> {
        Self::parameterized_with_owner(None, raw, args)
    }

    /// 带外部类型的参数化类型
    pub fn parameterized_with_owner(
        owner: Option<TypeDescriptor>,
        raw: impl Into<ClassId>,
        args: Vec<TypeDescriptor>,
    ) -> ReflectResult<Self> {
        for arg in &args {
            check_not_primitive(arg, "类型参数")?;
        }
        Ok(Self::parameterized_unchecked(
            owner.as_ref().map(canonicalize),
            raw.into(),
            args.iter().map(canonicalize).collect(),
        ))
    }

    pub(crate) fn parameterized_unchecked(
        owner: Option<TypeDescriptor>,
        raw: ClassId,
        args: Vec<TypeDescriptor>,
    ) -> Self {
        Self::new(TypeKind::Parameterized { owner, raw, args })
    }

    /// 泛型数组
    pub fn array_of(component: TypeDescriptor) -> Self {
        Self::new(TypeKind::Array(canonicalize(&component)))
    }

    /// `? extends bound`
    pub fn subtype_of(bound: TypeDescriptor) -> ReflectResult<Self> {
        Self::wildcard(&[bound], &[])
    }

    /// `? super bound`
    pub fn supertype_of(bound: TypeDescriptor) -> ReflectResult<Self> {
        Self::wildcard(&[Self::object()], &[bound])
    }

    /// `?`
    pub fn unbounded() -> Self {
        Self::wildcard_unchecked(Self::object(), None)
    }

    /// 通配符: 恰好一个上界, 至多一个下界, 有下界时上界必须为 `Object`
    pub fn wildcard(uppers: &[TypeDescriptor], lowers: &[TypeDescriptor]) -> ReflectResult<Self> {
        if lowers.len() > 1 {
            return Err(ReflectError::invalid_argument("通配符最多只能有一个下界"));
        }
        let [upper] = uppers else {
            return Err(ReflectError::invalid_argument("通配符必须恰好有一个上界"));
        };
        if let [lower] = lowers {
            check_not_primitive(lower, "通配符下界")?;
            if !upper.is_object() {
                return Err(ReflectError::invalid_argument(format!(
                    "通配符不能同时有上界 {upper} 和下界 {lower}"
                )));
            }
            return Ok(Self::wildcard_unchecked(Self::object(), Some(canonicalize(lower))));
        }
        check_not_primitive(upper, "通配符上界")?;
        Ok(Self::wildcard_unchecked(canonicalize(upper), None))
    }

    pub(crate) fn wildcard_unchecked(upper: TypeDescriptor, lower: Option<TypeDescriptor>) -> Self {
        Self::new(TypeKind::Wildcard { upper, lower })
    }

    /// 类型变量
    pub fn variable(declaration: GenericDeclaration, name: &str) -> Self {
        Self::new(TypeKind::Variable(TypeVariable::new(declaration, name)))
    }

    /// 由类型声明的类型变量
    pub fn class_variable(class: impl Into<ClassId>, name: &str) -> Self {
        Self::variable(GenericDeclaration::Class(class.into()), name)
    }

    pub fn provider_of(ty: TypeDescriptor) -> ReflectResult<Self> {
        Self::parameterized(ClassId::provider(), vec![ty])
    }

    pub fn collection_of(element: TypeDescriptor) -> ReflectResult<Self> {
        Self::parameterized(crate::model::COLLECTION, vec![element])
    }

    pub fn list_of(element: TypeDescriptor) -> ReflectResult<Self> {
        Self::parameterized(crate::model::LIST, vec![element])
    }

    pub fn set_of(element: TypeDescriptor) -> ReflectResult<Self> {
        Self::parameterized(crate::model::SET, vec![element])
    }

    pub fn map_of(key: TypeDescriptor, value: TypeDescriptor) -> ReflectResult<Self> {
        Self::parameterized(crate::model::MAP, vec![key, value])
    }

    /// 参数化类型的类型参数, 其他类型为空
    pub fn type_arguments(&self) -> &[TypeDescriptor] {
        match self.kind() {
            TypeKind::Parameterized { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind(), TypeKind::Raw(raw) if raw.is_object())
    }

    /// 表达式中不含类型变量
    pub fn is_fully_specified(&self) -> bool {
        match self.kind() {
            TypeKind::Raw(_) => true,
            TypeKind::Parameterized { owner, args, .. } => {
                owner.as_ref().map_or(true, Self::is_fully_specified)
                    && args.iter().all(Self::is_fully_specified)
            }
            TypeKind::Array(component) => component.is_fully_specified(),
            TypeKind::Wildcard { upper, lower } => {
                upper.is_fully_specified() && lower.as_ref().map_or(true, Self::is_fully_specified)
            }
            TypeKind::Variable(_) => false,
        }
    }
}

fn check_not_primitive(ty: &TypeDescriptor, usage: &str) -> ReflectResult<()> {
    match ty.kind() {
        TypeKind::Raw(raw) if raw.is_primitive() => Err(ReflectError::invalid_argument(format!(
            "基本类型 {raw} 不能作为{usage}"
        ))),
        _ => Ok(()),
    }
}

fn same(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    TypeDescriptor::ptr_eq(a, b)
}

fn same_opt(a: Option<&TypeDescriptor>, b: Option<&TypeDescriptor>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// 规范化: 数组类改写为泛型数组, 子树递归处理
///
/// 已是规范形式的表达式原样返回同一个节点, 因此该操作是幂等的。
pub fn canonicalize(ty: &TypeDescriptor) -> TypeDescriptor {
    match ty.kind() {
        TypeKind::Raw(RawType::Array(component)) => TypeDescriptor::new(TypeKind::Array(
            canonicalize(&TypeDescriptor::raw((**component).clone())),
        )),
        TypeKind::Raw(RawType::Class(_)) | TypeKind::Variable(_) => ty.clone(),
        TypeKind::Parameterized { owner, raw, args } => {
            let new_owner = owner.as_ref().map(canonicalize);
            let new_args: Vec<TypeDescriptor> = args.iter().map(canonicalize).collect();
            let unchanged = same_opt(owner.as_ref(), new_owner.as_ref())
                && args.iter().zip(&new_args).all(|(a, b)| same(a, b));
            if unchanged {
                ty.clone()
            } else {
                TypeDescriptor::parameterized_unchecked(new_owner, raw.clone(), new_args)
            }
        }
        TypeKind::Array(component) => {
            let new_component = canonicalize(component);
            if same(component, &new_component) {
                ty.clone()
            } else {
                TypeDescriptor::new(TypeKind::Array(new_component))
            }
        }
        TypeKind::Wildcard { upper, lower } => {
            let new_upper = canonicalize(upper);
            let new_lower = lower.as_ref().map(canonicalize);
            if same(upper, &new_upper) && same_opt(lower.as_ref(), new_lower.as_ref()) {
                ty.clone()
            } else {
                TypeDescriptor::wildcard_unchecked(new_upper, new_lower)
            }
        }
    }
}

/// 擦除为运行时名义类型
///
/// 类型变量擦除为 `Object`; 通配符没有对应的名义类型。
pub fn raw_type_of(ty: &TypeDescriptor) -> ReflectResult<RawType> {
    match ty.kind() {
        TypeKind::Raw(raw) => Ok(raw.clone()),
        TypeKind::Parameterized { raw, .. } => Ok(RawType::Class(raw.clone())),
        TypeKind::Array(component) => Ok(RawType::array_of(raw_type_of(component)?)),
        TypeKind::Variable(_) => Ok(RawType::object()),
        TypeKind::Wildcard { .. } => Err(ReflectError::InvalidTypeExpression {
            expression: ty.to_string(),
        }),
    }
}

/// 结构相等
pub fn type_equals(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    same(a, b) || structural_eq(&canonicalize(a), &canonicalize(b))
}

fn structural_eq(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    if same(a, b) {
        return true;
    }
    match (a.kind(), b.kind()) {
        (TypeKind::Raw(x), TypeKind::Raw(y)) => x == y,
        (
            TypeKind::Parameterized {
                owner: owner_a,
                raw: raw_a,
                args: args_a,
            },
            TypeKind::Parameterized {
                owner: owner_b,
                raw: raw_b,
                args: args_b,
            },
        ) => {
            raw_a == raw_b
                && opt_structural_eq(owner_a.as_ref(), owner_b.as_ref())
                && args_a.len() == args_b.len()
                && args_a.iter().zip(args_b).all(|(x, y)| structural_eq(x, y))
        }
        (TypeKind::Array(x), TypeKind::Array(y)) => structural_eq(x, y),
        (
            TypeKind::Wildcard {
                upper: upper_a,
                lower: lower_a,
            },
            TypeKind::Wildcard {
                upper: upper_b,
                lower: lower_b,
            },
        ) => structural_eq(upper_a, upper_b) && opt_structural_eq(lower_a.as_ref(), lower_b.as_ref()),
        (TypeKind::Variable(x), TypeKind::Variable(y)) => x == y,
        _ => false,
    }
}

fn opt_structural_eq(a: Option<&TypeDescriptor>, b: Option<&TypeDescriptor>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => structural_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// 与 [`type_equals`] 一致的结构哈希
pub fn type_hash(ty: &TypeDescriptor) -> u64 {
    let mut hasher = DefaultHasher::new();
    ty.hash(&mut hasher);
    hasher.finish()
}

fn hash_canonical<H: Hasher>(ty: &TypeDescriptor, state: &mut H) {
    match ty.kind() {
        TypeKind::Raw(raw) => {
            0u8.hash(state);
            raw.hash(state);
        }
        TypeKind::Parameterized { owner, raw, args } => {
            1u8.hash(state);
            raw.hash(state);
            owner.is_some().hash(state);
            if let Some(owner) = owner {
                hash_canonical(owner, state);
            }
            args.len().hash(state);
            for arg in args {
                hash_canonical(arg, state);
            }
        }
        TypeKind::Array(component) => {
            2u8.hash(state);
            hash_canonical(component, state);
        }
        TypeKind::Wildcard { upper, lower } => {
            3u8.hash(state);
            hash_canonical(upper, state);
            lower.is_some().hash(state);
            if let Some(lower) = lower {
                hash_canonical(lower, state);
            }
        }
        TypeKind::Variable(variable) => {
            4u8.hash(state);
            variable.hash(state);
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        type_equals(self, other)
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_canonical(&canonicalize(self), state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TypeKind::Raw(raw) => write!(f, "{raw}"),
            TypeKind::Parameterized { raw, args, .. } => {
                write!(f, "{raw}")?;
                if args.is_empty() {
                    return Ok(());
                }
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "<{}>", args.join(", "))
            }
            TypeKind::Array(component) => write!(f, "{component}[]"),
            TypeKind::Wildcard { upper, lower } => match lower {
                Some(lower) => write!(f, "? super {lower}"),
                None if upper.is_object() => f.write_str("?"),
                None => write!(f, "? extends {upper}"),
            },
            TypeKind::Variable(variable) => f.write_str(variable.name()),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string() -> TypeDescriptor {
        TypeDescriptor::class("String")
    }

    #[test]
    fn test_structural_equality() {
        let a = TypeDescriptor::list_of(string()).unwrap();
        let b = TypeDescriptor::list_of(string()).unwrap();
        assert!(!TypeDescriptor::ptr_eq(&a, &b));
        assert_eq!(a, b);
        assert_eq!(type_hash(&a), type_hash(&b));

        let c = TypeDescriptor::list_of(TypeDescriptor::class("Integer")).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_array_class_equals_generic_array() {
        let array_class = TypeDescriptor::raw(RawType::array_of(RawType::class("Foo")));
        let generic_array = TypeDescriptor::array_of(TypeDescriptor::class("Foo"));
        assert_eq!(array_class, generic_array);
        assert_eq!(type_hash(&array_class), type_hash(&generic_array));
        assert!(matches!(canonicalize(&array_class).kind(), TypeKind::Array(_)));
    }

    #[test]
    fn test_canonicalize_idempotent() {
        let nested = TypeDescriptor::parameterized(
            "Map",
            vec![
                TypeDescriptor::raw(RawType::array_of(RawType::array_of(RawType::class("int")))),
                string(),
            ],
        )
        .unwrap();
        let once = canonicalize(&nested);
        let twice = canonicalize(&once);
        assert!(TypeDescriptor::ptr_eq(&once, &twice));
        assert_eq!(once.to_string(), "Map<int[][], String>");
    }

    #[test]
    fn test_canonical_input_is_returned_as_is() {
        let list = TypeDescriptor::list_of(string()).unwrap();
        assert!(TypeDescriptor::ptr_eq(&list, &canonicalize(&list)));
    }

    #[test]
    fn test_wildcard_validation() {
        assert!(TypeDescriptor::wildcard(&[], &[]).is_err());
        assert!(TypeDescriptor::wildcard(&[string(), string()], &[]).is_err());
        assert!(TypeDescriptor::wildcard(&[TypeDescriptor::object()], &[string(), string()]).is_err());
        assert!(TypeDescriptor::wildcard(&[string()], &[string()]).is_err());
        assert!(TypeDescriptor::subtype_of(TypeDescriptor::class("int")).is_err());
        assert!(TypeDescriptor::supertype_of(TypeDescriptor::class("long")).is_err());

        let lower = TypeDescriptor::supertype_of(string()).unwrap();
        assert_eq!(lower.to_string(), "? super String");
        let upper = TypeDescriptor::subtype_of(string()).unwrap();
        assert_eq!(upper.to_string(), "? extends String");
        assert_eq!(TypeDescriptor::unbounded().to_string(), "?");
        assert_eq!(TypeDescriptor::subtype_of(TypeDescriptor::object()).unwrap(), TypeDescriptor::unbounded());
    }

    #[test]
    fn test_primitive_type_argument_rejected() {
        let err = TypeDescriptor::list_of(TypeDescriptor::class("int")).unwrap_err();
        assert!(matches!(err, ReflectError::InvalidArgument { .. }));
        assert!(TypeDescriptor::list_of(TypeDescriptor::raw(RawType::array_of(RawType::class("int")))).is_ok());
    }

    #[test]
    fn test_raw_type_of() {
        let list = TypeDescriptor::list_of(string()).unwrap();
        assert_eq!(raw_type_of(&list).unwrap(), RawType::class("List"));

        let generic_array = TypeDescriptor::array_of(list);
        assert_eq!(
            raw_type_of(&generic_array).unwrap(),
            RawType::array_of(RawType::class("List"))
        );

        let variable = TypeDescriptor::class_variable("Box", "E");
        assert_eq!(raw_type_of(&variable).unwrap(), RawType::object());

        let err = raw_type_of(&TypeDescriptor::unbounded()).unwrap_err();
        assert!(matches!(err, ReflectError::InvalidTypeExpression { .. }));
    }

    #[test]
    fn test_fully_specified() {
        let variable = TypeDescriptor::class_variable("Box", "E");
        assert!(!variable.is_fully_specified());
        assert!(!TypeDescriptor::list_of(variable.clone()).unwrap().is_fully_specified());
        assert!(!TypeDescriptor::array_of(variable).is_fully_specified());
        assert!(TypeDescriptor::list_of(string()).unwrap().is_fully_specified());
    }

    #[test]
    fn test_variables_compare_by_declaration() {
        let a = TypeDescriptor::class_variable("Box", "E");
        let b = TypeDescriptor::class_variable("Box", "E");
        let c = TypeDescriptor::class_variable("Pair", "E");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "E");
    }
}
