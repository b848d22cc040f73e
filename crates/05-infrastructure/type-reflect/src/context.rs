//! 以具体类型为上下文的成员类型解析

use crate::class_id::{ClassId, RawType};
use crate::descriptor::{canonicalize, raw_type_of, TypeDescriptor};
use crate::error::{ReflectError, ReflectResult};
use crate::model::{Executable, FieldInfo, MethodInfo, TypeIntrospector};
use crate::resolver::TypeResolver;
use std::fmt;
use std::sync::Arc;

/// 已规范化的类型描述及其擦除类型
///
/// 成员类型在此上下文中解析: 对 `IntBox` 而言, `Box<E>` 上声明的 `E value` 字段类型为 `Integer`。
#[derive(Clone)]
pub struct TypeContext {
    descriptor: TypeDescriptor,
    raw: RawType,
    introspector: Arc<dyn TypeIntrospector>,
}

impl TypeContext {
    /// 通配符没有擦除类型, 无法作为上下文
    pub fn new(descriptor: TypeDescriptor, introspector: Arc<dyn TypeIntrospector>) -> ReflectResult<Self> {
        let descriptor = canonicalize(&descriptor);
        let raw = raw_type_of(&descriptor)?;
        Ok(Self {
            descriptor,
            raw,
            introspector,
        })
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn raw_type(&self) -> &RawType {
        &self.raw
    }

    pub fn introspector(&self) -> &Arc<dyn TypeIntrospector> {
        &self.introspector
    }

    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(self.introspector.as_ref())
    }

    /// 解析声明类型
    pub fn resolve(&self, declared: &TypeDescriptor) -> TypeDescriptor {
        canonicalize(&self.resolver().resolve_type(&self.descriptor, &self.raw, declared))
    }

    /// 父类型在此上下文中的泛型形式
    pub fn supertype(&self, supertype: &RawType) -> ReflectResult<TypeDescriptor> {
        let resolver = self.resolver();
        if !resolver.is_assignable_from(supertype, &self.raw) {
            return Err(ReflectError::invalid_argument(format!(
                "{supertype} 不是 {} 的父类型",
                self.descriptor
            )));
        }
        let generic = resolver.generic_supertype(&self.descriptor, &self.raw, supertype);
        Ok(self.resolve(&generic))
    }

    pub fn field_type(&self, field: &FieldInfo) -> ReflectResult<TypeDescriptor> {
        self.check_declared_by_supertype(field.declaring_class(), || field.describe())?;
        Ok(self.resolve(field.generic_type()))
    }

    pub fn return_type(&self, method: &MethodInfo) -> ReflectResult<TypeDescriptor> {
        self.check_declared_by_supertype(method.declaring_class(), || method.describe())?;
        Ok(self.resolve(method.return_type()))
    }

    /// 构造器或方法的参数类型
    pub fn parameter_types(&self, executable: &dyn Executable) -> ReflectResult<Vec<TypeDescriptor>> {
        self.check_declared_by_supertype(executable.declaring_class(), || executable.describe())?;
        Ok(executable
            .parameters()
            .iter()
            .map(|parameter| self.resolve(parameter.generic_type()))
            .collect())
    }

    fn check_declared_by_supertype(
        &self,
        declaring_class: &ClassId,
        describe: impl FnOnce() -> String,
    ) -> ReflectResult<()> {
        let declaring = RawType::Class(declaring_class.clone());
        if self.resolver().is_assignable_from(&declaring, &self.raw) {
            Ok(())
        } else {
            Err(ReflectError::NotSupertype {
                member: describe(),
                context: self.descriptor.to_string(),
            })
        }
    }
}

impl fmt::Debug for TypeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeContext")
            .field("descriptor", &self.descriptor)
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassInfo, ClassRegistry, ConstructorInfo, ParameterInfo};

    struct Boxed;

    fn registry() -> Arc<ClassRegistry> {
        let element = TypeDescriptor::class_variable("Box", "E");
        let mut registry = ClassRegistry::new();
        registry
            .register(
                ClassInfo::class("Box")
                    .type_parameters(["E"])
                    .field(FieldInfo::new("value", element.clone(), |_, _| Ok(())))
                    .method(MethodInfo::new("get", Vec::new(), |_, _| Ok(())).returns(element.clone()))
                    .constructor(ConstructorInfo::new(vec![ParameterInfo::new(element)], |_| {
                        Ok(Arc::new(Boxed) as crate::model::Instance)
                    })),
            )
            .unwrap();
        registry
            .register(
                ClassInfo::class("IntBox")
                    .extends(TypeDescriptor::parameterized("Box", vec![TypeDescriptor::class("Integer")]).unwrap()),
            )
            .unwrap();
        registry.register(ClassInfo::class("Unrelated")).unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_member_types_resolve_in_context() {
        let registry = registry();
        let context = TypeContext::new(TypeDescriptor::class("IntBox"), registry.clone()).unwrap();
        let info = registry.class(&ClassId::new("Box")).unwrap();

        let integer = TypeDescriptor::class("Integer");
        assert_eq!(context.field_type(&info.fields()[0]).unwrap(), integer);
        assert_eq!(context.return_type(&info.methods()[0]).unwrap(), integer);
        assert_eq!(context.parameter_types(&info.constructors()[0]).unwrap(), vec![integer]);
        assert_eq!(
            context.supertype(&RawType::class("Box")).unwrap().to_string(),
            "Box<Integer>"
        );
    }

    #[test]
    fn test_member_from_unrelated_type_is_rejected() {
        let registry = registry();
        let context = TypeContext::new(TypeDescriptor::class("Unrelated"), registry.clone()).unwrap();
        let info = registry.class(&ClassId::new("Box")).unwrap();

        let err = context.field_type(&info.fields()[0]).unwrap_err();
        assert!(matches!(err, ReflectError::NotSupertype { .. }));
        assert!(context.supertype(&RawType::class("Box")).is_err());
    }

    #[test]
    fn test_wildcard_cannot_be_context() {
        let err = TypeContext::new(TypeDescriptor::unbounded(), registry()).unwrap_err();
        assert!(matches!(err, ReflectError::InvalidTypeExpression { .. }));
    }
}
