//! 类型变量解析
//!
//! 解析依赖 [`TypeIntrospector`] 提供的继承信息: 给定上下文类型 `Box<Integer>`,
//! 父类 `Container<E>` 中声明的 `E` 被解析为 `Integer`。

use crate::class_id::{ClassId, RawType};
use crate::descriptor::{raw_type_of, TypeDescriptor, TypeKind};
use crate::model::{ClassInfo, Executable, MethodInfo, TypeIntrospector, Visibility};

/// 沿继承层次解析类型表达式
#[derive(Clone, Copy)]
pub struct TypeResolver<'a> {
    introspector: &'a dyn TypeIntrospector,
}

impl<'a> TypeResolver<'a> {
    pub fn new(introspector: &'a dyn TypeIntrospector) -> Self {
        Self { introspector }
    }

    pub fn introspector(&self) -> &'a dyn TypeIntrospector {
        self.introspector
    }

    fn class_info(&self, raw: &RawType) -> Option<&'a ClassInfo> {
        raw.as_class().and_then(|id| self.introspector.class(id))
    }

    pub fn is_interface(&self, raw: &RawType) -> bool {
        self.class_info(raw).is_some_and(ClassInfo::is_interface)
    }

    /// 泛型父类; 数组的父类为 `Object`
    pub fn generic_superclass(&self, raw: &RawType) -> Option<TypeDescriptor> {
        match raw {
            RawType::Array(_) => Some(TypeDescriptor::object()),
            RawType::Class(id) => self.introspector.class(id)?.superclass().cloned(),
        }
    }

    pub fn superclass(&self, raw: &RawType) -> Option<RawType> {
        self.generic_superclass(raw)
            .and_then(|generic| raw_type_of(&generic).ok())
    }

    /// 泛型接口, 保持声明顺序
    pub fn generic_interfaces(&self, raw: &RawType) -> &'a [TypeDescriptor] {
        self.class_info(raw).map(ClassInfo::interfaces).unwrap_or_default()
    }

    /// `target` 是否可由 `source` 赋值
    pub fn is_assignable_from(&self, target: &RawType, source: &RawType) -> bool {
        if target == source {
            return true;
        }
        if target.is_primitive() || source.is_primitive() {
            return false;
        }
        if target.is_object() {
            return true;
        }
        match (target, source) {
            (RawType::Array(target), RawType::Array(source)) => {
                !target.is_primitive() && !source.is_primitive() && self.is_assignable_from(target, source)
            }
            (RawType::Array(_), RawType::Class(_)) | (RawType::Class(_), RawType::Array(_)) => false,
            (RawType::Class(_), RawType::Class(_)) => {
                if let Some(superclass) = self.superclass(source) {
                    if self.is_assignable_from(target, &superclass) {
                        return true;
                    }
                }
                self.generic_interfaces(source)
                    .iter()
                    .filter_map(|interface| raw_type_of(interface).ok())
                    .any(|interface| self.is_assignable_from(target, &interface))
            }
        }
    }

    /// `raw` 视角下 `to_resolve` 的泛型形式
    ///
    /// `ty` 是 `raw` 的泛型形式。找不到关联时返回擦除后的 `to_resolve`。
    pub fn generic_supertype(&self, ty: &TypeDescriptor, raw: &RawType, to_resolve: &RawType) -> TypeDescriptor {
        if to_resolve == raw {
            return ty.clone();
        }
        let mut found = None;
        if self.is_interface(to_resolve) {
            found = self.interface_generic_supertype(raw, to_resolve);
        }
        if found.is_none() && !self.is_interface(raw) {
            found = self.hierarchy_generic_supertype(raw, to_resolve);
        }
        found.unwrap_or_else(|| TypeDescriptor::raw(to_resolve.clone()))
    }

    fn interface_generic_supertype(&self, raw: &RawType, to_resolve: &RawType) -> Option<TypeDescriptor> {
        for generic in self.generic_interfaces(raw) {
            let Ok(interface) = raw_type_of(generic) else {
                continue;
            };
            if &interface == to_resolve {
                return Some(generic.clone());
            }
            if self.is_assignable_from(to_resolve, &interface) {
                return Some(self.generic_supertype(generic, &interface, to_resolve));
            }
        }
        None
    }

    fn hierarchy_generic_supertype(&self, raw: &RawType, to_resolve: &RawType) -> Option<TypeDescriptor> {
        let mut current = raw.clone();
        while !current.is_object() {
            let generic = self.generic_superclass(&current)?;
            let superclass = raw_type_of(&generic).ok()?;
            if &superclass == to_resolve {
                return Some(generic);
            }
            if self.is_assignable_from(to_resolve, &superclass) {
                return Some(self.generic_supertype(&generic, &superclass, to_resolve));
            }
            current = superclass;
        }
        None
    }

    /// 解析单个类型变量, 无法关联到上下文时原样返回
    pub fn resolve_type_variable(
        &self,
        ty: &TypeDescriptor,
        raw: &RawType,
        unknown: &TypeDescriptor,
    ) -> TypeDescriptor {
        let TypeKind::Variable(variable) = unknown.kind() else {
            return unknown.clone();
        };
        let Some(declaring) = variable.declaration().declaring_class() else {
            return unknown.clone();
        };
        let declared_by = self.generic_supertype(ty, raw, &RawType::Class(declaring.clone()));
        if let TypeKind::Parameterized { args, .. } = declared_by.kind() {
            let index = self
                .introspector
                .class(declaring)
                .and_then(|info| info.type_parameter_index(variable.name()));
            if let Some(arg) = index.and_then(|index| args.get(index)) {
                return arg.clone();
            }
        }
        unknown.clone()
    }

    /// 在上下文 `ty` (擦除为 `raw`) 中解析 `to_resolve`
    ///
    /// 未发生变化的子表达式原样返回同一个节点。
    pub fn resolve_type(&self, ty: &TypeDescriptor, raw: &RawType, to_resolve: &TypeDescriptor) -> TypeDescriptor {
        let mut current = to_resolve.clone();
        loop {
            match current.kind() {
                TypeKind::Variable(_) => {
                    let resolved = self.resolve_type_variable(ty, raw, &current);
                    if resolved == current {
                        return current;
                    }
                    current = resolved;
                }
                TypeKind::Array(component) => {
                    let new_component = self.resolve_type(ty, raw, component);
                    if TypeDescriptor::ptr_eq(component, &new_component) {
                        return current;
                    }
                    return TypeDescriptor::array_of(new_component);
                }
                TypeKind::Parameterized { owner, raw: class, args } => {
                    let new_owner = owner.as_ref().map(|owner| self.resolve_type(ty, raw, owner));
                    let mut changed = match (owner, &new_owner) {
                        (Some(old), Some(new)) => !TypeDescriptor::ptr_eq(old, new),
                        _ => false,
                    };
                    let new_args: Vec<TypeDescriptor> = args
                        .iter()
                        .map(|arg| {
                            let resolved = self.resolve_type(ty, raw, arg);
                            changed |= !TypeDescriptor::ptr_eq(arg, &resolved);
                            resolved
                        })
                        .collect();
                    if !changed {
                        return current;
                    }
                    return TypeDescriptor::parameterized_unchecked(new_owner, class.clone(), new_args);
                }
                TypeKind::Wildcard { upper, lower } => {
                    if let Some(lower) = lower {
                        let new_lower = self.resolve_type(ty, raw, lower);
                        if TypeDescriptor::ptr_eq(lower, &new_lower) {
                            return current;
                        }
                        return TypeDescriptor::wildcard_unchecked(TypeDescriptor::object(), Some(new_lower));
                    }
                    let new_upper = self.resolve_type(ty, raw, upper);
                    if TypeDescriptor::ptr_eq(upper, &new_upper) {
                        return current;
                    }
                    return TypeDescriptor::wildcard_unchecked(new_upper, None);
                }
                TypeKind::Raw(_) => return current,
            }
        }
    }

    /// 继承链, 根类型在前, 不含 `Object`
    pub fn type_hierarchy(&self, class: &ClassId) -> Vec<ClassId> {
        let mut hierarchy = Vec::new();
        let mut member = Some(class.clone());
        while let Some(current) = member {
            let superclass = self
                .superclass(&RawType::Class(current.clone()))
                .and_then(|raw| raw.as_class().cloned())
                .filter(|id| !id.is_object());
            hierarchy.push(current);
            member = superclass;
        }
        hierarchy.reverse();
        hierarchy
    }

    /// `sub` 是否覆盖 `method`
    pub fn is_override(&self, method: &MethodInfo, sub: &MethodInfo) -> bool {
        if method.name() != sub.name() {
            return false;
        }
        let (Ok(return_raw), Ok(sub_return_raw)) = (raw_type_of(method.return_type()), raw_type_of(sub.return_type()))
        else {
            return false;
        };
        if !self.is_assignable_from(&return_raw, &sub_return_raw) {
            return false;
        }
        if !same_parameter_types(method, sub) {
            return false;
        }
        match method.modifiers().visibility {
            Visibility::Public => sub.modifiers().is_public(),
            Visibility::Protected => matches!(
                sub.modifiers().visibility,
                Visibility::Public | Visibility::Protected
            ),
            Visibility::Private => false,
            Visibility::Package => method.declaring_class().package() == sub.declaring_class().package(),
        }
    }
}

fn same_parameter_types(method: &MethodInfo, sub: &MethodInfo) -> bool {
    let (params, sub_params) = (method.parameters(), sub.parameters());
    params.len() == sub_params.len()
        && params.iter().zip(sub_params).all(|(a, b)| {
            matches!(
                (raw_type_of(a.generic_type()), raw_type_of(b.generic_type())),
                (Ok(x), Ok(y)) if x == y
            )
        })
}
