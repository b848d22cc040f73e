use super::{forced_access, resolve_dependency, Dependency, Lookup, MemberInjector};
use di_abstractions::{InjectError, InjectResult};
use once_cell::sync::OnceCell;
use type_reflect::{ClassId, FieldInfo, Instance, MemberId, TypeContext};

/// 写入 `@Inject` 字段
///
/// 依赖未绑定时不写入, 字段保持原值。
pub struct FieldInjector {
    context: TypeContext,
    lookup: Lookup,
    field: FieldInfo,
    forced_access: bool,
    dependency: OnceCell<Dependency>,
}

impl FieldInjector {
    pub fn new(context: TypeContext, lookup: Lookup, field: FieldInfo) -> Self {
        let forced_access = forced_access(&context, field.declaring_class(), field.modifiers(), &field.describe());
        Self {
            context,
            lookup,
            field,
            forced_access,
            dependency: OnceCell::new(),
        }
    }

    pub fn requires_forced_access(&self) -> bool {
        self.forced_access
    }
}

impl MemberInjector for FieldInjector {
    fn inject(&self, instance: Option<&Instance>) -> InjectResult<()> {
        let Some(dependency) = self.dependency.get() else {
            return Ok(());
        };
        let Some(value) = dependency.value(&self.lookup)? else {
            return Ok(());
        };
        self.field
            .set(instance, value)
            .map_err(|source| InjectError::invocation(self.field.describe(), source))
    }

    fn provider_check(&self) -> InjectResult<()> {
        self.dependency.get_or_try_init(|| {
            let resolved = self.context.field_type(&self.field)?;
            resolve_dependency(
                self.field.generic_type(),
                resolved,
                self.field.annotations(),
                &self.field.describe(),
                &self.lookup,
            )
        })?;
        Ok(())
    }

    fn declaring_class(&self) -> &ClassId {
        self.field.declaring_class()
    }

    fn is_field(&self) -> bool {
        true
    }

    fn member_id(&self) -> MemberId {
        self.field.id()
    }
}
