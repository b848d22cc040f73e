use super::executable::ExecutableInjector;
use super::{Lookup, MemberInjector};
use di_abstractions::InjectResult;
use type_reflect::{ClassId, Executable, Instance, MemberId, MethodInfo, TypeContext};

/// 以注入参数调用 `@Inject` 方法
pub struct MethodInjector {
    inner: ExecutableInjector<MethodInfo>,
}

impl MethodInjector {
    pub fn new(context: TypeContext, lookup: Lookup, method: MethodInfo) -> Self {
        Self {
            inner: ExecutableInjector::new(context, lookup, method),
        }
    }

    pub fn requires_forced_access(&self) -> bool {
        self.inner.forced_access()
    }
}

impl MemberInjector for MethodInjector {
    fn inject(&self, instance: Option<&Instance>) -> InjectResult<()> {
        let args = self.inner.inject_args()?;
        self.inner
            .executable()
            .invoke(instance, &args)
            .map_err(|source| self.inner.invocation_error(source))
    }

    fn provider_check(&self) -> InjectResult<()> {
        self.inner.provider_check()
    }

    fn declaring_class(&self) -> &ClassId {
        self.inner.executable().declaring_class()
    }

    fn is_field(&self) -> bool {
        false
    }

    fn member_id(&self) -> MemberId {
        self.inner.executable().id()
    }
}
