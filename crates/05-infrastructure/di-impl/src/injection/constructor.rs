use super::executable::ExecutableInjector;
use super::Lookup;
use di_abstractions::InjectResult;
use type_reflect::{ConstructorInfo, Instance, TypeContext};

/// 以注入参数调用构造器
pub struct ConstructorInjector {
    inner: ExecutableInjector<ConstructorInfo>,
}

impl ConstructorInjector {
    pub fn new(context: TypeContext, lookup: Lookup, constructor: ConstructorInfo) -> Self {
        Self {
            inner: ExecutableInjector::new(context, lookup, constructor),
        }
    }

    pub fn provider_check(&self) -> InjectResult<()> {
        self.inner.provider_check()
    }

    /// 创建新实例
    pub fn inject(&self) -> InjectResult<Instance> {
        let args = self.inner.inject_args()?;
        self.inner
            .executable()
            .instantiate(&args)
            .map_err(|source| self.inner.invocation_error(source))
    }

    pub fn requires_forced_access(&self) -> bool {
        self.inner.forced_access()
    }
}
