use crate::container::Container;
use di_abstractions::{InjectError, InjectResult, Provider};
use std::sync::{Arc, Weak};
use type_reflect::Instance;

/// 始终返回同一实例
pub struct InstanceValueProvider {
    instance: Instance,
}

impl InstanceValueProvider {
    pub fn new(instance: Instance) -> Self {
        Self { instance }
    }
}

impl Provider for InstanceValueProvider {
    fn get(&self) -> InjectResult<Instance> {
        Ok(self.instance.clone())
    }
}

/// 容器自身的绑定, 弱引用避免循环持有
pub(crate) struct SelfProvider {
    container: Weak<Container>,
}

impl SelfProvider {
    pub(crate) fn new(container: Weak<Container>) -> Self {
        Self { container }
    }
}

impl Provider for SelfProvider {
    fn get(&self) -> InjectResult<Instance> {
        let container = self
            .container
            .upgrade()
            .ok_or_else(|| InjectError::configuration("容器已释放"))?;
        Ok(container as Instance)
    }
}
