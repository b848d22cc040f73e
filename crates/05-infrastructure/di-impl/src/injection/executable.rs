use super::{forced_access, resolve_dependency, Dependency, Lookup};
use di_abstractions::{InjectError, InjectResult};
use once_cell::sync::OnceCell;
use type_reflect::{Arguments, Executable, TypeContext};

/// 构造器与方法共用的参数注入
pub(crate) struct ExecutableInjector<E> {
    context: TypeContext,
    lookup: Lookup,
    executable: E,
    forced_access: bool,
    dependencies: OnceCell<Vec<Dependency>>,
}

impl<E: Executable> ExecutableInjector<E> {
    pub(crate) fn new(context: TypeContext, lookup: Lookup, executable: E) -> Self {
        let forced_access = forced_access(
            &context,
            executable.declaring_class(),
            executable.modifiers(),
            &executable.describe(),
        );
        Self {
            context,
            lookup,
            executable,
            forced_access,
            dependencies: OnceCell::new(),
        }
    }

    pub(crate) fn executable(&self) -> &E {
        &self.executable
    }

    pub(crate) fn forced_access(&self) -> bool {
        self.forced_access
    }

    pub(crate) fn provider_check(&self) -> InjectResult<()> {
        self.dependencies.get_or_try_init(|| {
            let types = self.context.parameter_types(&self.executable)?;
            self.executable
                .parameters()
                .iter()
                .zip(types)
                .enumerate()
                .map(|(index, (parameter, resolved))| {
                    let element = format!("{} 的第 {index} 个参数", self.executable.describe());
                    resolve_dependency(
                        parameter.generic_type(),
                        resolved,
                        parameter.annotations(),
                        &element,
                        &self.lookup,
                    )
                })
                .collect::<InjectResult<Vec<_>>>()
        })?;
        Ok(())
    }

    /// 逐个求值依赖
    pub(crate) fn inject_args(&self) -> InjectResult<Arguments> {
        let dependencies = self.dependencies.get().ok_or_else(|| {
            InjectError::configuration(format!("{} 尚未完成依赖检查", self.executable.describe()))
        })?;
        let values = dependencies
            .iter()
            .map(|dependency| dependency.value(&self.lookup))
            .collect::<InjectResult<Vec<_>>>()?;
        Ok(Arguments::new(values))
    }

    pub(crate) fn invocation_error(&self, source: type_reflect::BoxError) -> InjectError {
        InjectError::invocation(self.executable.describe(), source)
    }
}
