use crate::injection::{ConstructorInjector, FieldInjector, Lookup, MemberInjector, MethodInjector};
use crate::scan;
use crate::teardown::TeardownList;
use di_abstractions::{InjectError, InjectResult, Provider};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use type_reflect::{
    Arguments, Executable, FieldInfo, Instance, MethodInfo, RawType, ReflectError, TypeContext, TypeResolver, INJECT,
};

/// 按实现类型构造并注入实例
///
/// 构造顺序: 构造器注入, 按继承层次从根到叶依次注入字段与方法, 调用 post-construct,
/// 最后把 pre-destroy 登记到容器的销毁列表。
pub struct InstanceProvider {
    context: TypeContext,
    constructor: ConstructorInjector,
    static_members: Vec<Arc<dyn MemberInjector>>,
    members: Vec<Arc<dyn MemberInjector>>,
    post_construct: Option<MethodInfo>,
    pre_destroy: Option<MethodInfo>,
    teardown: TeardownList,
}

impl InstanceProvider {
    pub fn new(context: TypeContext, lookup: Lookup, teardown: TeardownList) -> InjectResult<Self> {
        let class_id = match context.raw_type() {
            RawType::Class(id) => id.clone(),
            RawType::Array(_) => {
                return Err(InjectError::configuration(format!(
                    "无法实例化数组类型 {}",
                    context.descriptor()
                )))
            }
        };
        let introspector = context.introspector().clone();
        let class = introspector.class(&class_id).ok_or_else(|| ReflectError::UnknownClass {
            class: class_id.to_string(),
        })?;
        if class.is_interface() {
            return Err(InjectError::configuration(format!(
                "{class_id} 是接口, 需要绑定到实现类型或提供者"
            )));
        }

        let constructor = ConstructorInjector::new(context.clone(), lookup.clone(), scan::select_constructor(class)?);

        let resolver = TypeResolver::new(introspector.as_ref());
        let hierarchy = resolver.type_hierarchy(&class_id);
        let mut fields: Vec<Vec<FieldInfo>> = Vec::with_capacity(hierarchy.len());
        let mut methods: Vec<Vec<MethodInfo>> = Vec::with_capacity(hierarchy.len());
        for id in &hierarchy {
            let level = introspector.class(id);
            fields.push(level.map(scan::inject_fields).unwrap_or_default());
            methods.push(level.map(|info| info.methods().to_vec()).unwrap_or_default());
        }
        remove_overridden(&resolver, &mut methods);
        for level in &mut methods {
            level.retain(|method| method.annotations().has(INJECT));
        }

        let mut static_members: Vec<Arc<dyn MemberInjector>> = Vec::new();
        let mut members: Vec<Arc<dyn MemberInjector>> = Vec::new();
        for (level_fields, level_methods) in fields.into_iter().zip(methods) {
            for field in level_fields {
                let is_static = field.modifiers().is_static;
                let injector: Arc<dyn MemberInjector> =
                    Arc::new(FieldInjector::new(context.clone(), lookup.clone(), field));
                if is_static {
                    static_members.push(injector);
                } else {
                    members.push(injector);
                }
            }
            for method in level_methods {
                let is_static = method.modifiers().is_static;
                let injector: Arc<dyn MemberInjector> =
                    Arc::new(MethodInjector::new(context.clone(), lookup.clone(), method));
                if is_static {
                    static_members.push(injector);
                } else {
                    members.push(injector);
                }
            }
        }

        let post_construct = scan::post_construct_method(class)?;
        let pre_destroy = scan::pre_destroy_method(class)?;
        debug!(
            "创建实例提供者: {} (实例成员 {}, 静态成员 {})",
            context.descriptor(),
            members.len(),
            static_members.len()
        );

        Ok(Self {
            context,
            constructor,
            static_members,
            members,
            post_construct,
            pre_destroy,
            teardown,
        })
    }

    pub fn context(&self) -> &TypeContext {
        &self.context
    }

    /// 检查构造器与实例成员的依赖, 返回待容器统一处理的静态成员
    pub fn init_providers(&self) -> InjectResult<Vec<Arc<dyn MemberInjector>>> {
        self.constructor.provider_check()?;
        for member in &self.members {
            member.provider_check()?;
        }
        Ok(self.static_members.clone())
    }

    fn invoke_hook(method: &MethodInfo, instance: &Instance) -> InjectResult<()> {
        method
            .invoke(Some(instance), &Arguments::empty())
            .map_err(|source| InjectError::invocation(method.describe(), source))
    }
}

/// 从派生类向根类遍历, 去掉被更派生的方法覆盖的方法
fn remove_overridden(resolver: &TypeResolver<'_>, methods: &mut [Vec<MethodInfo>]) {
    let mut included: Vec<MethodInfo> = Vec::new();
    for level in methods.iter_mut().rev() {
        level.retain(|method| {
            let overridden = included.iter().any(|sub| resolver.is_override(method, sub));
            if !overridden {
                included.push(method.clone());
            }
            !overridden
        });
    }
}

impl Provider for InstanceProvider {
    fn get(&self) -> InjectResult<Instance> {
        let instance = self.constructor.inject()?;
        for member in &self.members {
            member.inject(Some(&instance))?;
        }
        if let Some(post_construct) = &self.post_construct {
            Self::invoke_hook(post_construct, &instance)?;
        }
        if let Some(pre_destroy) = &self.pre_destroy {
            let method = pre_destroy.clone();
            let target = instance.clone();
            self.teardown
                .register(Box::new(move || Self::invoke_hook(&method, &target)));
        }
        Ok(instance)
    }
}

impl fmt::Debug for InstanceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceProvider")
            .field("type", &self.context.descriptor())
            .field("members", &self.members.len())
            .field("static_members", &self.static_members.len())
            .field("post_construct", &self.post_construct.as_ref().map(MethodInfo::name))
            .field("pre_destroy", &self.pre_destroy.as_ref().map(MethodInfo::name))
            .finish()
    }
}
