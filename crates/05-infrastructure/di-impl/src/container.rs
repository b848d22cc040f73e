//! 注入容器

use crate::binding::BindingRecorder;
use crate::config::ContainerConfig;
use crate::injection::{Lookup, MemberInjector};
use crate::providers::{singleton_scope, InstanceProvider, SelfProvider, TransientProvider};
use crate::scan;
use crate::teardown::TeardownList;
use di_abstractions::{
    injector_class, Binder, BindingKey, InjectError, InjectResult, Injector, Module, ProviderKey, ProviderRef,
    ScopeKey, ScopeTag,
};
use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use type_reflect::{raw_type_of, TypeContext, TypeDescriptor, TypeIntrospector, TypeResolver};

/// 容器构建器
pub struct ContainerBuilder {
    introspector: Arc<dyn TypeIntrospector>,
    modules: Vec<Box<dyn Module>>,
    scopes: Vec<ScopeKey>,
    config: ContainerConfig,
}

impl ContainerBuilder {
    pub fn new(introspector: Arc<dyn TypeIntrospector>) -> Self {
        Self {
            introspector,
            modules: Vec::new(),
            scopes: vec![singleton_scope()],
            config: ContainerConfig::default(),
        }
    }

    /// 添加模块, 按添加顺序安装
    pub fn module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// 注册扩展作用域, 排在内置单例作用域之后
    pub fn scope(mut self, scope: ScopeKey) -> Self {
        self.scopes.push(scope);
        self
    }

    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 构建容器
    ///
    /// 安装模块并物化绑定后, 检查全部实例提供者的依赖, 再按继承深度执行静态成员注入。
    pub fn build(self) -> InjectResult<Arc<Container>> {
        let started = Instant::now();
        info!(
            "开始构建注入容器: {} 个模块, {} 个作用域",
            self.modules.len(),
            self.scopes.len()
        );

        let container = Arc::new(Container {
            bindings: OnceCell::new(),
            teardown: TeardownList::new(),
            config: self.config.clone(),
        });
        let weak = Arc::downgrade(&container);
        let lookup: Lookup = Arc::new(move |key: &BindingKey| weak.upgrade().and_then(|c| c.get_provider(key)));

        let mut recorder = BindingRecorder::new();
        recorder
            .bind_class(injector_class())
            .to_provider(Arc::new(SelfProvider::new(Arc::downgrade(&container))));
        for module in &self.modules {
            module.install(&mut recorder);
        }

        let mut graph = ProviderGraph {
            introspector: self.introspector.clone(),
            lookup,
            teardown: container.teardown.clone(),
            scopes: self.scopes,
            providers: HashMap::new(),
            instance_providers: HashMap::new(),
            order: Vec::new(),
        };
        let mut bindings: HashMap<BindingKey, ProviderRef> = HashMap::new();
        for binding in recorder.into_bindings() {
            let key = binding.key();
            let provider = binding.into_provider(|implementation, scope| graph.provider_for(implementation, scope))?;
            if self.config.log_bindings {
                info!("绑定: {}", key);
            }
            if bindings.insert(key.clone(), provider).is_some() {
                warn!("绑定被覆盖, 以最后声明为准: {}", key);
            }
        }
        let binding_count = bindings.len();
        container
            .bindings
            .set(bindings)
            .map_err(|_| InjectError::configuration("容器绑定表只能初始化一次"))?;

        let mut statics = graph.init_providers()?;
        let resolver = TypeResolver::new(self.introspector.as_ref());
        statics.sort_by_cached_key(|member| {
            (resolver.type_hierarchy(member.declaring_class()).len(), !member.is_field())
        });
        for member in &statics {
            member.inject(None)?;
        }

        info!(
            "构建容器完成: {} 个绑定, {} 个实例提供者, {} 个静态成员, 耗时 {:?}",
            binding_count,
            graph.order.len(),
            statics.len(),
            started.elapsed()
        );
        Ok(container)
    }
}

/// 构建期的提供者缓存
struct ProviderGraph {
    introspector: Arc<dyn TypeIntrospector>,
    lookup: Lookup,
    teardown: TeardownList,
    scopes: Vec<ScopeKey>,
    providers: HashMap<ProviderKey, ProviderRef>,
    instance_providers: HashMap<TypeDescriptor, Arc<InstanceProvider>>,
    order: Vec<Arc<InstanceProvider>>,
}

impl ProviderGraph {
    /// 同一实现类型与作用域共享提供者
    fn provider_for(&mut self, implementation: &TypeDescriptor, scope: Option<&ScopeTag>) -> InjectResult<ProviderRef> {
        let key = ProviderKey::new(implementation.clone(), scope.cloned());
        if let Some(provider) = self.providers.get(&key) {
            debug!("复用提供者: {}", key);
            return Ok(provider.clone());
        }
        let instance = self.instance_provider(implementation)?;
        let provider: ProviderRef = match self.provision(implementation, scope) {
            Some(scope_key) => {
                debug!("{} 使用作用域 {}", implementation, scope_key.tag());
                scope_key.apply(instance)
            }
            None => {
                debug!("{} 使用瞬时作用域", implementation);
                Arc::new(TransientProvider::new(instance))
            }
        };
        self.providers.insert(key, provider.clone());
        Ok(provider)
    }

    /// 实现类型声明的作用域优先, 其次是绑定强制的作用域
    fn provision(&self, implementation: &TypeDescriptor, scope: Option<&ScopeTag>) -> Option<&ScopeKey> {
        let declared = raw_type_of(implementation)
            .ok()
            .as_ref()
            .and_then(|raw| raw.as_class())
            .and_then(|id| self.introspector.class(id))
            .map(scan::declared_scopes)
            .unwrap_or_default();
        self.scopes
            .iter()
            .find(|candidate| declared.contains(candidate.tag()))
            .or_else(|| {
                let forced = scope?;
                let found = self.scopes.iter().find(|candidate| candidate.tag() == forced);
                if found.is_none() {
                    debug!("作用域 {} 未注册, 退回瞬时作用域", forced);
                }
                found
            })
    }

    fn instance_provider(&mut self, implementation: &TypeDescriptor) -> InjectResult<Arc<InstanceProvider>> {
        if let Some(provider) = self.instance_providers.get(implementation) {
            return Ok(provider.clone());
        }
        let context = TypeContext::new(implementation.clone(), self.introspector.clone())?;
        let provider = Arc::new(InstanceProvider::new(
            context,
            self.lookup.clone(),
            self.teardown.clone(),
        )?);
        self.instance_providers
            .insert(provider.context().descriptor().clone(), provider.clone());
        self.order.push(provider.clone());
        Ok(provider)
    }

    /// 检查全部实例提供者, 收集去重后的静态成员
    fn init_providers(&self) -> InjectResult<Vec<Arc<dyn MemberInjector>>> {
        let mut seen = HashSet::new();
        let mut statics = Vec::new();
        for provider in &self.order {
            for member in provider.init_providers()? {
                if seen.insert(member.member_id()) {
                    member.provider_check()?;
                    statics.push(member);
                }
            }
        }
        Ok(statics)
    }
}

/// 注入容器
///
/// 绑定表在构建完成后冻结, 之后只读, 可跨线程共享。
pub struct Container {
    bindings: OnceCell<HashMap<BindingKey, ProviderRef>>,
    teardown: TeardownList,
    config: ContainerConfig,
}

impl Container {
    pub fn builder(introspector: Arc<dyn TypeIntrospector>) -> ContainerBuilder {
        ContainerBuilder::new(introspector)
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 已绑定的键
    pub fn binding_keys(&self) -> Vec<BindingKey> {
        self.bindings
            .get()
            .map(|bindings| bindings.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// 待执行的销毁回调数量
    pub fn pending_teardown(&self) -> usize {
        self.teardown.len()
    }
}

impl Injector for Container {
    fn get_provider(&self, key: &BindingKey) -> Option<ProviderRef> {
        self.bindings.get()?.get(key).cloned()
    }

    fn destroy(&self) -> InjectResult<()> {
        let actions = self.teardown.drain();
        if actions.is_empty() {
            return Ok(());
        }
        info!("销毁容器: 执行 {} 个销毁回调", actions.len());
        for action in actions {
            action()?;
        }
        Ok(())
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        if !self.config.destroy_on_drop || self.teardown.is_empty() {
            return;
        }
        warn!("容器释放时仍有 {} 个销毁回调, 自动执行", self.teardown.len());
        if let Err(e) = self.destroy() {
            error!("容器释放时销毁失败: {}", e);
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.bindings.get().map(HashMap::len))
            .field("teardown", &self.teardown)
            .field("config", &self.config)
            .finish()
    }
}

