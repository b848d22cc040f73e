use di_abstractions::{InjectResult, Provider, ProviderRef, ScopeKey, ScopeTag};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::Arc;
use type_reflect::Instance;

/// 每次都构造新实例
pub struct TransientProvider {
    inner: ProviderRef,
}

impl TransientProvider {
    pub fn new(inner: ProviderRef) -> Self {
        Self { inner }
    }
}

impl Provider for TransientProvider {
    fn get(&self) -> InjectResult<Instance> {
        self.inner.get()
    }
}

/// 首次构造后缓存实例
///
/// 检查与构造在同一把锁内完成, 并发调用只会构造一次。锁可重入, 构造过程中经由
/// 延迟工厂回到同一提供者不会死锁; 若重入调用已填充缓存, 以先填充的实例为准。
pub struct CachedProvider {
    inner: ProviderRef,
    slot: ReentrantMutex<RefCell<Option<Instance>>>,
}

impl CachedProvider {
    pub fn new(inner: ProviderRef) -> Self {
        Self {
            inner,
            slot: ReentrantMutex::new(RefCell::new(None)),
        }
    }
}

impl Provider for CachedProvider {
    fn get(&self) -> InjectResult<Instance> {
        let guard = self.slot.lock();
        if let Some(instance) = guard.borrow().as_ref() {
            return Ok(instance.clone());
        }
        let built = self.inner.get()?;
        let mut slot = guard.borrow_mut();
        Ok(slot.get_or_insert(built).clone())
    }
}

/// 内置单例作用域
pub fn singleton_scope() -> ScopeKey {
    ScopeKey::new(ScopeTag::singleton(), |inner| {
        Arc::new(CachedProvider::new(inner)) as ProviderRef
    })
}
