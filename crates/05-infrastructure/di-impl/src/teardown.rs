//! 销毁回调列表

use di_abstractions::InjectResult;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// 单个销毁回调
pub type TeardownAction = Box<dyn FnOnce() -> InjectResult<()> + Send>;

/// 按构造顺序登记的销毁回调, 取出时最后登记的在前
#[derive(Clone, Default)]
pub struct TeardownList {
    actions: Arc<Mutex<Vec<TeardownAction>>>,
}

impl TeardownList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, action: TeardownAction) {
        self.actions.lock().push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.lock().is_empty()
    }

    /// 取出全部回调, 后进先出
    pub fn drain(&self) -> Vec<TeardownAction> {
        let mut actions = std::mem::take(&mut *self.actions.lock());
        actions.reverse();
        actions
    }
}

impl fmt::Debug for TeardownList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeardownList").field("pending", &self.len()).finish()
    }
}
