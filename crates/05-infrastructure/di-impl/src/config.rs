//! 容器配置

use di_abstractions::{InjectError, InjectResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

/// 容器运行配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 释放最后一个容器句柄时自动执行销毁回调
    pub destroy_on_drop: bool,
    /// 构建时逐条记录绑定
    pub log_bindings: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            destroy_on_drop: true,
            log_bindings: false,
        }
    }
}

impl ContainerConfig {
    /// 环境变量前缀, 如 `DI_DESTROY_ON_DROP`
    pub const ENV_PREFIX: &'static str = "DI";

    /// 从可选的配置文件加载, 环境变量覆盖文件中的值
    pub fn load(path: impl AsRef<Path>) -> InjectResult<Self> {
        let path = path.as_ref();
        debug!("加载容器配置: {}", path.display());
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix(Self::ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| {
                error!("容器配置构建失败: {}", e);
                InjectError::configuration(format!("容器配置构建失败: {e}"))
            })?;
        settings
            .try_deserialize()
            .map_err(|e| InjectError::configuration(format!("容器配置解析失败: {e}")))
    }
}
