//! # 咖啡店演示
//!
//! 用注入容器组装一台咖啡机: 具名限定, 单例, 延迟提供者以及生命周期回调。

mod coffee;

use clap::Parser;
use coffee::CoffeeMaker;
use di_abstractions::{Injector, InjectorExt};
use di_impl::{ContainerBuilder, ContainerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use type_reflect::ClassId;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "coffee-shop")]
#[command(about = "Tdi 咖啡店演示")]
struct Args {
    /// 容器配置文件路径
    #[arg(short, long, default_value = "config/container.toml")]
    config: PathBuf,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 冲泡杯数
    #[arg(long, default_value_t = 2)]
    cups: usize,

    /// 咖啡豆
    #[arg(long, default_value = "耶加雪菲")]
    bean: String,

    /// 只输出生效的容器配置
    #[arg(long)]
    dump_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&args.log_level))
        .with_target(false)
        .init();

    let config = ContainerConfig::load(&args.config)?;
    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("启动咖啡店演示");
    let container = ContainerBuilder::new(Arc::new(coffee::registry()?))
        .config(config)
        .module(coffee::module(args.bean.clone()))
        .build()?;

    let maker = container.instance_of_class::<CoffeeMaker>(&ClassId::new(coffee::COFFEE_MAKER))?;
    for _ in 0..args.cups {
        maker.brew()?;
    }
    info!("共冲泡 {} 杯", maker.cups());

    container.destroy()?;
    info!("咖啡店已打烊");
    Ok(())
}

/// 解析日志级别
fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
