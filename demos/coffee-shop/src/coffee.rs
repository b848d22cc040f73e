//! 咖啡机组件与类型登记

use di_abstractions::{Binder, DeferredExt, InjectResult, ProviderExt, ProviderRef, ScopeTag};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;
use type_reflect::{
    Annotation, ClassId, ClassInfo, ClassRegistry, ConstructorInfo, FieldInfo, Instance, MethodInfo, ParameterInfo,
    ReflectResult, TypeDescriptor,
};

pub const COFFEE_LOG: &str = "coffee::CoffeeLog";
pub const HEATER: &str = "coffee::Heater";
pub const ELECTRIC_HEATER: &str = "coffee::ElectricHeater";
pub const PUMP: &str = "coffee::Pump";
pub const THERMOSIPHON: &str = "coffee::Thermosiphon";
pub const COFFEE_MAKER: &str = "coffee::CoffeeMaker";
pub const BEAN: &str = "coffee::Bean";

/// 冲泡记录, 全店共用一份
#[derive(Default)]
pub struct CoffeeLog {
    lines: Mutex<Vec<String>>,
}

impl CoffeeLog {
    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        info!("{}", line);
        self.lines.lock().push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

pub struct ElectricHeater {
    log: Arc<CoffeeLog>,
    heating: AtomicBool,
}

impl ElectricHeater {
    pub fn on(&self) {
        self.heating.store(true, Ordering::SeqCst);
        self.log.log("~ ~ ~ 加热中 ~ ~ ~");
    }

    pub fn off(&self) {
        self.heating.store(false, Ordering::SeqCst);
    }

    pub fn is_hot(&self) -> bool {
        self.heating.load(Ordering::SeqCst)
    }
}

pub struct Thermosiphon {
    log: Arc<CoffeeLog>,
    heater: Arc<ElectricHeater>,
}

impl Thermosiphon {
    pub fn pump(&self) {
        if self.heater.is_hot() {
            self.log.log("=> => 泵水中 => =>");
        }
    }
}

pub struct CoffeeMaker {
    log: Arc<CoffeeLog>,
    heater: Arc<ElectricHeater>,
    pump: ProviderRef,
    bean: Mutex<Option<Arc<String>>>,
    cups: AtomicUsize,
}

impl CoffeeMaker {
    /// 冲一杯; 每杯向提供者要一台新的泵
    pub fn brew(&self) -> InjectResult<()> {
        self.heater.on();
        self.pump.get_as::<Thermosiphon>()?.pump();
        let bean = self
            .bean
            .lock()
            .as_ref()
            .map_or_else(|| "拼配".to_string(), |bean| bean.to_string());
        self.log.log(format!(" [_]P 咖啡 ({bean}) [_]P "));
        self.heater.off();
        self.cups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn cups(&self) -> usize {
        self.cups.load(Ordering::SeqCst)
    }
}

fn class(name: &str) -> TypeDescriptor {
    TypeDescriptor::class(name)
}

fn electric() -> Annotation {
    Annotation::named("electric")
}

/// 登记全部咖啡机类型
pub fn registry() -> ReflectResult<ClassRegistry> {
    let mut registry = ClassRegistry::new();

    registry.register(
        ClassInfo::class(COFFEE_LOG)
            .annotated(Annotation::singleton())
            .constructor(ConstructorInfo::no_args(CoffeeLog::default))
            .method(
                MethodInfo::instance::<CoffeeLog, _>("open", Vec::new(), |log, _| {
                    log.log("记录本已打开");
                    Ok(())
                })
                .annotated(Annotation::post_construct()),
            )
            .method(
                MethodInfo::instance::<CoffeeLog, _>("close", Vec::new(), |log, _| {
                    info!("记录本合上, 共 {} 行", log.lines().len());
                    Ok(())
                })
                .annotated(Annotation::pre_destroy()),
            ),
    )?;

    registry.register(ClassInfo::interface(HEATER))?;
    registry.register(
        ClassInfo::class(ELECTRIC_HEATER)
            .implements(class(HEATER))
            .annotated(Annotation::singleton())
            .constructor(
                ConstructorInfo::new(vec![ParameterInfo::new(class(COFFEE_LOG))], |args| {
                    Ok(Arc::new(ElectricHeater {
                        log: args.get::<CoffeeLog>(0)?,
                        heating: AtomicBool::new(false),
                    }) as Instance)
                })
                .annotated(Annotation::inject()),
            ),
    )?;

    registry.register(ClassInfo::interface(PUMP))?;
    registry.register(
        ClassInfo::class(THERMOSIPHON).implements(class(PUMP)).constructor(
            ConstructorInfo::new(
                vec![
                    ParameterInfo::new(class(COFFEE_LOG)),
                    ParameterInfo::new(class(HEATER)).annotated(electric()),
                ],
                |args| {
                    Ok(Arc::new(Thermosiphon {
                        log: args.get::<CoffeeLog>(0)?,
                        heater: args.get::<ElectricHeater>(1)?,
                    }) as Instance)
                },
            )
            .annotated(Annotation::inject()),
        ),
    )?;

    registry.register(
        ClassInfo::class(COFFEE_MAKER)
            .constructor(
                ConstructorInfo::new(
                    vec![
                        ParameterInfo::new(class(COFFEE_LOG)),
                        ParameterInfo::new(class(HEATER)).annotated(electric()),
                        ParameterInfo::new(TypeDescriptor::provider_of(class(PUMP))?),
                    ],
                    |args| {
                        Ok(Arc::new(CoffeeMaker {
                            log: args.get::<CoffeeLog>(0)?,
                            heater: args.get::<ElectricHeater>(1)?,
                            pump: args.deferred(2)?,
                            bean: Mutex::new(None),
                            cups: AtomicUsize::new(0),
                        }) as Instance)
                    },
                )
                .annotated(Annotation::inject()),
            )
            .field(
                FieldInfo::instance::<CoffeeMaker, String, _>("bean", class(BEAN), |maker, bean| {
                    *maker.bean.lock() = Some(bean);
                })
                .annotated(Annotation::inject())
                .annotated(Annotation::named("house")),
            )
            .method(
                MethodInfo::static_method("open_shop", vec![ParameterInfo::new(class(COFFEE_LOG))], |args| {
                    args.get::<CoffeeLog>(0)?.log("咖啡店开张");
                    Ok(())
                })
                .annotated(Annotation::inject()),
            )
            .method(
                MethodInfo::instance::<CoffeeMaker, _>("clean", Vec::new(), |maker, _| {
                    maker.log.log(format!("清洗咖啡机, 今日 {} 杯", maker.cups()));
                    Ok(())
                })
                .annotated(Annotation::pre_destroy()),
            ),
    )?;

    Ok(registry)
}

/// 咖啡店的绑定声明
pub fn module(bean: String) -> impl Fn(&mut dyn Binder) + Send + Sync {
    move |binder: &mut dyn Binder| {
        binder.bind_class(ClassId::new(COFFEE_LOG));
        binder
            .bind_class(ClassId::new(HEATER))
            .named("electric")
            .to_class(ClassId::new(ELECTRIC_HEATER));
        binder
            .bind_class(ClassId::new(PUMP))
            .to_class(ClassId::new(THERMOSIPHON));
        binder
            .bind_class(ClassId::new(COFFEE_MAKER))
            .scoped(ScopeTag::singleton());
        binder
            .bind_class(ClassId::new(BEAN))
            .named("house")
            .to_instance(Arc::new(bean.clone()));
    }
}
