//! 注入容器的集中集成测试
use anyhow::Result;
use di_abstractions::{Binder, BindingKey, DeferredExt, Injector, InjectorExt, ProviderExt, ProviderRef};
use di_impl::{Container, ContainerBuilder};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;
use std::time::Duration;
use type_reflect::{
    canonicalize, Annotation, ClassId, ClassInfo, ClassRegistry, ConstructorInfo, FieldInfo, Instance, MethodInfo,
    ParameterInfo, TypeDescriptor, Visibility,
};

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init()
            .ok(); // 忽略初始化失败的错误
    });
}

fn class(name: &str) -> TypeDescriptor {
    TypeDescriptor::class(name)
}

fn build(registry: ClassRegistry, module: impl Fn(&mut dyn Binder) + Send + Sync + 'static) -> Result<Arc<Container>> {
    init_test_logger();
    Ok(ContainerBuilder::new(Arc::new(registry)).module(module).build()?)
}

/// 泛型容器, 字段类型是类型变量 `E`
#[derive(Default)]
struct Cell {
    value: Mutex<Option<Instance>>,
}

impl Cell {
    fn value<T: std::any::Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.value.lock().clone()?.downcast::<T>().ok()
    }
}

fn cell_classes(registry: &mut ClassRegistry) {
    registry
        .register(
            ClassInfo::class("shop::Cell")
                .type_parameters(["E"])
                .constructor(ConstructorInfo::no_args(Cell::default))
                .field(
                    FieldInfo::new("value", TypeDescriptor::class_variable("shop::Cell", "E"), |target, value| {
                        let cell = target
                            .and_then(|target| target.downcast_ref::<Cell>())
                            .ok_or("接收者不是 Cell")?;
                        *cell.value.lock() = Some(value);
                        Ok(())
                    })
                    .annotated(Annotation::inject()),
                ),
        )
        .unwrap();
    registry
        .register(
            ClassInfo::class("shop::CountCell")
                .extends(TypeDescriptor::parameterized("shop::Cell", vec![class("shop::Count")]).unwrap())
                .constructor(ConstructorInfo::no_args(Cell::default)),
        )
        .unwrap();
}

#[test]
fn test_descriptors_compare_structurally() {
    let a = TypeDescriptor::list_of(class("shop::Label")).unwrap();
    let b = TypeDescriptor::list_of(class("shop::Label")).unwrap();
    assert_eq!(a, b);
    assert!(!TypeDescriptor::ptr_eq(&a, &b));

    let set: HashSet<TypeDescriptor> = [a.clone(), b].into_iter().collect();
    assert_eq!(set.len(), 1);

    let canonical = canonicalize(&a);
    assert!(TypeDescriptor::ptr_eq(&canonicalize(&canonical), &canonical));
    assert_ne!(a, TypeDescriptor::set_of(class("shop::Label")).unwrap());
}

#[test]
fn test_type_variable_fields_follow_the_binding() -> Result<()> {
    let mut registry = ClassRegistry::new();
    cell_classes(&mut registry);

    let container = build(registry, |binder| {
        binder.bind_class(ClassId::new("shop::Label")).to_instance(Arc::new("latte".to_string()));
        binder.bind_class(ClassId::new("shop::Count")).to_instance(Arc::new(2_i64));
        let label_cell = TypeDescriptor::parameterized("shop::Cell", vec![class("shop::Label")]);
        if let Ok(label_cell) = label_cell {
            binder.bind(label_cell);
        }
        binder.bind_class(ClassId::new("shop::CountCell"));
    })?;

    // 独立构造的等价描述符也能命中绑定
    let key = BindingKey::of(TypeDescriptor::parameterized("shop::Cell", vec![class("shop::Label")])?);
    let label_cell = container.instance_of::<Cell>(&key)?;
    assert_eq!(label_cell.value::<String>().as_deref().map(String::as_str), Some("latte"));

    let count_cell = container.instance_of_class::<Cell>(&ClassId::new("shop::CountCell"))?;
    assert_eq!(count_cell.value::<i64>().as_deref(), Some(&2));
    Ok(())
}

struct Roaster;

fn counting_class(name: &str, counter: &Arc<AtomicUsize>, singleton: bool) -> ClassInfo {
    let counter = counter.clone();
    let mut builder = ClassInfo::class(name).constructor(ConstructorInfo::no_args(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(5));
        Roaster
    }));
    if singleton {
        builder = builder.annotated(Annotation::singleton());
    }
    builder.build()
}

#[test]
fn test_singleton_and_transient() -> Result<()> {
    let singletons = Arc::new(AtomicUsize::new(0));
    let transients = Arc::new(AtomicUsize::new(0));
    let mut registry = ClassRegistry::new();
    registry.register(counting_class("shop::Roaster", &singletons, true))?;
    registry.register(counting_class("shop::Grinder", &transients, false))?;

    let container = build(registry, |binder| {
        binder.bind_class(ClassId::new("shop::Roaster"));
        binder.bind_class(ClassId::new("shop::Grinder"));
    })?;

    let roaster = ClassId::new("shop::Roaster");
    let first = container.get_instance_for_class(&roaster)?;
    let second = container.get_instance_for_class(&roaster)?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(singletons.load(Ordering::SeqCst), 1);

    let grinder = ClassId::new("shop::Grinder");
    let first = container.get_instance_for_class(&grinder)?;
    let second = container.get_instance_for_class(&grinder)?;
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(transients.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_singleton_is_created_once_under_contention() -> Result<()> {
    let created = Arc::new(AtomicUsize::new(0));
    let mut registry = ClassRegistry::new();
    registry.register(counting_class("shop::Roaster", &created, true))?;
    let container = build(registry, |binder| {
        binder.bind_class(ClassId::new("shop::Roaster"));
    })?;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let container = container.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            container.get_instance_for_class(&ClassId::new("shop::Roaster"))
        }));
    }
    let mut instances = Vec::new();
    for handle in handles {
        instances.push(handle.await??);
    }

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert!(instances.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    Ok(())
}

struct HeaterUnit {
    kind: &'static str,
}

struct Kitchen {
    primary: Arc<HeaterUnit>,
    secondary: Arc<HeaterUnit>,
}

#[test]
fn test_named_qualifiers_select_implementations() -> Result<()> {
    let mut registry = ClassRegistry::new();
    registry.register(ClassInfo::interface("shop::Heater"))?;
    for (name, kind) in [("shop::ElectricHeater", "electric"), ("shop::GasHeater", "gas")] {
        registry.register(
            ClassInfo::class(name)
                .implements(class("shop::Heater"))
                .constructor(ConstructorInfo::no_args(move || HeaterUnit { kind })),
        )?;
    }
    registry.register(
        ClassInfo::class("shop::Kitchen").constructor(
            ConstructorInfo::new(
                vec![
                    ParameterInfo::new(class("shop::Heater")).annotated(Annotation::named("primary")),
                    ParameterInfo::new(class("shop::Heater")).annotated(Annotation::named("secondary")),
                ],
                |args| {
                    Ok(Arc::new(Kitchen {
                        primary: args.get::<HeaterUnit>(0)?,
                        secondary: args.get::<HeaterUnit>(1)?,
                    }) as Instance)
                },
            )
            .annotated(Annotation::inject()),
        ),
    )?;

    let container = build(registry, |binder| {
        binder
            .bind_class(ClassId::new("shop::Heater"))
            .named("primary")
            .to_class(ClassId::new("shop::ElectricHeater"));
        binder
            .bind_class(ClassId::new("shop::Heater"))
            .named("secondary")
            .to_class(ClassId::new("shop::GasHeater"));
        binder.bind_class(ClassId::new("shop::Kitchen"));
    })?;

    let kitchen = container.instance_of_class::<Kitchen>(&ClassId::new("shop::Kitchen"))?;
    assert_eq!(kitchen.primary.kind, "electric");
    assert_eq!(kitchen.secondary.kind, "gas");
    assert!(container.get_instance_for_class(&ClassId::new("shop::Heater")).is_err());
    Ok(())
}

#[derive(Default)]
struct Order {
    barista: Mutex<Option<ProviderRef>>,
}

struct Barista {
    order: Arc<Order>,
}

#[test]
fn test_provider_dependency_breaks_cycle() -> Result<()> {
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassInfo::class("shop::Order")
            .annotated(Annotation::singleton())
            .constructor(ConstructorInfo::no_args(Order::default))
            .field(
                FieldInfo::instance::<Order, ProviderRef, _>(
                    "barista",
                    TypeDescriptor::provider_of(class("shop::Barista"))?,
                    |order, provider| *order.barista.lock() = Some((*provider).clone()),
                )
                .annotated(Annotation::inject()),
            ),
    )?;
    registry.register(
        ClassInfo::class("shop::Barista").constructor(
            ConstructorInfo::new(vec![ParameterInfo::new(class("shop::Order"))], |args| {
                Ok(Arc::new(Barista {
                    order: args.get::<Order>(0)?,
                }) as Instance)
            })
            .annotated(Annotation::inject()),
        ),
    )?;

    let container = build(registry, |binder| {
        binder.bind_class(ClassId::new("shop::Order"));
        binder.bind_class(ClassId::new("shop::Barista"));
    })?;

    let order = container.instance_of_class::<Order>(&ClassId::new("shop::Order"))?;
    let provider = order.barista.lock().clone().expect("Provider<Barista> 未注入");
    let barista = provider.get_as::<Barista>()?;
    assert!(Arc::ptr_eq(&barista.order, &order));

    // 每次调用都取得新的瞬时实例
    let again = provider.get_as::<Barista>()?;
    assert!(!Arc::ptr_eq(&barista, &again));
    Ok(())
}

#[derive(Default)]
struct Cup {
    saucer: Mutex<Option<ProviderRef>>,
}

struct Saucer {
    cup: ProviderRef,
}

#[test]
fn test_mutual_provider_dependencies() -> Result<()> {
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassInfo::class("shop::Cup")
            .constructor(ConstructorInfo::no_args(Cup::default))
            .field(
                FieldInfo::instance::<Cup, ProviderRef, _>(
                    "saucer",
                    TypeDescriptor::provider_of(class("shop::Saucer"))?,
                    |cup, provider| *cup.saucer.lock() = Some((*provider).clone()),
                )
                .annotated(Annotation::inject()),
            ),
    )?;
    registry.register(
        ClassInfo::class("shop::Saucer").constructor(
            ConstructorInfo::new(
                vec![ParameterInfo::new(TypeDescriptor::provider_of(class("shop::Cup"))?)],
                |args| {
                    Ok(Arc::new(Saucer {
                        cup: args.deferred(0)?,
                    }) as Instance)
                },
            )
            .annotated(Annotation::inject()),
        ),
    )?;

    let container = build(registry, |binder| {
        binder.bind_class(ClassId::new("shop::Cup"));
        binder.bind_class(ClassId::new("shop::Saucer"));
    })?;

    let cup = container.instance_of_class::<Cup>(&ClassId::new("shop::Cup"))?;
    let saucer = cup
        .saucer
        .lock()
        .clone()
        .expect("Provider<Saucer> 未注入")
        .get_as::<Saucer>()?;
    let next_cup = saucer.cup.get_as::<Cup>()?;
    assert!(next_cup.saucer.lock().is_some());
    Ok(())
}

struct Machine;

type Log = Arc<Mutex<Vec<String>>>;

fn step(name: &str, owner: &str, visibility: Visibility, inject: bool, log: &Log) -> MethodInfo {
    let log = log.clone();
    let event = format!("{owner}.{name}");
    let method = MethodInfo::instance::<Machine, _>(name, Vec::new(), move |_, _| {
        log.lock().push(event.clone());
        Ok(())
    })
    .visibility(visibility);
    if inject {
        method.annotated(Annotation::inject())
    } else {
        method
    }
}

#[test]
fn test_overridden_methods_are_injected_once() -> Result<()> {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassInfo::class("shop::Machine")
            .constructor(ConstructorInfo::no_args(|| Machine))
            .method(step("calibrate", "Machine", Visibility::Public, true, &log))
            .method(step("warm", "Machine", Visibility::Public, true, &log))
            .method(step("clean", "Machine", Visibility::Private, true, &log))
            .method(step("descale", "Machine", Visibility::Package, true, &log)),
    )?;
    registry.register(
        ClassInfo::class("cafe::Espresso")
            .extends(class("shop::Machine"))
            .constructor(ConstructorInfo::no_args(|| Machine))
            .method(step("calibrate", "Espresso", Visibility::Public, false, &log))
            .method(step("warm", "Espresso", Visibility::Public, true, &log))
            .method(step("clean", "Espresso", Visibility::Public, true, &log))
            .method(step("descale", "Espresso", Visibility::Package, true, &log)),
    )?;

    let container = build(registry, |binder| {
        binder.bind_class(ClassId::new("cafe::Espresso"));
    })?;
    container.get_instance_for_class(&ClassId::new("cafe::Espresso"))?;

    assert_eq!(
        *log.lock(),
        [
            "Machine.clean",
            "Machine.descale",
            "Espresso.warm",
            "Espresso.clean",
            "Espresso.descale"
        ]
    );
    Ok(())
}

#[test]
fn test_full_lifecycle() -> Result<()> {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let (static_log, start_log, stop_log) = (log.clone(), log.clone(), log.clone());
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassInfo::class("shop::Register")
            .annotated(Annotation::singleton())
            .constructor(ConstructorInfo::no_args(|| Machine))
            .method(
                MethodInfo::static_method("configure", Vec::new(), move |_| {
                    static_log.lock().push("configure".to_string());
                    Ok(())
                })
                .annotated(Annotation::inject()),
            )
            .method(
                MethodInfo::instance::<Machine, _>("open", Vec::new(), move |_, _| {
                    start_log.lock().push("open".to_string());
                    Ok(())
                })
                .annotated(Annotation::post_construct()),
            )
            .method(
                MethodInfo::instance::<Machine, _>("close", Vec::new(), move |_, _| {
                    stop_log.lock().push("close".to_string());
                    Ok(())
                })
                .annotated(Annotation::pre_destroy()),
            ),
    )?;

    let container = build(registry, |binder| {
        binder.bind_class(ClassId::new("shop::Register"));
    })?;
    assert_eq!(*log.lock(), ["configure"]);

    container.get_instance_for_class(&ClassId::new("shop::Register"))?;
    container.get_instance_for_class(&ClassId::new("shop::Register"))?;
    assert_eq!(*log.lock(), ["configure", "open"]);

    container.destroy()?;
    assert_eq!(*log.lock(), ["configure", "open", "close"]);
    Ok(())
}
