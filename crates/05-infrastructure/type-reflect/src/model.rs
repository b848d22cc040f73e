//! 类型元数据模型
//!
//! 运行时没有反射能力, 每个参与注入的类型都以 [`ClassInfo`] 显式登记到 [`ClassRegistry`]:
//! 泛型父类、接口、注解以及构造器、字段、方法的句柄。成员句柄持有闭包,
//! 由容器在注入时调用。

use crate::annotation::{Annotation, Annotations};
use crate::class_id::ClassId;
use crate::descriptor::{GenericDeclaration, TypeDescriptor};
use crate::error::{ReflectError, ReflectResult};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 集合接口名称
pub const COLLECTION: &str = "Collection";
/// 列表接口名称
pub const LIST: &str = "List";
/// 集合接口名称
pub const SET: &str = "Set";
/// 映射接口名称
pub const MAP: &str = "Map";

/// 容器中流转的实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 成员调用失败的原因
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type ConstructorFn = Arc<dyn Fn(&Arguments) -> Result<Instance, BoxError> + Send + Sync>;
type FieldSetter = Arc<dyn Fn(Option<&Instance>, Instance) -> Result<(), BoxError> + Send + Sync>;
type MethodInvoker = Arc<dyn Fn(Option<&Instance>, &Arguments) -> Result<(), BoxError> + Send + Sync>;

/// 可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    /// 仅同一模块可见
    Package,
    Private,
}

/// 成员修饰符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
}

impl Modifiers {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// 类型种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
}

/// 成员标识, 用于去重
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberId {
    pub declaring_class: ClassId,
    pub name: Arc<str>,
    /// 参数类型签名, 字段为空
    pub signature: Vec<String>,
}

/// 按位置排列的注入值, 缺失的依赖为 `None`
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<Option<Instance>>,
}

impl Arguments {
    pub fn new(values: Vec<Option<Instance>>) -> Self {
        Self { values }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 原始值
    pub fn raw(&self, index: usize) -> Option<&Instance> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// 取出并向下转型, 缺失时报错
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> ReflectResult<Arc<T>> {
        self.optional(index)?
            .ok_or(ReflectError::MissingArgument { index })
    }

    /// 取出并向下转型, 缺失时返回 `None`
    pub fn optional<T: Any + Send + Sync>(&self, index: usize) -> ReflectResult<Option<Arc<T>>> {
        match self.raw(index) {
            None => Ok(None),
            Some(value) => value.clone().downcast::<T>().map(Some).map_err(|_| {
                ReflectError::ArgumentTypeMismatch {
                    index,
                    expected: type_name::<T>().to_string(),
                }
            }),
        }
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present: Vec<bool> = self.values.iter().map(Option::is_some).collect();
        f.debug_struct("Arguments").field("present", &present).finish()
    }
}

fn downcast_receiver<'a, T: Any>(target: Option<&'a Instance>) -> Result<&'a T, BoxError> {
    let target = target.ok_or("实例成员缺少接收者")?;
    (**target)
        .downcast_ref::<T>()
        .ok_or_else(|| format!("接收者类型不匹配, 期望 {}", type_name::<T>()).into())
}

fn downcast_value<V: Any + Send + Sync>(value: Instance) -> Result<Arc<V>, BoxError> {
    value
        .downcast::<V>()
        .map_err(|_| format!("注入值类型不匹配, 期望 {}", type_name::<V>()).into())
}

/// 参数元数据
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    generic_type: TypeDescriptor,
    annotations: Annotations,
}

impl ParameterInfo {
    pub fn new(generic_type: TypeDescriptor) -> Self {
        Self {
            generic_type,
            annotations: Annotations::new(),
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn generic_type(&self) -> &TypeDescriptor {
        &self.generic_type
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}

impl From<TypeDescriptor> for ParameterInfo {
    fn from(generic_type: TypeDescriptor) -> Self {
        Self::new(generic_type)
    }
}

/// 构造器与方法的公共视图
pub trait Executable {
    fn declaring_class(&self) -> &ClassId;
    fn parameters(&self) -> &[ParameterInfo];
    fn modifiers(&self) -> Modifiers;
    /// 用于日志与错误信息的描述
    fn describe(&self) -> String;
}

/// 构造器句柄
#[derive(Clone)]
pub struct ConstructorInfo {
    declaring_class: ClassId,
    parameters: Vec<ParameterInfo>,
    modifiers: Modifiers,
    annotations: Annotations,
    factory: ConstructorFn,
}

impl ConstructorInfo {
    pub fn new<F>(parameters: Vec<ParameterInfo>, factory: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            declaring_class: ClassId::object(),
            parameters,
            modifiers: Modifiers::default(),
            annotations: Annotations::new(),
            factory: Arc::new(factory),
        }
    }

    /// 无参构造器
    pub fn no_args<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(Vec::new(), move |_| Ok(Arc::new(factory()) as Instance))
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.modifiers.visibility = visibility;
        self
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// 以给定参数创建实例
    pub fn instantiate(&self, args: &Arguments) -> Result<Instance, BoxError> {
        (self.factory)(args)
    }
}

impl Executable for ConstructorInfo {
    fn declaring_class(&self) -> &ClassId {
        &self.declaring_class
    }

    fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    fn describe(&self) -> String {
        format!("{}::new/{}", self.declaring_class, self.parameters.len())
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("declaring_class", &self.declaring_class)
            .field("parameters", &self.parameters)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

/// 字段句柄
#[derive(Clone)]
pub struct FieldInfo {
    declaring_class: ClassId,
    name: Arc<str>,
    generic_type: TypeDescriptor,
    modifiers: Modifiers,
    annotations: Annotations,
    setter: FieldSetter,
}

impl FieldInfo {
    pub fn new<F>(name: &str, generic_type: TypeDescriptor, setter: F) -> Self
    where
        F: Fn(Option<&Instance>, Instance) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            declaring_class: ClassId::object(),
            name: Arc::from(name),
            generic_type,
            modifiers: Modifiers::default(),
            annotations: Annotations::new(),
            setter: Arc::new(setter),
        }
    }

    /// 实例字段, 接收者与值都按类型向下转型
    pub fn instance<T, V, F>(name: &str, generic_type: TypeDescriptor, assign: F) -> Self
    where
        T: Any + Send + Sync,
        V: Any + Send + Sync,
        F: Fn(&T, Arc<V>) + Send + Sync + 'static,
    {
        Self::new(name, generic_type, move |target, value| {
            let target = downcast_receiver::<T>(target)?;
            assign(target, downcast_value::<V>(value)?);
            Ok(())
        })
    }

    /// 静态字段
    pub fn static_field<V, F>(name: &str, generic_type: TypeDescriptor, assign: F) -> Self
    where
        V: Any + Send + Sync,
        F: Fn(Arc<V>) + Send + Sync + 'static,
    {
        let mut field = Self::new(name, generic_type, move |_, value| {
            assign(downcast_value::<V>(value)?);
            Ok(())
        });
        field.modifiers.is_static = true;
        field
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.modifiers.visibility = visibility;
        self
    }

    pub fn declaring_class(&self) -> &ClassId {
        &self.declaring_class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generic_type(&self) -> &TypeDescriptor {
        &self.generic_type
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn id(&self) -> MemberId {
        MemberId {
            declaring_class: self.declaring_class.clone(),
            name: self.name.clone(),
            signature: Vec::new(),
        }
    }

    pub fn describe(&self) -> String {
        format!("{}.{}", self.declaring_class, self.name)
    }

    /// 写入字段, 静态字段的接收者为 `None`
    pub fn set(&self, target: Option<&Instance>, value: Instance) -> Result<(), BoxError> {
        (self.setter)(target, value)
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("declaring_class", &self.declaring_class)
            .field("name", &self.name)
            .field("generic_type", &self.generic_type)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

/// 方法句柄
#[derive(Clone)]
pub struct MethodInfo {
    declaring_class: ClassId,
    name: Arc<str>,
    return_type: TypeDescriptor,
    parameters: Vec<ParameterInfo>,
    modifiers: Modifiers,
    annotations: Annotations,
    invoker: MethodInvoker,
}

impl MethodInfo {
    pub fn new<F>(name: &str, parameters: Vec<ParameterInfo>, invoker: F) -> Self
    where
        F: Fn(Option<&Instance>, &Arguments) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            declaring_class: ClassId::object(),
            name: Arc::from(name),
            return_type: TypeDescriptor::class(ClassId::void()),
            parameters,
            modifiers: Modifiers::default(),
            annotations: Annotations::new(),
            invoker: Arc::new(invoker),
        }
    }

    /// 实例方法
    pub fn instance<T, F>(name: &str, parameters: Vec<ParameterInfo>, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, &Arguments) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::new(name, parameters, move |target, args| {
            body(downcast_receiver::<T>(target)?, args)
        })
    }

    /// 静态方法
    pub fn static_method<F>(name: &str, parameters: Vec<ParameterInfo>, body: F) -> Self
    where
        F: Fn(&Arguments) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let mut method = Self::new(name, parameters, move |_, args| body(args));
        method.modifiers.is_static = true;
        method
    }

    pub fn returns(mut self, return_type: TypeDescriptor) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.modifiers.visibility = visibility;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn id(&self) -> MemberId {
        MemberId {
            declaring_class: self.declaring_class.clone(),
            name: self.name.clone(),
            signature: self
                .parameters
                .iter()
                .map(|parameter| parameter.generic_type().to_string())
                .collect(),
        }
    }

    /// 调用方法, 静态方法的接收者为 `None`
    pub fn invoke(&self, target: Option<&Instance>, args: &Arguments) -> Result<(), BoxError> {
        (self.invoker)(target, args)
    }
}

impl Executable for MethodInfo {
    fn declaring_class(&self) -> &ClassId {
        &self.declaring_class
    }

    fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    fn describe(&self) -> String {
        format!("{}::{}/{}", self.declaring_class, self.name, self.parameters.len())
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("declaring_class", &self.declaring_class)
            .field("name", &self.name)
            .field("return_type", &self.return_type)
            .field("parameters", &self.parameters)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

/// 类型元数据
#[derive(Debug, Clone)]
pub struct ClassInfo {
    id: ClassId,
    kind: ClassKind,
    type_parameters: Vec<Arc<str>>,
    superclass: Option<TypeDescriptor>,
    interfaces: Vec<TypeDescriptor>,
    annotations: Annotations,
    modifiers: Modifiers,
    constructors: Vec<ConstructorInfo>,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
}

impl ClassInfo {
    /// 普通类, 默认父类为 `Object`
    pub fn class(id: impl Into<ClassId>) -> ClassInfoBuilder {
        let id = id.into();
        let superclass = (!id.is_object()).then(TypeDescriptor::object);
        ClassInfoBuilder::new(id, ClassKind::Class, superclass)
    }

    /// 接口, 没有父类
    pub fn interface(id: impl Into<ClassId>) -> ClassInfoBuilder {
        ClassInfoBuilder::new(id.into(), ClassKind::Interface, None)
    }

    pub fn id(&self) -> &ClassId {
        &self.id
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn type_parameters(&self) -> &[Arc<str>] {
        &self.type_parameters
    }

    /// 类型参数的位置
    pub fn type_parameter_index(&self, name: &str) -> Option<usize> {
        self.type_parameters.iter().position(|param| &**param == name)
    }

    /// 泛型父类
    pub fn superclass(&self) -> Option<&TypeDescriptor> {
        self.superclass.as_ref()
    }

    /// 泛型接口, 保持声明顺序
    pub fn interfaces(&self) -> &[TypeDescriptor] {
        &self.interfaces
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }
}

/// [`ClassInfo`] 构建器
pub struct ClassInfoBuilder {
    info: ClassInfo,
}

impl ClassInfoBuilder {
    fn new(id: ClassId, kind: ClassKind, superclass: Option<TypeDescriptor>) -> Self {
        Self {
            info: ClassInfo {
                id,
                kind,
                type_parameters: Vec::new(),
                superclass,
                interfaces: Vec::new(),
                annotations: Annotations::new(),
                modifiers: Modifiers::default(),
                constructors: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
            },
        }
    }

    /// 声明类型参数
    pub fn type_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.info
            .type_parameters
            .extend(names.into_iter().map(|name| Arc::from(name.as_ref())));
        self
    }

    /// 泛型父类; 接口的父类型记为接口
    pub fn extends(mut self, superclass: TypeDescriptor) -> Self {
        match self.info.kind {
            ClassKind::Class => self.info.superclass = Some(superclass),
            ClassKind::Interface => self.info.interfaces.push(superclass),
        }
        self
    }

    pub fn implements(mut self, interface: TypeDescriptor) -> Self {
        self.info.interfaces.push(interface);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.info.annotations.push(annotation);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.info.modifiers.visibility = visibility;
        self
    }

    pub fn constructor(mut self, mut constructor: ConstructorInfo) -> Self {
        constructor.declaring_class = self.info.id.clone();
        self.info.constructors.push(constructor);
        self
    }

    pub fn field(mut self, mut field: FieldInfo) -> Self {
        field.declaring_class = self.info.id.clone();
        self.info.fields.push(field);
        self
    }

    pub fn method(mut self, mut method: MethodInfo) -> Self {
        method.declaring_class = self.info.id.clone();
        self.info.methods.push(method);
        self
    }

    pub fn build(self) -> ClassInfo {
        self.info
    }
}

impl From<ClassInfoBuilder> for ClassInfo {
    fn from(builder: ClassInfoBuilder) -> Self {
        builder.build()
    }
}

/// 类型内省能力
pub trait TypeIntrospector: Send + Sync {
    /// 查找已登记的类型
    fn class(&self, id: &ClassId) -> Option<&ClassInfo>;
}

/// 基于登记表的类型内省实现
///
/// 预置 `Object`、`Provider<T>` 以及 `Collection<E>`、`List<E>`、`Set<E>`、`Map<K, V>`。
pub struct ClassRegistry {
    classes: HashMap<ClassId, ClassInfo>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        let mut classes = HashMap::new();
        for info in builtin_classes() {
            classes.insert(info.id.clone(), info);
        }
        Self { classes }
    }

    /// 登记类型, 同名类型只能登记一次
    pub fn register(&mut self, info: impl Into<ClassInfo>) -> ReflectResult<()> {
        let info = info.into();
        if self.classes.contains_key(&info.id) {
            return Err(ReflectError::DuplicateClass {
                class: info.id.to_string(),
            });
        }
        debug!(
            "登记类型: {} (构造器 {}, 字段 {}, 方法 {})",
            info.id,
            info.constructors.len(),
            info.fields.len(),
            info.methods.len()
        );
        self.classes.insert(info.id.clone(), info);
        Ok(())
    }

    pub fn contains(&self, id: &ClassId) -> bool {
        self.classes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeIntrospector for ClassRegistry {
    fn class(&self, id: &ClassId) -> Option<&ClassInfo> {
        self.classes.get(id)
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&ClassId> = self.classes.keys().collect();
        ids.sort();
        f.debug_struct("ClassRegistry").field("classes", &ids).finish()
    }
}

fn element_of(class: &str, name: &str) -> TypeDescriptor {
    TypeDescriptor::variable(GenericDeclaration::Class(ClassId::new(class)), name)
}

fn builtin_classes() -> Vec<ClassInfo> {
    let collection_of = |owner: &str| {
        TypeDescriptor::parameterized_unchecked(None, ClassId::new(COLLECTION), vec![element_of(owner, "E")])
    };
    vec![
        ClassInfo::class(ClassId::object()).build(),
        ClassInfo::interface(ClassId::provider()).type_parameters(["T"]).build(),
        ClassInfo::interface(COLLECTION).type_parameters(["E"]).build(),
        ClassInfo::interface(LIST)
            .type_parameters(["E"])
            .extends(collection_of(LIST))
            .build(),
        ClassInfo::interface(SET)
            .type_parameters(["E"])
            .extends(collection_of(SET))
            .build(),
        ClassInfo::interface(MAP).type_parameters(["K", "V"]).build(),
    ]
}
