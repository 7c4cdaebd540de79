use std::{
    any::TypeId,
    borrow::Cow,
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    fmt,
    rc::Rc,
    sync::{Arc, Mutex},
};

use serde::Serialize;

/// A language neutral description of a value's type.
///
/// Descriptors are produced by [`Describe`] when a callable is registered and are only ever
/// consumed by the type mapper and the record discovery walk of the TypeScript generator.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Primitive(PrimitiveType),
    /// Raw binary data which travels over the wire as a base64 string. See [`Blob`](crate::Blob).
    Blob,
    List(Box<DataType>),
    Nullable(Box<DataType>),
    Record(RecordType),
    /// A value we know nothing about.
    Any,
}

impl DataType {
    /// Strips every list and nullable layer, returning the type at the bottom.
    pub fn element(&self) -> &DataType {
        match self {
            Self::List(ty) | Self::Nullable(ty) => ty.element(),
            ty => ty,
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    bool,
    char,
    String,
}

/// A named, multi-field value type.
///
/// The field list is resolved lazily so that records referencing themselves (directly or through
/// other records) can be described without recursing forever.
#[derive(Clone)]
pub struct RecordType {
    name: Cow<'static, str>,
    id: TypeId,
    fields: fn() -> Vec<Field>,
}

impl RecordType {
    pub fn new<T: ?Sized>(name: impl Into<Cow<'static, str>>, fields: fn() -> Vec<Field>) -> Self {
        Self {
            name: name.into(),
            id: typeid::of::<T>(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the Rust type this record was described from.
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn fields(&self) -> Vec<Field> {
        (self.fields)()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Cow<'static, str>,
    pub ty: DataType,
    pub public: bool,
    /// The field is never serialized so it must not show up in generated declarations.
    pub skip: bool,
}

impl Field {
    pub fn new<T: Describe + ?Sized>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ty: T::describe(),
            public: true,
            skip: false,
        }
    }

    #[must_use]
    pub fn private(self) -> Self {
        Self {
            public: false,
            ..self
        }
    }

    #[must_use]
    pub fn skip(self) -> Self {
        Self { skip: true, ..self }
    }

    /// Whether the field becomes a member of the record's generated interface.
    pub fn is_exported(&self) -> bool {
        self.public && !self.skip
    }
}

/// Provides the [`DataType`] of a Rust type.
///
/// Implement this with `#[derive(Describe)]` for your own structs.
pub trait Describe {
    fn describe() -> DataType;

    /// The declared return types when a callable returns `Self`.
    #[doc(hidden)]
    fn describe_returns() -> Vec<DataType> {
        vec![Self::describe()]
    }

    /// The wire value when a callable returns `Self`.
    #[doc(hidden)]
    fn encode_return(self) -> Result<serde_json::Value, serde_json::Error>
    where
        Self: Serialize + Sized,
    {
        serde_json::to_value(self)
    }
}

macro_rules! impl_primitives {
    ($($i:ident)+) => {$(
        impl Describe for $i {
            fn describe() -> DataType {
                DataType::Primitive(PrimitiveType::$i)
            }
        }
    )+};
}

impl_primitives!(
    i8 i16 i32 i64 i128 isize
    u8 u16 u32 u64 u128 usize
    f32 f64
    bool char
    String
);

impl Describe for str {
    fn describe() -> DataType {
        String::describe()
    }
}

impl<'a, T: Describe + ?Sized> Describe for &'a T {
    fn describe() -> DataType {
        T::describe()
    }
}

impl<'a> Describe for Cow<'a, str> {
    fn describe() -> DataType {
        String::describe()
    }
}

macro_rules! impl_containers {
    ($($container:ident)+) => {$(
        impl<T: Describe + ?Sized> Describe for $container<T> {
            fn describe() -> DataType {
                T::describe()
            }
        }
    )+}
}

impl_containers!(Box Rc Arc Cell RefCell Mutex);

macro_rules! impl_lists {
    ($($list:ident)+) => {$(
        impl<T: Describe> Describe for $list<T> {
            fn describe() -> DataType {
                DataType::List(Box::new(T::describe()))
            }
        }
    )+}
}

impl_lists!(Vec VecDeque BTreeSet);

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> DataType {
        DataType::List(Box::new(T::describe()))
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> DataType {
        DataType::List(Box::new(T::describe()))
    }
}

impl<const N: usize, T: Describe> Describe for [T; N] {
    fn describe() -> DataType {
        DataType::List(Box::new(T::describe()))
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> DataType {
        DataType::Nullable(Box::new(T::describe()))
    }
}

// Maps have no dedicated kind yet so they degrade to the unknown marker.
impl<K, V, S> Describe for HashMap<K, V, S> {
    fn describe() -> DataType {
        DataType::Any
    }
}

impl<K, V> Describe for BTreeMap<K, V> {
    fn describe() -> DataType {
        DataType::Any
    }
}

impl Describe for serde_json::Value {
    fn describe() -> DataType {
        DataType::Any
    }
}

// As a value `()` is `null`, as a return it is nothing at all.
impl Describe for () {
    fn describe() -> DataType {
        DataType::Any
    }

    fn describe_returns() -> Vec<DataType> {
        vec![]
    }
}

// Tuples travel as JSON arrays. Returned from a callable each element is a separate return value
// and only the first one is sent.
macro_rules! impl_tuples {
    ($($t:ident)+) => {
        impl<$($t: Describe),+> Describe for ($($t,)+) {
            fn describe() -> DataType {
                DataType::Any
            }

            fn describe_returns() -> Vec<DataType> {
                vec![$($t::describe()),+]
            }

            fn encode_return(self) -> Result<serde_json::Value, serde_json::Error>
            where
                Self: Serialize + Sized,
            {
                match serde_json::to_value(self)? {
                    serde_json::Value::Array(mut values) if !values.is_empty() => {
                        Ok(values.swap_remove(0))
                    }
                    value => Ok(value),
                }
            }
        }
    };
}

impl_tuples!(T1 T2);
impl_tuples!(T1 T2 T3);
impl_tuples!(T1 T2 T3 T4);
impl_tuples!(T1 T2 T3 T4 T5);
impl_tuples!(T1 T2 T3 T4 T5 T6);
