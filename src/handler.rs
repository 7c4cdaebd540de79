use std::{fmt, marker::PhantomData};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{CallError, DataType, Describe};

/// The return value of a callable.
///
/// A callable returns zero or more values and optionally an error:
///
/// - `T` returns one value,
/// - `()` returns nothing (`null` on the wire),
/// - `(A, B)` and friends return several values but only `A` is sent back to the client,
/// - `Result<R, E>` makes `E` the error return, which is not part of the declared return types.
///
/// The marker `M` only exists to keep the implementations apart and is always inferred.
pub trait IntoReturns<M> {
    fn returns() -> Vec<DataType>;

    fn into_value(self) -> Result<Value, CallError>;
}

#[doc(hidden)]
pub enum Single {}

#[doc(hidden)]
pub struct Fallible<M>(PhantomData<M>);

// Unit and tuples are values too, they only count their returns differently. See `Describe`.
impl<T: Serialize + Describe> IntoReturns<Single> for T {
    fn returns() -> Vec<DataType> {
        T::describe_returns()
    }

    fn into_value(self) -> Result<Value, CallError> {
        self.encode_return().map_err(CallError::Encode)
    }
}

impl<R, E, M> IntoReturns<Fallible<M>> for Result<R, E>
where
    R: IntoReturns<M>,
    E: fmt::Display,
{
    fn returns() -> Vec<DataType> {
        R::returns()
    }

    fn into_value(self) -> Result<Value, CallError> {
        self.map_err(|err| CallError::Invocation(err.to_string()))?
            .into_value()
    }
}

/// A free function or closure which can be registered as an endpoint.
///
/// Implemented for every `Fn(A1, ..., An) -> R` with up to 12 arguments where each argument is
/// [`DeserializeOwned`] + [`Describe`] and `R` implements [`IntoReturns`].
pub trait Handler<M>: Send + Sync + 'static {
    fn args() -> Vec<DataType>;

    fn returns() -> Vec<DataType>;

    /// Decodes the positional `args` and calls the handler.
    fn invoke(&self, args: Vec<Value>) -> Result<Value, CallError>;
}

/// A method of `T`, called with a shared reference to the registered instance.
pub trait MethodHandler<T: ?Sized, M>: Send + Sync + 'static {
    fn args() -> Vec<DataType>;

    fn returns() -> Vec<DataType>;

    fn invoke(&self, this: &T, args: Vec<Value>) -> Result<Value, CallError>;
}

fn decode<T: DeserializeOwned>(
    args: &mut impl Iterator<Item = (usize, Value)>,
) -> Result<T, CallError> {
    let (index, value) = args.next().ok_or(CallError::MissingArgs)?;
    serde_json::from_value(value).map_err(|source| CallError::Decode { index, source })
}

fn check_count(args: &[Value], expected: usize) -> Result<(), CallError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CallError::ArgCount {
            expected,
            actual: args.len(),
        })
    }
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

macro_rules! impl_handler {
    ($($arg:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, R, M, $($arg,)*> Handler<(M, $($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoReturns<M>,
            $($arg: DeserializeOwned + Describe,)*
        {
            fn args() -> Vec<DataType> {
                vec![$($arg::describe()),*]
            }

            fn returns() -> Vec<DataType> {
                R::returns()
            }

            fn invoke(&self, args: Vec<Value>) -> Result<Value, CallError> {
                check_count(&args, count!($($arg)*))?;
                let mut args = args.into_iter().enumerate();
                $(let $arg = decode::<$arg>(&mut args)?;)*
                (self)($($arg),*).into_value()
            }
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<T, F, R, M, $($arg,)*> MethodHandler<T, (M, $($arg,)*)> for F
        where
            T: ?Sized,
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
            R: IntoReturns<M>,
            $($arg: DeserializeOwned + Describe,)*
        {
            fn args() -> Vec<DataType> {
                vec![$($arg::describe()),*]
            }

            fn returns() -> Vec<DataType> {
                R::returns()
            }

            fn invoke(&self, this: &T, args: Vec<Value>) -> Result<Value, CallError> {
                check_count(&args, count!($($arg)*))?;
                let mut args = args.into_iter().enumerate();
                $(let $arg = decode::<$arg>(&mut args)?;)*
                (self)(this, $($arg),*).into_value()
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);
