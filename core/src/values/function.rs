//! Host functions callable from rules.
//!
//! A [`Function`] pairs a type-erased body with the parameter kinds it
//! declares, so arity and argument kinds are validated before the host code
//! runs. Functions are built from ordinary closures:
//!
//! ```ignore
//! let double = Function::new(|x: i64| x * 2);
//! let now = Function::with_context(|ctx: &Context| ctx.check().map(|_| Utc::now()));
//! ```
//!
//! A function that takes no positional parameters is *lazy*: a literal
//! wrapping it is invoked as soon as it is evaluated.

use core::fmt;
use std::sync::Arc;

use super::{FromValue, IntoReturn, Kind, Value};
use crate::error::Error;
use crate::scope::Context;

type Body = dyn Fn(&Context, Vec<Value>) -> Result<Value, Error> + Send + Sync;

struct Inner {
    params: Vec<Kind>,
    context: bool,
    body: Box<Body>,
}

/// A callable host value.
#[derive(Clone)]
pub struct Function {
    inner: Arc<Inner>,
}

impl Function {
    /// Wrap a closure whose parameters are all positional arguments.
    pub fn new<Args, F: HostFn<Args>>(f: F) -> Self {
        Self {
            inner: Arc::new(Inner {
                params: <F as HostFn<Args>>::params(),
                context: false,
                body: Box::new(move |_: &Context, args: Vec<Value>| {
                    <F as HostFn<Args>>::invoke(&f, args)
                }),
            }),
        }
    }

    /// Wrap a closure whose first parameter receives the evaluation [`Context`].
    pub fn with_context<Args, F: ContextFn<Args>>(f: F) -> Self {
        Self {
            inner: Arc::new(Inner {
                params: <F as ContextFn<Args>>::params(),
                context: true,
                body: Box::new(move |ctx: &Context, args: Vec<Value>| {
                    <F as ContextFn<Args>>::invoke(&f, ctx, args)
                }),
            }),
        }
    }

    /// Build a function from raw parts. `params` are checked on every call.
    pub fn from_parts(
        params: Vec<Kind>,
        context: bool,
        body: impl Fn(&Context, Vec<Value>) -> Result<Value, Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                params,
                context,
                body: Box::new(body),
            }),
        }
    }

    /// Declared positional parameter kinds, not counting the context.
    pub fn params(&self) -> &[Kind] {
        &self.inner.params
    }

    pub fn arity(&self) -> usize {
        self.inner.params.len()
    }

    pub fn accepts_context(&self) -> bool {
        self.inner.context
    }

    /// Whether evaluating a literal holding this function invokes it.
    pub fn is_lazy(&self) -> bool {
        self.inner.params.is_empty()
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Validate `args` against the declared parameters, then invoke the body.
    ///
    /// Context-aware functions are not entered once the context is cancelled
    /// or past its deadline.
    pub fn call(&self, ctx: &Context, args: Vec<Value>) -> Result<Value, Error> {
        let params = &self.inner.params;
        if params.len() != args.len() {
            return Err(Error::Arity {
                expected: params.len(),
                got: args.len(),
            });
        }
        for (index, (param, arg)) in params.iter().zip(&args).enumerate() {
            if !param.accepts(arg.kind()) {
                return Err(Error::ArgumentMismatch {
                    index,
                    expected: *param,
                    got: arg.kind(),
                });
            }
        }
        if self.inner.context {
            ctx.check()?;
        }
        (self.inner.body)(ctx, args).inspect_err(|err| {
            tracing::debug!(error = %err, "host function failed");
        })
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("params", &self.inner.params)
            .field("context", &self.inner.context)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Closures usable with [`Function::new`].
///
/// `Args` is a marker tuple of the parameter types; it lets one closure type
/// implement the trait for exactly one arity.
pub trait HostFn<Args>: Send + Sync + 'static {
    fn params() -> Vec<Kind>;
    fn invoke(&self, args: Vec<Value>) -> Result<Value, Error>;
}

/// Closures usable with [`Function::with_context`].
pub trait ContextFn<Args>: Send + Sync + 'static {
    fn params() -> Vec<Kind>;
    fn invoke(&self, ctx: &Context, args: Vec<Value>) -> Result<Value, Error>;
}

fn take<T: FromValue>(args: &mut impl Iterator<Item = Value>, index: usize) -> Result<T, Error> {
    let arg = args.next().unwrap_or_default();
    let got = arg.kind();
    T::from_value(arg).ok_or(Error::ArgumentMismatch {
        index,
        expected: T::KIND,
        got,
    })
}

macro_rules! impl_host_fn {
    ($($arg:ident => $index:tt),*) => {
        impl<F, R, $($arg,)*> HostFn<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoReturn,
            $($arg: FromValue,)*
        {
            fn params() -> Vec<Kind> {
                vec![$($arg::KIND),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn invoke(&self, args: Vec<Value>) -> Result<Value, Error> {
                let mut args = args.into_iter();
                $(
                    #[allow(non_snake_case)]
                    let $arg = take::<$arg>(&mut args, $index)?;
                )*
                (self)($($arg),*).into_return()
            }
        }

        impl<F, R, $($arg,)*> ContextFn<($($arg,)*)> for F
        where
            F: Fn(&Context, $($arg),*) -> R + Send + Sync + 'static,
            R: IntoReturn,
            $($arg: FromValue,)*
        {
            fn params() -> Vec<Kind> {
                vec![$($arg::KIND),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn invoke(&self, ctx: &Context, args: Vec<Value>) -> Result<Value, Error> {
                let mut args = args.into_iter();
                $(
                    #[allow(non_snake_case)]
                    let $arg = take::<$arg>(&mut args, $index)?;
                )*
                (self)(ctx, $($arg),*).into_return()
            }
        }
    };
}

impl_host_fn!();
impl_host_fn!(A1 => 0);
impl_host_fn!(A1 => 0, A2 => 1);
impl_host_fn!(A1 => 0, A2 => 1, A3 => 2);
impl_host_fn!(A1 => 0, A2 => 1, A3 => 2, A4 => 3);
