//! The cleanup function a group applies to its items

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

type HandlerFn<T> = dyn Fn(T) -> anyhow::Result<()>;

/// Function invoked once per item when the owning group is freed.
///
/// Handlers are fixed at group creation and shared between every handle to
/// the group. Infallible handlers are wrapped so both flavours look the same
/// to the group.
pub struct CleanupHandler<T> {
    inner: Rc<HandlerFn<T>>,
}

impl<T: 'static> CleanupHandler<T> {
    /// Wrap a handler that cannot report failure
    pub fn infallible<F>(handler: F) -> Self
    where
        F: Fn(T) + 'static,
    {
        Self {
            inner: Rc::new(move |item: T| {
                handler(item);
                Ok(())
            }),
        }
    }

    /// Wrap a handler that reports failure through `anyhow`
    pub fn fallible<F>(handler: F) -> Self
    where
        F: Fn(T) -> anyhow::Result<()> + 'static,
    {
        Self {
            inner: Rc::new(handler),
        }
    }
}

impl<T> CleanupHandler<T> {
    /// Invoke the handler on a single item
    pub fn call(&self, item: T) -> anyhow::Result<()> {
        (self.inner)(item)
    }

    /// Whether both values share the same underlying function
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Invoke the handler with panics caught, flattening any failure into a message
    pub(crate) fn call_isolated(&self, item: T) -> Result<(), String> {
        match catch_unwind(AssertUnwindSafe(|| self.call(item))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(format!("{err:#}")),
            Err(payload) => Err(format!(
                "handler panicked: {}",
                panic_message(payload.as_ref())
            )),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl<T> Clone for CleanupHandler<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for CleanupHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanupHandler").finish_non_exhaustive()
    }
}
