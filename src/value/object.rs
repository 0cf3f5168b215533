//! Opaque object references carried across the binding boundary.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Marker trait for native objects that can travel inside a [`Value`].
///
/// The metadata layer never looks inside an object; generated proxy/stub
/// code downcasts back to the concrete type on the far side of a call.
///
/// [`Value`]: crate::value::Value
pub trait Object: Any {
    /// Upcast for downcasting on the receiving side.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> Object for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A shared reference to an opaque native object.
///
/// Cloning an `ObjectRef` clones the reference, not the object; the original
/// binding treats object values as borrowed pointers, and the shared
/// reference preserves that without a lifetime obligation on the caller.
#[derive(Clone)]
pub struct ObjectRef {
    inner: Rc<dyn Object>,
}

impl ObjectRef {
    /// Wrap a native object.
    pub fn new<T: Object>(object: T) -> Self {
        Self {
            inner: Rc::new(object),
        }
    }

    /// Downcast to the concrete object type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        // Deref past the Rc first: the blanket Object impl covers Rc too,
        // and calling as_any on the smart pointer would yield its own
        // TypeId instead of the pointee's.
        (*self.inner).as_any().downcast_ref::<T>()
    }

    /// Stable address of the referenced object, used as an identity key and
    /// as the word passed to raw native entry points.
    pub fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.inner) as *const ()
    }

    /// Two references are the same object when they share the allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.as_ptr(), other.as_ptr())
    }
}

impl PartialEq for ObjectRef {
    /// References compare by identity, like the raw pointers they replace.
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:p})", self.as_ptr())
    }
}
