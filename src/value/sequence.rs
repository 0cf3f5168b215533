//! Reference-counted sequence buffers backing IDL sequence and array values.
//!
//! A [`Sequence`] is a handle to a shared record that holds either an owned,
//! fixed-length buffer of elements or an external indexable object supplied
//! by the embedder. Cloning a handle aliases the record: every clone sees
//! mutations made through any other handle, and the record is freed when the
//! last handle is dropped. This is shallow shared state, not copy-on-write;
//! callers that need an independent buffer must copy explicitly.
//!
//! Sequences are single-threaded by design: the handle is `!Send`/`!Sync`.

use std::cell::RefCell;
use std::rc::Rc;

use super::ValueError;

/// Capability expected of an externally supplied indexable object.
///
/// A host-backed sequence forwards every operation here, including length
/// changes, so a host may represent a growable script-engine array.
pub trait SequenceHost<T> {
    fn get_element(&self, index: usize) -> Result<T, ValueError>;
    fn set_element(&mut self, index: usize, value: T) -> Result<(), ValueError>;
    fn get_length(&self) -> usize;
    fn set_length(&mut self, len: usize) -> Result<(), ValueError>;
}

enum Backing<T> {
    Owned(Vec<T>),
    Host(Box<dyn SequenceHost<T>>),
}

/// A reference-counted, possibly host-proxied, indexable buffer of `T`.
pub struct Sequence<T> {
    rep: Rc<RefCell<Backing<T>>>,
}

impl<T> Clone for Sequence<T> {
    /// Aliases the backing record; see the module documentation.
    fn clone(&self) -> Self {
        Self {
            rep: Rc::clone(&self.rep),
        }
    }
}

impl<T> PartialEq for Sequence<T> {
    /// Handles compare by identity: equal when they alias the same record.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.rep, &other.rep)
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sequence<T> {
    /// An empty, owned, zero-length sequence.
    pub fn new() -> Self {
        Self::from_backing(Backing::Owned(Vec::new()))
    }

    /// Wrap an external indexable object.
    pub fn from_host(host: impl SequenceHost<T> + 'static) -> Self {
        Self::from_backing(Backing::Host(Box::new(host)))
    }

    fn from_backing(backing: Backing<T>) -> Self {
        Self {
            rep: Rc::new(RefCell::new(backing)),
        }
    }

    /// Number of elements currently reachable through this handle.
    pub fn len(&self) -> usize {
        match &*self.rep.borrow() {
            Backing::Owned(buf) => buf.len(),
            Backing::Host(host) => host.get_length(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this sequence forwards to an external host object.
    pub fn is_host_backed(&self) -> bool {
        matches!(&*self.rep.borrow(), Backing::Host(_))
    }

    /// Number of live handles sharing the backing record.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.rep)
    }

    /// Two handles alias the same record.
    pub fn aliases(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.rep, &other.rep)
    }

    /// Stable address of the backing record, used as an identity key and
    /// as the word passed to raw native entry points.
    pub fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.rep) as *const ()
    }

    /// Replace the element at `index`, bounds-checked.
    pub fn set(&self, index: usize, value: T) -> Result<(), ValueError> {
        match &mut *self.rep.borrow_mut() {
            Backing::Owned(buf) => {
                let len = buf.len();
                let slot = buf
                    .get_mut(index)
                    .ok_or(ValueError::IndexOutOfRange { index, len })?;
                *slot = value;
                Ok(())
            }
            Backing::Host(host) => {
                let len = host.get_length();
                if index >= len {
                    return Err(ValueError::IndexOutOfRange { index, len });
                }
                host.set_element(index, value)
            }
        }
    }

    /// Change the length. Only host-backed sequences can grow or shrink; an
    /// owned buffer's length is fixed at construction.
    pub fn set_len(&self, len: usize) -> Result<(), ValueError> {
        match &mut *self.rep.borrow_mut() {
            Backing::Owned(buf) => {
                if buf.len() == len {
                    Ok(())
                } else {
                    Err(ValueError::FixedLength {
                        len: buf.len(),
                        requested: len,
                    })
                }
            }
            Backing::Host(host) => host.set_length(len),
        }
    }
}

impl<T: Clone> Sequence<T> {
    /// An owned sequence that deep-copies the given elements.
    pub fn from_slice(elements: &[T]) -> Self {
        Self::from_backing(Backing::Owned(elements.to_vec()))
    }

    /// Read the element at `index`, bounds-checked.
    pub fn at(&self, index: usize) -> Result<T, ValueError> {
        match &*self.rep.borrow() {
            Backing::Owned(buf) => {
                let len = buf.len();
                buf.get(index)
                    .cloned()
                    .ok_or(ValueError::IndexOutOfRange { index, len })
            }
            Backing::Host(host) => {
                let len = host.get_length();
                if index >= len {
                    return Err(ValueError::IndexOutOfRange { index, len });
                }
                host.get_element(index)
            }
        }
    }

    /// Copy the whole sequence out as a `Vec`.
    pub fn to_vec(&self) -> Result<Vec<T>, ValueError> {
        match &*self.rep.borrow() {
            Backing::Owned(buf) => Ok(buf.clone()),
            Backing::Host(host) => {
                let len = host.get_length();
                let mut out = Vec::with_capacity(len);
                for index in 0..len {
                    out.push(host.get_element(index)?);
                }
                Ok(out)
            }
        }
    }
}

impl<T: Clone + Default> Sequence<T> {
    /// An owned sequence of `len` default-valued elements.
    pub fn with_length(len: usize) -> Self {
        Self::from_backing(Backing::Owned(vec![T::default(); len]))
    }
}

impl<T> std::fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backing = if self.is_host_backed() { "host" } else { "owned" };
        write!(f, "Sequence<{backing}, len={}>", self.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_indexing() {
        let seq = Sequence::from_slice(&[0u32, 1, 2]);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.at(0), Ok(0));
        assert_eq!(seq.at(1), Ok(1));
        assert_eq!(seq.at(2), Ok(2));
        assert_eq!(
            seq.at(3),
            Err(ValueError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn clone_aliases_backing() {
        let seq = Sequence::from_slice(&[1i32, 2, 3]);
        let alias = seq.clone();
        assert_eq!(seq.handle_count(), 2);
        assert!(seq.aliases(&alias));

        alias.set(1, 99).unwrap();
        assert_eq!(seq.at(1), Ok(99));
    }

    #[test]
    fn owned_length_is_fixed() {
        let seq = Sequence::<u8>::with_length(4);
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.set_len(4), Ok(()));
        assert_eq!(
            seq.set_len(8),
            Err(ValueError::FixedLength {
                len: 4,
                requested: 8
            })
        );
    }

    struct Doubling {
        data: Vec<i64>,
    }

    impl SequenceHost<i64> for Doubling {
        fn get_element(&self, index: usize) -> Result<i64, ValueError> {
            self.data
                .get(index)
                .copied()
                .ok_or(ValueError::IndexOutOfRange {
                    index,
                    len: self.data.len(),
                })
        }

        fn set_element(&mut self, index: usize, value: i64) -> Result<(), ValueError> {
            let len = self.data.len();
            let slot = self
                .data
                .get_mut(index)
                .ok_or(ValueError::IndexOutOfRange { index, len })?;
            *slot = value * 2;
            Ok(())
        }

        fn get_length(&self) -> usize {
            self.data.len()
        }

        fn set_length(&mut self, len: usize) -> Result<(), ValueError> {
            self.data.resize(len, 0);
            Ok(())
        }
    }

    #[test]
    fn host_backed_forwards_everything() {
        let seq = Sequence::from_host(Doubling { data: vec![5, 6] });
        assert!(seq.is_host_backed());
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.at(1), Ok(6));

        seq.set(0, 10).unwrap();
        assert_eq!(seq.at(0), Ok(20));

        seq.set_len(4).unwrap();
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn drop_releases_backing() {
        let seq = Sequence::from_slice(&[1u8]);
        let alias = seq.clone();
        assert_eq!(alias.handle_count(), 2);
        drop(seq);
        assert_eq!(alias.handle_count(), 1);
    }
}
