//! Native entry points: the seam between packed word frames and real code.
//!
//! [`NativeTarget`] is the portable contract: words in, classified raw
//! return out. Host embedders implement it directly (any closure with the
//! right shape works), which also keeps the marshaler testable without
//! leaving safe code. [`RawEntry`] is the unsafe implementation over a bare
//! function pointer, dispatching through per-arity shims because a C
//! function pointer must be called with the exact parameter count it was
//! declared with.

use std::mem::transmute;

use crate::value::Value;

use super::CallError;

/// The shape of a native return value, decided by the declared return type
/// before the call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnClass {
    Void,
    /// Booleans and integers, widened to one word.
    Word,
    F32,
    F64,
    /// A whole value: strings, objects, sequences, and `any` returns.
    /// Only host targets can produce this class.
    Value,
}

impl ReturnClass {
    pub fn name(self) -> &'static str {
        match self {
            ReturnClass::Void => "void",
            ReturnClass::Word => "word",
            ReturnClass::F32 => "f32",
            ReturnClass::F64 => "f64",
            ReturnClass::Value => "value",
        }
    }
}

/// A raw return value as produced by a native entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum RawReturn {
    Void,
    Word(u64),
    F32(f32),
    F64(f64),
    Value(Value),
}

impl RawReturn {
    pub fn name(&self) -> &'static str {
        match self {
            RawReturn::Void => "void",
            RawReturn::Word(_) => "word",
            RawReturn::F32(_) => "f32",
            RawReturn::F64(_) => "f64",
            RawReturn::Value(_) => "value",
        }
    }
}

/// Something a packed frame can be handed to.
pub trait NativeTarget {
    fn invoke(&self, words: &[u64], ret: ReturnClass) -> Result<RawReturn, CallError>;
}

impl<F> NativeTarget for F
where
    F: Fn(&[u64], ReturnClass) -> Result<RawReturn, CallError>,
{
    fn invoke(&self, words: &[u64], ret: ReturnClass) -> Result<RawReturn, CallError> {
        self(words, ret)
    }
}

/// Calls `addr` as an `extern "C"` function taking `$words` u64 arguments
/// and returning `$ret`. Word frames fit entirely in u64 slots, so one shim
/// per arity covers every signature of that return type.
macro_rules! dispatch_arity {
    ($addr:expr, $words:expr, $ret:ty) => {
        match *$words {
            [] => {
                let f = unsafe { transmute::<usize, extern "C" fn() -> $ret>($addr) };
                f()
            }
            [a] => {
                let f = unsafe { transmute::<usize, extern "C" fn(u64) -> $ret>($addr) };
                f(a)
            }
            [a, b] => {
                let f = unsafe { transmute::<usize, extern "C" fn(u64, u64) -> $ret>($addr) };
                f(a, b)
            }
            [a, b, c] => {
                let f =
                    unsafe { transmute::<usize, extern "C" fn(u64, u64, u64) -> $ret>($addr) };
                f(a, b, c)
            }
            [a, b, c, d] => {
                let f = unsafe {
                    transmute::<usize, extern "C" fn(u64, u64, u64, u64) -> $ret>($addr)
                };
                f(a, b, c, d)
            }
            [a, b, c, d, e] => {
                let f = unsafe {
                    transmute::<usize, extern "C" fn(u64, u64, u64, u64, u64) -> $ret>($addr)
                };
                f(a, b, c, d, e)
            }
            [a, b, c, d, e, g] => {
                let f = unsafe {
                    transmute::<usize, extern "C" fn(u64, u64, u64, u64, u64, u64) -> $ret>($addr)
                };
                f(a, b, c, d, e, g)
            }
            [a, b, c, d, e, g, h] => {
                let f = unsafe {
                    transmute::<usize, extern "C" fn(u64, u64, u64, u64, u64, u64, u64) -> $ret>(
                        $addr,
                    )
                };
                f(a, b, c, d, e, g, h)
            }
            [a, b, c, d, e, g, h, i] => {
                let f = unsafe {
                    transmute::<
                        usize,
                        extern "C" fn(u64, u64, u64, u64, u64, u64, u64, u64) -> $ret,
                    >($addr)
                };
                f(a, b, c, d, e, g, h, i)
            }
            _ => {
                return Err(CallError::UnsupportedArity {
                    arity: $words.len(),
                });
            }
        }
    };
}

/// An unsafe native entry point given by address.
#[derive(Debug, Clone, Copy)]
pub struct RawEntry {
    addr: usize,
}

impl RawEntry {
    /// # Safety
    ///
    /// `addr` must be the address of an `extern "C"` function whose
    /// parameters are all word-sized (matching the frame the caller will
    /// pack) and whose return type matches the [`ReturnClass`] the entry
    /// will be invoked with. The function must remain valid for the life
    /// of the `RawEntry`.
    pub unsafe fn new(addr: usize) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> usize {
        self.addr
    }
}

impl NativeTarget for RawEntry {
    fn invoke(&self, words: &[u64], ret: ReturnClass) -> Result<RawReturn, CallError> {
        Ok(match ret {
            ReturnClass::Void => {
                dispatch_arity!(self.addr, words, ());
                RawReturn::Void
            }
            ReturnClass::Word => RawReturn::Word(dispatch_arity!(self.addr, words, u64)),
            ReturnClass::F32 => RawReturn::F32(dispatch_arity!(self.addr, words, f32)),
            ReturnClass::F64 => RawReturn::F64(dispatch_arity!(self.addr, words, f64)),
            ReturnClass::Value => {
                return Err(CallError::UnsupportedReturnClass(ReturnClass::Value.name()));
            }
        })
    }
}
