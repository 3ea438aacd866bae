//! Support code for `#[derive(Bind)]`. Not a public API.

use std::marker::PhantomData;

/// Asks the compiler whether `T: Copy` at the call site.
///
/// Call as `(&CopyCheck::<T>::new()).is_copy()` with both [`ViaCopy`] and
/// [`ViaAny`] in scope. Method resolution picks `ViaCopy` when `T: Copy`
/// holds and falls back to `ViaAny` through the extra autoref otherwise.
/// `T` must be concrete at the call site.
pub struct CopyCheck<T>(PhantomData<T>);

impl<T> CopyCheck<T> {
    pub fn new() -> Self {
        CopyCheck(PhantomData)
    }
}

impl<T> Default for CopyCheck<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait ViaCopy {
    fn is_copy(&self) -> bool {
        true
    }
}

impl<T: Copy> ViaCopy for CopyCheck<T> {}

pub trait ViaAny {
    fn is_copy(&self) -> bool {
        false
    }
}

impl<T> ViaAny for &CopyCheck<T> {}
