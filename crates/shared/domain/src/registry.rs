//! Registry of initialized feature slices.
//!
//! Each feature (entitlement, custom domains, ...) builds its state once at
//! startup and hands it over as a type-erased [`InitializedSlice`]; the server
//! state stores them by [`TypeId`] and handlers downcast back to the concrete
//! slice they need.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// Marker trait for feature state that can be shared across threads.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Helper to allow downcasting from the trait object.
    fn as_any(&self) -> &dyn Any;
}

/// One feature's state, erased for storage in the registry.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    /// Wraps a concrete slice, remembering its type for later lookup.
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), state: Box::new(state) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct CounterSlice(u32);

    impl FeatureSlice for CounterSlice {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn erased_slice_downcasts_back_to_its_type() {
        let slice = InitializedSlice::new(CounterSlice(7));
        assert_eq!(slice.id, TypeId::of::<CounterSlice>());

        let counter = slice.state.as_any().downcast_ref::<CounterSlice>().unwrap();
        assert_eq!(counter.0, 7);
    }
}
