//! Component kinds and the component traits.
//!
//! Every component type carries an explicit, stable [`ComponentKind`] tag.
//! Filters and lookups compare tags, never type names or runtime reflection.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable discriminator for a component type.
///
/// Identity is the numeric `id`; `name` is carried for diagnostics only.
#[derive(Copy, Clone)]
pub struct ComponentKind {
    id: u32,
    name: &'static str,
}

impl ComponentKind {
    /// Creates a new component kind.
    #[must_use]
    pub const fn new(id: u32, name: &'static str) -> Self {
        Self { id, name }
    }

    /// Returns the numeric tag of this kind.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.id
    }

    /// Returns the diagnostic name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentKind {}

impl Hash for ComponentKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ComponentKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComponentKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A typed component value.
///
/// Use the [`component!`](crate::component!) macro to implement this trait.
///
/// # Example
/// ```
/// use reflex_foundation::{component, Component};
///
/// #[derive(Debug)]
/// struct Health(u32);
/// component!(Health, 7);
///
/// assert_eq!(Health::KIND.id(), 7);
/// ```
pub trait Component: Any + fmt::Debug {
    /// Tag shared by every value of this type.
    const KIND: ComponentKind;
}

/// Object-safe view of a component, used for heterogeneous storage.
pub trait AnyComponent: Any + fmt::Debug {
    /// Returns the kind tag of this value.
    fn kind(&self) -> ComponentKind;

    /// Upcasts to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyComponent for T {
    fn kind(&self) -> ComponentKind {
        T::KIND
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn AnyComponent {
    /// Returns true if this value is tagged with `kind`.
    #[must_use]
    pub fn is_kind(&self, kind: ComponentKind) -> bool {
        self.kind() == kind
    }

    /// Downcasts to a concrete component type.
    ///
    /// Returns `None` if the tag or the concrete type does not match.
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        if self.kind() != T::KIND {
            return None;
        }
        self.as_any().downcast_ref::<T>()
    }

    /// Mutable variant of [`downcast_ref`](Self::downcast_ref).
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        if self.kind() != T::KIND {
            return None;
        }
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Implements [`Component`] for a type with the given numeric tag.
///
/// Tags must be unique across the component types of a program.
#[macro_export]
macro_rules! component {
    ($ty:ty, $id:expr) => {
        impl $crate::Component for $ty {
            const KIND: $crate::ComponentKind = $crate::ComponentKind::new($id, stringify!($ty));
        }
    };
}
