//! State records and shallow-merge partial updates
//!
//! A store is generic over a record type implementing [`State`]. Each record
//! has a companion *partial* record in which every field is optional: `None`
//! means "not mentioned, keep the current value" and `Some(v)` means
//! "overwrite with `v`". For a field that is itself an `Option<V>`, the
//! partial field is `Option<Option<V>>`, so `Some(None)` is an explicit clear.
//!
//! # Example
//!
//! ```rust
//! use state_store::{define_state, State};
//!
//! define_state! {
//!     #[derive(PartialEq)]
//!     pub struct Profile {
//!         pub name: Option<String>,
//!         pub visits: u32,
//!     }
//! }
//!
//! let profile = Profile { name: Some("ada".to_string()), visits: 3 };
//!
//! // Fields that are not mentioned are kept
//! let next = profile.merge(ProfilePartial::default().visits(4));
//! assert_eq!(next, Profile { name: Some("ada".to_string()), visits: 4 });
//!
//! // An explicit `None` clears the field
//! let cleared = next.merge(ProfilePartial::default().name(None));
//! assert_eq!(cleared.name, None);
//! ```

use std::fmt;

/// A record type that can live inside a [`Store`](crate::Store)
///
/// Implementations must be:
/// - Clone: merges build a fresh record from the current one
/// - Send + Sync: stores may be shared across threads
/// - 'static: records are held behind `Arc` for the store's lifetime
///
/// Most records are declared with [`define_state!`](crate::define_state),
/// which generates the partial type and the field-by-field merge.
pub trait State: Clone + Send + Sync + 'static {
    /// Companion record with every field optional
    ///
    /// `Default` must produce the empty partial (nothing mentioned).
    type Partial: Default + Send + 'static;

    /// Shallow merge: fields mentioned in `partial` replace the current
    /// value, every other field is carried over unchanged
    fn merge(&self, partial: Self::Partial) -> Self;
}

/// A partial update handed to `set`
///
/// Either a literal partial record or a function from the current state to
/// a partial record. A computed update is evaluated exactly once, against
/// the state at the moment `set` runs.
pub enum PartialState<T: State> {
    /// Overwrite the mentioned fields with these values
    Literal(T::Partial),

    /// Derive the partial record from the live state
    Computed(Box<dyn FnOnce(&T) -> T::Partial + Send>),
}

impl<T: State> PartialState<T> {
    /// Wrap a literal partial record
    pub fn literal(partial: T::Partial) -> Self {
        PartialState::Literal(partial)
    }

    /// Wrap a function computing the partial record from the current state
    pub fn computed<F>(f: F) -> Self
    where
        F: FnOnce(&T) -> T::Partial + Send + 'static,
    {
        PartialState::Computed(Box::new(f))
    }

    /// The update that mentions no fields
    pub fn empty() -> Self {
        PartialState::Literal(T::Partial::default())
    }

    /// Produce the partial record to merge into `current`
    pub fn resolve(self, current: &T) -> T::Partial {
        match self {
            PartialState::Literal(partial) => partial,
            PartialState::Computed(f) => f(current),
        }
    }

    /// Whether this update is a computed one
    pub fn is_computed(&self) -> bool {
        matches!(self, PartialState::Computed(_))
    }
}

impl<T: State> fmt::Debug for PartialState<T>
where
    T::Partial: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialState::Literal(partial) => f.debug_tuple("Literal").field(partial).finish(),
            PartialState::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Declare a state record, its partial companion, and the `State` impl
///
/// Generates:
/// - the record struct as written, deriving `Clone` and `Debug`
/// - `<Name>Partial`, with every field wrapped in `Option` and a builder
///   setter per field (`.field(value)` marks the field as mentioned)
/// - `impl State for <Name>` performing the field-by-field shallow merge
///
/// Every field type must be `Clone + Debug + Send + Sync + 'static`.
/// Extra derives can be listed on the struct and apply to the record only.
///
/// # Example
///
/// ```rust
/// use state_store::{define_state, Action};
///
/// define_state! {
///     /// Counter with an action field
///     pub struct Counter {
///         pub count: i64,
///         pub reset: Action,
///     }
/// }
///
/// let partial = CounterPartial::default().count(10);
/// assert_eq!(partial.count, Some(10));
/// assert!(partial.reset.is_none());
/// ```
#[macro_export]
macro_rules! define_state {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $field_type:ty
            ),* $(,)?
        }
    ) => {
        $crate::__private::paste! {
            $(#[$meta])*
            #[derive(Clone, Debug)]
            $vis struct $name {
                $(
                    $(#[$field_meta])*
                    $field_vis $field: $field_type,
                )*
            }

            #[doc = "Partial update for [`" $name "`]; `None` fields are left untouched."]
            #[derive(Clone, Debug, Default)]
            $vis struct [<$name Partial>] {
                $(
                    $(#[$field_meta])*
                    $field_vis $field: ::std::option::Option<$field_type>,
                )*
            }

            impl [<$name Partial>] {
                $(
                    #[doc = "Mention `" $field "`, overwriting it with `value`."]
                    #[must_use]
                    pub fn $field(mut self, value: $field_type) -> Self {
                        self.$field = ::std::option::Option::Some(value);
                        self
                    }
                )*
            }

            impl $crate::State for $name {
                type Partial = [<$name Partial>];

                fn merge(&self, partial: Self::Partial) -> Self {
                    Self {
                        $(
                            $field: match partial.$field {
                                ::std::option::Option::Some(value) => value,
                                ::std::option::Option::None => ::std::clone::Clone::clone(&self.$field),
                            },
                        )*
                    }
                }
            }
        }
    };
}
