//! Public macros for describing injectable types.

/// Implements [`Injectable`](crate::Injectable) for a type.
///
/// There are two forms:
///
/// - `injectable!(Type)` or `injectable!(Type: dyn TraitA, dyn TraitB)` for a
///   concrete component type. Each listed trait becomes a supertype: beans of
///   `Type` can then be injected wherever `Arc<dyn TraitA>` is expected.
/// - `injectable!(dyn Trait)` or `injectable!(dyn Trait: dyn Parent)` for a
///   trait object type used as a dependency. Listed parents are recorded for
///   assignability ordering only.
///
/// Supertypes are not transitive: list every trait a component should be
/// injectable as.
///
/// # Examples
///
/// ```
/// use fibre_context::{injectable, Injectable, TypeRef};
///
/// trait Greeter: Send + Sync {
///   fn greet(&self) -> String;
/// }
/// injectable!(dyn Greeter);
///
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter {
///   fn greet(&self) -> String {
///     "Hello!".to_string()
///   }
/// }
/// injectable!(EnglishGreeter: dyn Greeter);
///
/// let greeter = TypeRef::of::<dyn Greeter>();
/// assert!(greeter.is_assignable_from(&EnglishGreeter::type_ref()));
/// ```
#[macro_export]
macro_rules! injectable {
    // Trait objects: injectable!(dyn Trait) / injectable!(dyn Trait: dyn Parent)
    (dyn $trait_path:path $(: $(dyn $parent:path),+ $(,)?)?) => {
        impl $crate::Injectable for dyn $trait_path {
            fn type_ref() -> $crate::TypeRef {
                $crate::TypeRef::builder::<dyn $trait_path>()
                    $($(.extends::<dyn $parent>())+)?
                    .build()
            }
        }
    };

    // Components: injectable!(Type) / injectable!(Type: dyn Trait, ...)
    ($type:ty $(: $($supertype:ty),+ $(,)?)?) => {
        impl $crate::Injectable for $type {
            fn type_ref() -> $crate::TypeRef {
                $crate::TypeRef::component::<$type>()
                    $($(.implements::<$supertype>(|bean| bean))+)?
                    .build()
            }
        }
    };
}
