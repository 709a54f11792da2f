//! Runtime type descriptors used in place of reflection.
//!
//! Every type that takes part in wiring (a bean type, a constructor or factory
//! parameter, an injectable field) is described by a [`TypeRef`]. A `TypeRef`
//! knows its `TypeId`, its name and the supertypes it may be viewed as, which
//! is all the container needs to answer "is this bean assignable to that
//! parameter?" and to hand the bean over as an `Arc` of the requested type.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;
pub(crate) type AnyBox = Box<dyn Any + Send + Sync>;

// Produces a `Box<Arc<X>>` view of an erased instance, where `X` is either the
// concrete type or one of its supertypes.
type View = Arc<dyn Fn(&AnyArc) -> Option<AnyBox> + Send + Sync>;

/// Implemented by every type the container can inject or produce.
///
/// Use the [`injectable!`](crate::injectable) macro rather than implementing
/// this by hand.
pub trait Injectable: 'static {
  fn type_ref() -> TypeRef;
}

/// A cheap-to-clone description of a Rust type and its declared supertypes.
#[derive(Clone)]
pub struct TypeRef {
  inner: Arc<TypeInfo>,
}

struct TypeInfo {
  id: TypeId,
  name: &'static str,
  view: Option<View>,
  supertypes: Vec<Supertype>,
}

struct Supertype {
  id: TypeId,
  name: &'static str,
  view: Option<View>,
}

impl TypeRef {
  /// A bare descriptor: identity only, no supertypes.
  pub fn of<T: ?Sized + 'static>() -> Self {
    TypeRef::builder::<T>().build()
  }

  /// Starts describing a type that is never instantiated directly, typically
  /// a `dyn Trait`.
  pub fn builder<T: ?Sized + 'static>() -> TypeRefBuilder<T> {
    TypeRefBuilder {
      info: TypeInfo {
        id: TypeId::of::<T>(),
        name: std::any::type_name::<T>(),
        view: None,
        supertypes: Vec::new(),
      },
      _marker: PhantomData,
    }
  }

  /// Starts describing a concrete component type whose instances the
  /// container stores and hands out.
  pub fn component<T: Any + Send + Sync>() -> TypeRefBuilder<T> {
    let mut builder = TypeRef::builder::<T>();
    builder.info.view = Some(Arc::new(|value: &AnyArc| {
      value
        .clone()
        .downcast::<T>()
        .ok()
        .map(|concrete| Box::new(concrete) as AnyBox)
    }));
    builder
  }

  pub fn id(&self) -> TypeId {
    self.inner.id
  }

  /// The fully qualified name, as reported by `std::any::type_name`.
  pub fn name(&self) -> &'static str {
    self.inner.name
  }

  /// The last path segment of the name, without generic arguments.
  pub fn simple_name(&self) -> String {
    let name = self.inner.name;
    let (prefix, base) = match name.strip_prefix("dyn ") {
      Some(rest) => ("dyn ", rest),
      None => ("", name),
    };
    let base = base.split('<').next().unwrap_or(base);
    let last = base.rsplit("::").next().unwrap_or(base);
    format!("{}{}", prefix, last)
  }

  /// Names of the declared supertypes, in declaration order.
  pub fn supertype_names(&self) -> Vec<&'static str> {
    self.inner.supertypes.iter().map(|s| s.name).collect()
  }

  /// Returns `true` if a value of type `other` can be used where `self` is
  /// expected: the types are the same, or `other` declares `self` as one of
  /// its supertypes.
  pub fn is_assignable_from(&self, other: &TypeRef) -> bool {
    self.inner.id == other.inner.id || other.inner.supertypes.iter().any(|s| s.id == self.inner.id)
  }

  /// Views an instance of this type as `target`, producing a `Box<Arc<target>>`.
  pub(crate) fn view(&self, value: &AnyArc, target: &TypeRef) -> Option<AnyBox> {
    if self.inner.id == target.inner.id {
      return self.inner.view.as_ref().and_then(|view| view(value));
    }
    self
      .inner
      .supertypes
      .iter()
      .find(|s| s.id == target.inner.id)
      .and_then(|s| s.view.as_ref())
      .and_then(|view| view(value))
  }
}

impl PartialEq for TypeRef {
  fn eq(&self, other: &Self) -> bool {
    self.inner.id == other.inner.id
  }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.inner.id.hash(state);
  }
}

impl fmt::Debug for TypeRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.inner.supertypes.is_empty() {
      write!(f, "TypeRef({})", self.inner.name)
    } else {
      write!(
        f,
        "TypeRef({}: {})",
        self.inner.name,
        self.supertype_names().join(" + ")
      )
    }
  }
}

impl fmt::Display for TypeRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.inner.name)
  }
}

/// Builder returned by [`TypeRef::builder`] and [`TypeRef::component`].
pub struct TypeRefBuilder<T: ?Sized + 'static> {
  info: TypeInfo,
  _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized + 'static> TypeRefBuilder<T> {
  /// Declares `S` as a supertype for assignability checks only. Used for
  /// trait objects whose trait extends another trait.
  pub fn extends<S: ?Sized + 'static>(mut self) -> Self {
    self.info.supertypes.push(Supertype {
      id: TypeId::of::<S>(),
      name: std::any::type_name::<S>(),
      view: None,
    });
    self
  }

  pub fn build(self) -> TypeRef {
    TypeRef {
      inner: Arc::new(self.info),
    }
  }
}

impl<T: Any + Send + Sync> TypeRefBuilder<T> {
  /// Declares that instances of `T` may be injected wherever an `Arc<S>` is
  /// expected. `upcast` performs the unsizing, usually `|bean| bean`.
  pub fn implements<S: ?Sized + Send + Sync + 'static>(mut self, upcast: fn(Arc<T>) -> Arc<S>) -> Self {
    self.info.supertypes.push(Supertype {
      id: TypeId::of::<S>(),
      name: std::any::type_name::<S>(),
      view: Some(Arc::new(move |value: &AnyArc| {
        value
          .clone()
          .downcast::<T>()
          .ok()
          .map(|concrete| Box::new(upcast(concrete)) as AnyBox)
      })),
    });
    self
  }
}

/// A built bean: a shared, type-erased instance plus the type it was declared as.
#[derive(Clone)]
pub struct BeanInstance {
  value: AnyArc,
  ty: TypeRef,
}

impl BeanInstance {
  pub(crate) fn new<T: Any + Send + Sync>(value: T, ty: TypeRef) -> Self {
    Self {
      value: Arc::new(value),
      ty,
    }
  }

  /// The declared type of the bean.
  pub fn ty(&self) -> &TypeRef {
    &self.ty
  }

  /// Returns the bean as `Arc<P>`, where `P` is the bean's own type or one of
  /// its declared supertypes.
  pub fn get<P: ?Sized + Injectable>(&self) -> Option<Arc<P>> {
    self.get_as(&P::type_ref())
  }

  pub(crate) fn get_as<P: ?Sized + 'static>(&self, target: &TypeRef) -> Option<Arc<P>> {
    self
      .view(target)
      .and_then(|view| view.downcast::<Arc<P>>().ok())
      .map(|arc| *arc)
  }

  pub(crate) fn view(&self, target: &TypeRef) -> Option<AnyBox> {
    self.ty.view(&self.value, target)
  }

  /// Returns `true` if both handles point at the same bean.
  pub fn ptr_eq(&self, other: &BeanInstance) -> bool {
    Arc::ptr_eq(&self.value, &other.value)
  }
}

impl fmt::Debug for BeanInstance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BeanInstance")
      .field("ty", &self.ty.name())
      .finish_non_exhaustive()
  }
}
