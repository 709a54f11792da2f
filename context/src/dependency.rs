use crate::types::TypeRef;

use indexmap::IndexMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The dependencies of one bean definition, keyed by dependency name in
/// declaration order.
pub type Dependencies = IndexMap<String, BeanDependency>;

/// A named, typed reference to a bean another bean requires.
///
/// The name starts out as the type's default name and is rewritten by the
/// [`DependencyNameResolver`](crate::DependencyNameResolver) to the name of the
/// bean that will actually be injected. Two descriptors are equal when their
/// names are equal.
#[derive(Clone)]
pub struct BeanDependency {
  name: String,
  ty: TypeRef,
}

impl BeanDependency {
  pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
    Self {
      name: name.into(),
      ty,
    }
  }

  /// A dependency on `ty` under its default name.
  pub fn from_type(ty: TypeRef) -> Self {
    Self::new(ty.name(), ty)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn ty(&self) -> &TypeRef {
    &self.ty
  }

  pub(crate) fn renamed(&self, name: impl Into<String>) -> Self {
    Self::new(name, self.ty.clone())
  }
}

impl PartialEq for BeanDependency {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
  }
}

impl Eq for BeanDependency {}

impl Hash for BeanDependency {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
  }
}

impl fmt::Debug for BeanDependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "BeanDependency({}: {})", self.name, self.ty.name())
  }
}

/// Builds a dependency map from a list of types, collapsing repeated types
/// onto one entry.
pub(crate) fn dependencies_of<'a>(types: impl IntoIterator<Item = &'a TypeRef>) -> Dependencies {
  types
    .into_iter()
    .map(|ty| BeanDependency::from_type(ty.clone()))
    .map(|dependency| (dependency.name.clone(), dependency))
    .collect()
}
