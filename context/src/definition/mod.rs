//! Bean definitions: metadata plus the lazy construction contract for one bean.

mod component;
mod factory;
mod mapper;

pub use component::{DefaultBeanDefinition, DefaultBeanDefinitionBuilder};
pub use factory::{FactoryBeanDefinition, FactoryBeanDefinitionBuilder};
pub use mapper::BeanDefinitionMapper;

use crate::dependency::Dependencies;
use crate::error::Result;
use crate::types::{BeanInstance, TypeRef};

use std::fmt;

/// Describes one bean and knows how to build it.
///
/// A definition is created during scanning, has its dependency names
/// rewritten once by the resolver, and is instantiated once by the
/// initializer. The instance moves from absent to present exactly once;
/// calling [`instantiate`](BeanDefinition::instantiate) again is a no-op.
pub trait BeanDefinition: Send + Sync {
  /// The unique registry key of this bean.
  fn name(&self) -> &str;

  /// The type of the produced instance.
  fn ty(&self) -> &TypeRef;

  fn dependencies(&self) -> &Dependencies;

  /// Swaps in a dependency map whose names have been resolved.
  fn replace_dependencies(&mut self, dependencies: Dependencies);

  /// Whether this bean wins ties among several type-compatible candidates.
  fn is_primary(&self) -> bool;

  fn instance(&self) -> Option<&BeanInstance>;

  fn is_instantiated(&self) -> bool {
    self.instance().is_some()
  }

  /// Builds the instance from already-instantiated dependency definitions.
  /// The order of `dependencies` is not significant.
  fn instantiate(&self, dependencies: &[&dyn BeanDefinition]) -> Result<()>;
}

impl<'a> fmt::Debug for dyn BeanDefinition + 'a {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BeanDefinition")
      .field("name", &self.name())
      .field("ty", &self.ty().name())
      .field("primary", &self.is_primary())
      .field("dependencies", &self.dependencies().keys().collect::<Vec<_>>())
      .field("instantiated", &self.is_instantiated())
      .finish()
  }
}

/// Collects the instances of the given dependency definitions into a
/// candidate pool.
pub(crate) fn instance_pool(dependencies: &[&dyn BeanDefinition]) -> Vec<BeanInstance> {
  dependencies
    .iter()
    .filter_map(|definition| definition.instance().cloned())
    .collect()
}
