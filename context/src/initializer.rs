use crate::definition::BeanDefinition;
use crate::error::{Error, Result};
use crate::registry::BeanDefinitionRegistry;
use crate::resolver::DependencyNameResolver;

use std::cell::RefCell;
use tracing::{debug, info, trace};

/// Instantiates every definition of a registry, dependencies first.
///
/// No order is computed up front. The registry is walked in registration
/// order and each definition recursively initializes what it depends on
/// before it is built itself. The whole pass succeeds or fails as one unit.
#[derive(Debug, Default)]
pub struct BeanInitializer {
  resolver: DependencyNameResolver,
}

impl BeanInitializer {
  /// Resolves dependency names, then instantiates every definition.
  ///
  /// Failures are reported as [`Error::InitializationPhase`].
  pub fn initialize(&self, registry: &mut BeanDefinitionRegistry) -> Result<()> {
    self.run(registry).map_err(|source| Error::InitializationPhase {
      source: Box::new(source),
    })
  }

  fn run(&self, registry: &mut BeanDefinitionRegistry) -> Result<()> {
    self.resolver.resolve(registry)?;

    let pass = InitializationPass::new(registry);
    for definition in registry.all() {
      pass.initialize(definition)?;
    }
    info!("Initialized {} beans", registry.len());
    Ok(())
  }
}

// One depth-first walk over a registry. `in_progress` holds the chain of
// definitions currently being initialized, outermost first.
struct InitializationPass<'r> {
  registry: &'r BeanDefinitionRegistry,
  in_progress: RefCell<Vec<String>>,
}

impl<'r> InitializationPass<'r> {
  fn new(registry: &'r BeanDefinitionRegistry) -> Self {
    Self {
      registry,
      in_progress: RefCell::new(Vec::new()),
    }
  }

  fn initialize(&self, definition: &'r dyn BeanDefinition) -> Result<()> {
    if definition.is_instantiated() {
      return Ok(());
    }
    let _guard = InProgressGuard::enter(&self.in_progress, definition.name())?;
    trace!("Initializing bean '{}'", definition.name());

    let mut dependencies: Vec<&'r dyn BeanDefinition> = Vec::with_capacity(definition.dependencies().len());
    for dependency in definition.dependencies().values() {
      let target = self
        .registry
        .by_name(dependency.name())
        .ok_or_else(|| Error::MissingDependency {
          type_name: dependency.ty().name().to_string(),
          name: dependency.name().to_string(),
          bean: definition.name().to_string(),
        })?;
      if !target.is_instantiated() {
        debug!(
          "Bean '{}' requires '{}', initializing it first",
          definition.name(),
          target.name()
        );
        self.initialize(target)?;
      }
      dependencies.push(target);
    }

    definition.instantiate(&dependencies)
  }
}

// Marks a definition as in progress for as long as it is alive. Entering a
// definition that is already in progress means the graph has a cycle.
struct InProgressGuard<'a> {
  stack: &'a RefCell<Vec<String>>,
}

impl<'a> InProgressGuard<'a> {
  fn enter(stack: &'a RefCell<Vec<String>>, name: &str) -> Result<Self> {
    let mut names = stack.borrow_mut();
    if let Some(start) = names.iter().position(|entry| entry == name) {
      let mut chain: Vec<&str> = names[start..].iter().map(String::as_str).collect();
      chain.push(name);
      return Err(Error::CircularDependency {
        chain: chain.join(" -> "),
      });
    }
    names.push(name.to_string());
    Ok(Self { stack })
  }
}

impl Drop for InProgressGuard<'_> {
  fn drop(&mut self) {
    self.stack.borrow_mut().pop();
  }
}
