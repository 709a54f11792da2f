use crate::definition::BeanDefinition;
use crate::dependency::{BeanDependency, Dependencies};
use crate::error::{Error, Result};
use crate::registry::{select_unique, BeanDefinitionRegistry};

use tracing::{debug, trace};

/// Rewrites dependency names from type-derived defaults to the names of the
/// beans that will actually be injected.
///
/// After a successful pass every dependency name is a registry key, so the
/// initializer can look dependencies up by name alone. A second pass over a
/// resolved registry renames nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DependencyNameResolver;

impl DependencyNameResolver {
  pub fn new() -> Self {
    Self
  }

  /// Resolves every definition's dependencies and returns the number of
  /// dependency names that were rewritten.
  pub fn resolve(&self, registry: &mut BeanDefinitionRegistry) -> Result<usize> {
    let mut updates: Vec<(String, Dependencies)> = Vec::new();
    let mut renamed = 0;

    for definition in registry.all() {
      if definition.dependencies().is_empty() {
        continue;
      }
      trace!("Resolving dependency names of bean '{}'", definition.name());

      let mut resolved = Dependencies::with_capacity(definition.dependencies().len());
      let mut changed = false;
      for dependency in definition.dependencies().values() {
        let target = self.resolve_name(registry, definition, dependency)?;
        if target != dependency.name() {
          debug!(
            "Dependency '{}' of bean '{}' resolved to bean '{}'",
            dependency.name(),
            definition.name(),
            target
          );
          changed = true;
          renamed += 1;
        }
        resolved.insert(target.clone(), dependency.renamed(target));
      }

      if resolved.len() != definition.dependencies().len() {
        return Err(Error::SameCandidate {
          bean: definition.name().to_string(),
        });
      }
      if changed {
        updates.push((definition.name().to_string(), resolved));
      }
    }

    for (name, dependencies) in updates {
      registry.replace_dependencies(&name, dependencies);
    }
    Ok(renamed)
  }

  fn resolve_name(
    &self,
    registry: &BeanDefinitionRegistry,
    definition: &dyn BeanDefinition,
    dependency: &BeanDependency,
  ) -> Result<String> {
    if registry.by_name(dependency.name()).is_some() {
      return Ok(dependency.name().to_string());
    }

    let not_self = |candidate: &&dyn BeanDefinition| candidate.name() != definition.name();
    let mut candidates: Vec<&dyn BeanDefinition> = registry
      .by_exact_type(dependency.ty())
      .into_iter()
      .filter(not_self)
      .collect();
    if candidates.is_empty() {
      candidates = registry
        .by_assignable_type(dependency.ty())
        .into_iter()
        .filter(not_self)
        .collect();
    }

    select_unique(candidates, dependency.ty())?
      .map(|candidate| candidate.name().to_string())
      .ok_or_else(|| Error::MissingDependency {
        type_name: dependency.ty().name().to_string(),
        name: dependency.name().to_string(),
        bean: definition.name().to_string(),
      })
  }
}
