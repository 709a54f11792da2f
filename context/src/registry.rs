use crate::definition::BeanDefinition;
use crate::dependency::Dependencies;
use crate::error::{Error, Result};
use crate::settings::DuplicateNamePolicy;
use crate::types::TypeRef;

use indexmap::IndexMap;
use tracing::{trace, warn};

/// An index over every bean definition of one container, keyed by bean name.
///
/// Membership is fixed at construction. Iteration follows registration
/// order, so traversals are deterministic within a run.
pub struct BeanDefinitionRegistry {
  definitions: IndexMap<String, Box<dyn BeanDefinition>>,
}

impl BeanDefinitionRegistry {
  /// Builds a registry, rejecting duplicate names.
  pub fn new(definitions: Vec<Box<dyn BeanDefinition>>) -> Result<Self> {
    Self::with_policy(definitions, DuplicateNamePolicy::Fail)
  }

  pub fn with_policy(definitions: Vec<Box<dyn BeanDefinition>>, policy: DuplicateNamePolicy) -> Result<Self> {
    let mut index = IndexMap::with_capacity(definitions.len());
    for definition in definitions {
      let name = definition.name().to_string();
      if index.contains_key(&name) {
        match policy {
          DuplicateNamePolicy::Fail => return Err(Error::DuplicateBeanName { name }),
          DuplicateNamePolicy::Overwrite => {
            warn!("Bean definition '{}' overrides an earlier definition with the same name", name);
          }
        }
      }
      index.insert(name, definition);
    }
    trace!("Registered {} bean definitions", index.len());
    Ok(Self { definitions: index })
  }

  pub fn by_name(&self, name: &str) -> Option<&dyn BeanDefinition> {
    self.definitions.get(name).map(|definition| definition.as_ref())
  }

  /// Definitions whose declared type is exactly `ty`.
  pub fn by_exact_type(&self, ty: &TypeRef) -> Vec<&dyn BeanDefinition> {
    self.all().filter(|definition| definition.ty() == ty).collect()
  }

  /// Definitions whose declared type is `ty` or one of its subtypes.
  pub fn by_assignable_type(&self, ty: &TypeRef) -> Vec<&dyn BeanDefinition> {
    self
      .all()
      .filter(|definition| ty.is_assignable_from(definition.ty()))
      .collect()
  }

  pub fn all(&self) -> impl Iterator<Item = &dyn BeanDefinition> + '_ {
    self.definitions.values().map(|definition| definition.as_ref())
  }

  pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
    self.definitions.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.definitions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  pub(crate) fn replace_dependencies(&mut self, name: &str, dependencies: Dependencies) {
    if let Some(definition) = self.definitions.get_mut(name) {
      definition.replace_dependencies(dependencies);
    }
  }
}

impl std::fmt::Debug for BeanDefinitionRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_list().entries(self.all()).finish()
  }
}

/// Picks the single candidate for `ty`: the only one, or the only primary one
/// among several. `Ok(None)` means there were no candidates at all.
pub(crate) fn select_unique<'a>(
  candidates: Vec<&'a dyn BeanDefinition>,
  ty: &TypeRef,
) -> Result<Option<&'a dyn BeanDefinition>> {
  if candidates.len() <= 1 {
    return Ok(candidates.into_iter().next());
  }

  let primaries: Vec<&'a dyn BeanDefinition> = candidates
    .iter()
    .copied()
    .filter(|candidate| candidate.is_primary())
    .collect();

  match primaries.as_slice() {
    [primary] => Ok(Some(*primary)),
    [] => Err(Error::NoUniqueBean {
      type_name: ty.name().to_string(),
      candidates: join_names(&candidates),
    }),
    _ => Err(Error::NoUniquePrimaryBean {
      candidates: join_names(&primaries),
    }),
  }
}

fn join_names(definitions: &[&dyn BeanDefinition]) -> String {
  definitions
    .iter()
    .map(|definition| format!("{}: {}", definition.name(), definition.ty().simple_name()))
    .collect::<Vec<_>>()
    .join(", ")
}
