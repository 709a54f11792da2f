use super::{instance_pool, BeanDefinition};
use crate::dependency::{dependencies_of, Dependencies};
use crate::error::{Error, Result};
use crate::injection::{self, Arguments, FactoryMethod};
use crate::types::{BeanInstance, Injectable, TypeRef};

use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, trace};

type InvokeFn<T> = Box<dyn Fn(&mut Arguments) -> Result<T> + Send + Sync>;

/// A bean produced by calling a method on a configuration object.
///
/// The method's parameters become the bean's dependencies. Factory beans
/// have no injectable fields.
pub struct FactoryBeanDefinition<T> {
  name: String,
  ty: TypeRef,
  primary: bool,
  dependencies: Dependencies,
  parameters: Vec<TypeRef>,
  invoke: InvokeFn<T>,
  instance: OnceCell<BeanInstance>,
}

impl<T: Injectable + Send + Sync> FactoryBeanDefinition<T> {
  /// Starts a definition whose instance is `method(&factory, ..)`. The bean
  /// is named after `method_name` unless renamed.
  pub fn builder<C, Args, M>(factory: Arc<C>, method_name: impl Into<String>, method: M) -> FactoryBeanDefinitionBuilder<T>
  where
    C: Send + Sync + 'static,
    M: FactoryMethod<C, Args, T>,
  {
    FactoryBeanDefinitionBuilder {
      name: method_name.into(),
      primary: false,
      parameters: method.parameters(),
      invoke: Box::new(move |arguments| method.invoke(&factory, arguments)),
    }
  }
}

impl<T: Injectable + Send + Sync> BeanDefinition for FactoryBeanDefinition<T> {
  fn name(&self) -> &str {
    &self.name
  }

  fn ty(&self) -> &TypeRef {
    &self.ty
  }

  fn dependencies(&self) -> &Dependencies {
    &self.dependencies
  }

  fn replace_dependencies(&mut self, dependencies: Dependencies) {
    self.dependencies = dependencies;
  }

  fn is_primary(&self) -> bool {
    self.primary
  }

  fn instance(&self) -> Option<&BeanInstance> {
    self.instance.get()
  }

  fn instantiate(&self, dependencies: &[&dyn BeanDefinition]) -> Result<()> {
    self.instance.get_or_try_init(|| {
      debug!("Invoking factory method for bean '{}'", self.name);

      let mut pool = instance_pool(dependencies);
      let created = if self.parameters.is_empty() {
        (self.invoke)(&mut Arguments::empty())
      } else {
        injection::resolve_arguments(&self.name, &self.parameters, &mut pool)
          .and_then(|mut arguments| (self.invoke)(&mut arguments))
      };

      created
        .map(|bean| BeanInstance::new(bean, self.ty.clone()))
        .map_err(|source| Error::BeanInstanceCreation {
          bean: self.name.clone(),
          source: Box::new(source),
        })
    })?;
    Ok(())
  }
}

/// Builder returned by [`FactoryBeanDefinition::builder`].
pub struct FactoryBeanDefinitionBuilder<T> {
  name: String,
  primary: bool,
  parameters: Vec<TypeRef>,
  invoke: InvokeFn<T>,
}

impl<T: Injectable + Send + Sync> FactoryBeanDefinitionBuilder<T> {
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn primary(mut self) -> Self {
    self.primary = true;
    self
  }

  pub fn build(self) -> FactoryBeanDefinition<T> {
    let dependencies = dependencies_of(&self.parameters);
    trace!("'{}' factory bean dependencies are {:?}", self.name, dependencies.values());

    FactoryBeanDefinition {
      name: self.name,
      ty: T::type_ref(),
      primary: self.primary,
      dependencies,
      parameters: self.parameters,
      invoke: self.invoke,
      instance: OnceCell::new(),
    }
  }
}
