use super::{instance_pool, BeanDefinition};
use crate::dependency::{dependencies_of, Dependencies};
use crate::error::{Error, Result};
use crate::injection::{self, Arguments, Constructor};
use crate::types::{AnyBox, BeanInstance, Injectable, TypeRef};

use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, trace, warn};

type ConstructorFn<T> = Box<dyn Fn(&mut Arguments) -> Result<T> + Send + Sync>;

// An injectable `Option<Arc<F>>` slot inside `T`.
struct FieldInjector<T> {
  name: String,
  ty: TypeRef,
  inject: Box<dyn Fn(&mut T, AnyBox) -> Result<()> + Send + Sync>,
  is_set: Box<dyn Fn(&mut T) -> bool + Send + Sync>,
}

/// A bean produced by a constructor, optionally followed by field
/// autowiring.
///
/// Constructor parameters and injectable fields both become dependencies,
/// named after their type until the resolver says otherwise.
pub struct DefaultBeanDefinition<T> {
  name: String,
  ty: TypeRef,
  primary: bool,
  dependencies: Dependencies,
  parameters: Vec<TypeRef>,
  constructor: ConstructorFn<T>,
  fields: Vec<FieldInjector<T>>,
  instance: OnceCell<BeanInstance>,
}

impl<T: Injectable + Send + Sync> DefaultBeanDefinition<T> {
  /// Starts a definition that builds `T` with `constructor`.
  ///
  /// ```
  /// use fibre_context::{injectable, DefaultBeanDefinition, BeanDefinition};
  /// use std::sync::Arc;
  ///
  /// #[derive(Default)]
  /// struct Repo;
  /// injectable!(Repo);
  ///
  /// struct Service {
  ///   repo: Arc<Repo>,
  /// }
  /// injectable!(Service);
  ///
  /// let definition = DefaultBeanDefinition::builder(|repo: Arc<Repo>| Service { repo })
  ///   .name("service")
  ///   .build();
  /// assert_eq!(definition.name(), "service");
  /// assert_eq!(definition.dependencies().len(), 1);
  /// ```
  pub fn builder<Args, C>(constructor: C) -> DefaultBeanDefinitionBuilder<T>
  where
    C: Constructor<Args, T>,
  {
    DefaultBeanDefinitionBuilder {
      name: None,
      primary: false,
      parameters: constructor.parameters(),
      constructor: Box::new(move |arguments| constructor.construct(arguments)),
      fields: Vec::new(),
    }
  }

  /// Starts a definition that builds `T` with `T::default()`.
  pub fn from_default() -> DefaultBeanDefinitionBuilder<T>
  where
    T: Default,
  {
    Self::builder(T::default)
  }

  fn create_instance(&self, pool: &mut Vec<BeanInstance>) -> Result<BeanInstance> {
    let mut arguments = if self.parameters.is_empty() {
      Arguments::empty()
    } else {
      injection::resolve_arguments(&self.name, &self.parameters, pool)?
    };
    let mut bean = (self.constructor)(&mut arguments)?;

    if !self.fields.is_empty() {
      if !pool.is_empty() {
        self.autowire_fields(&mut bean, pool)?;
      }
      self.verify_fields(&mut bean)?;
    }

    Ok(BeanInstance::new(bean, self.ty.clone()))
  }

  fn autowire_fields(&self, bean: &mut T, pool: &mut Vec<BeanInstance>) -> Result<()> {
    let field_types: Vec<TypeRef> = self.fields.iter().map(|field| field.ty.clone()).collect();

    for index in injection::subclasses_first(&field_types) {
      let field = &self.fields[index];
      let Some(candidate) = injection::take_match(pool, &field.ty) else {
        continue;
      };
      debug!(
        "Injecting field '{}' of bean '{}' with a bean of type {}",
        field.name,
        self.name,
        candidate.ty().name()
      );
      let value = candidate.view(&field.ty).ok_or_else(|| Error::ArgumentMismatch {
        index,
        type_name: field.ty.name().to_string(),
      })?;
      (field.inject)(bean, value)?;
    }
    Ok(())
  }

  fn verify_fields(&self, bean: &mut T) -> Result<()> {
    let unresolved: Vec<String> = self
      .fields
      .iter()
      .filter(|field| !(field.is_set)(bean))
      .map(|field| field.name.clone())
      .collect();

    if unresolved.is_empty() {
      return Ok(());
    }
    warn!("Could not autowire the following fields: {:?}", unresolved);
    Err(Error::FieldInjection {
      type_name: self.ty.name().to_string(),
      fields: unresolved,
    })
  }
}

impl<T: Injectable + Send + Sync> BeanDefinition for DefaultBeanDefinition<T> {
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
      debug!("Instantiating bean: '{}' of type {}", self.name, self.ty.name());
      trace!(
        "Bean '{}' of type {} has the following dependencies: {:?}",
        self.name,
        self.ty.name(),
        dependencies.iter().map(|d| d.name()).collect::<Vec<_>>()
      );

      let mut pool = instance_pool(dependencies);
      let instance = self
        .create_instance(&mut pool)
        .map_err(|source| Error::BeanInstanceCreation {
          bean: self.name.clone(),
          source: Box::new(source),
        })?;

      debug!("Bean '{}' of type {} has been instantiated", self.name, self.ty.name());
      Ok::<_, Error>(instance)
    })?;
    Ok(())
  }
}

/// Builder returned by [`DefaultBeanDefinition::builder`].
pub struct DefaultBeanDefinitionBuilder<T> {
  name: Option<String>,
  primary: bool,
  parameters: Vec<TypeRef>,
  constructor: ConstructorFn<T>,
  fields: Vec<FieldInjector<T>>,
}

impl<T: Injectable + Send + Sync> DefaultBeanDefinitionBuilder<T> {
  /// Overrides the default name (the type's full name).
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Marks the bean as primary.
  pub fn primary(mut self) -> Self {
    self.primary = true;
    self
  }

  /// Declares an injectable field. `slot` gives access to the
  /// `Option<Arc<F>>` the container fills in after construction.
  ///
  /// Fields are matched in declaration order, after the subclass-first sort.
  pub fn field<F>(mut self, name: impl Into<String>, slot: fn(&mut T) -> &mut Option<Arc<F>>) -> Self
  where
    F: ?Sized + Injectable,
  {
    let index = self.fields.len();
    let ty = F::type_ref();
    let type_name = ty.name();
    self.fields.push(FieldInjector {
      name: name.into(),
      ty,
      inject: Box::new(move |bean, value| {
        let value = value
          .downcast::<Arc<F>>()
          .map_err(|_| Error::ArgumentMismatch {
            index,
            type_name: type_name.to_string(),
          })?;
        *slot(bean) = Some(*value);
        Ok(())
      }),
      is_set: Box::new(move |bean| slot(bean).is_some()),
    });
    self
  }

  pub fn build(self) -> DefaultBeanDefinition<T> {
    let ty = T::type_ref();
    let name = self.name.unwrap_or_else(|| ty.name().to_string());
    trace!("Bean name is '{}'", name);

    let mut dependencies = dependencies_of(&self.parameters);
    dependencies.extend(dependencies_of(self.fields.iter().map(|field| &field.ty)));
    trace!("'{}' bean dependencies are {:?}", name, dependencies.values());

    DefaultBeanDefinition {
      name,
      ty,
      primary: self.primary,
      dependencies,
      parameters: self.parameters,
      constructor: self.constructor,
      fields: self.fields,
      instance: OnceCell::new(),
    }
  }
}
