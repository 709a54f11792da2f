//! Sources of bean definitions.
//!
//! Components are registered explicitly rather than discovered: a
//! [`ComponentScanner`] collects constructor-based definitions, and a
//! [`ConfigurationScanner`] collects factory methods declared on
//! configuration objects.

use crate::definition::{BeanDefinition, BeanDefinitionMapper, DefaultBeanDefinitionBuilder};
use crate::error::Result;
use crate::injection::FactoryMethod;
use crate::types::Injectable;

use std::sync::Arc;
use tracing::{debug, info, warn};

/// Produces the bean definitions a container is built from.
///
/// `scan` hands over everything gathered so far; a second call yields only
/// what was added since.
pub trait BeanScanner {
  fn scan(&mut self) -> Result<Vec<Box<dyn BeanDefinition>>>;
}

/// Collects component definitions registered under a label (typically the
/// module they belong to).
pub struct ComponentScanner {
  label: String,
  pending: Vec<Box<dyn BeanDefinition>>,
}

impl ComponentScanner {
  pub fn new(label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      pending: Vec::new(),
    }
  }

  pub fn component<T>(mut self, builder: DefaultBeanDefinitionBuilder<T>) -> Self
  where
    T: Injectable + Send + Sync,
  {
    self.pending.push(BeanDefinitionMapper::map_component(builder));
    self
  }
}

impl BeanScanner for ComponentScanner {
  fn scan(&mut self) -> Result<Vec<Box<dyn BeanDefinition>>> {
    info!("Scanning components in '{}'", self.label);
    if self.pending.is_empty() {
      warn!("No components registered in '{}'", self.label);
    }
    let definitions = std::mem::take(&mut self.pending);
    debug!("Found {} components in '{}'", definitions.len(), self.label);
    Ok(definitions)
  }
}

/// A configuration object together with the factory methods it exposes as
/// beans.
///
/// ```
/// use fibre_context::{injectable, Configuration};
/// use std::sync::Arc;
///
/// struct Pool { size: usize }
/// injectable!(Pool);
///
/// struct DatabaseConfig { size: usize }
///
/// let configuration = Configuration::new(DatabaseConfig { size: 4 })
///   .bean("pool", |config: &DatabaseConfig| Pool { size: config.size });
/// assert_eq!(configuration.len(), 1);
/// ```
pub struct Configuration<C> {
  factory: Arc<C>,
  definitions: Vec<Box<dyn BeanDefinition>>,
}

impl<C: Send + Sync + 'static> Configuration<C> {
  pub fn new(factory: C) -> Self {
    Self::from_arc(Arc::new(factory))
  }

  pub fn from_arc(factory: Arc<C>) -> Self {
    Self {
      factory,
      definitions: Vec::new(),
    }
  }

  /// Declares a factory method producing the bean `name`.
  pub fn bean<Args, M, T>(self, name: &str, method: M) -> Self
  where
    M: FactoryMethod<C, Args, T>,
    T: Injectable + Send + Sync,
  {
    self.declare(name, method, false)
  }

  /// Like [`bean`](Configuration::bean), but marks the bean as primary.
  pub fn primary_bean<Args, M, T>(self, name: &str, method: M) -> Self
  where
    M: FactoryMethod<C, Args, T>,
    T: Injectable + Send + Sync,
  {
    self.declare(name, method, true)
  }

  pub fn len(&self) -> usize {
    self.definitions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  fn declare<Args, M, T>(mut self, name: &str, method: M, primary: bool) -> Self
  where
    M: FactoryMethod<C, Args, T>,
    T: Injectable + Send + Sync,
  {
    let definition = BeanDefinitionMapper::map_factory(&self.factory, name, method, primary);
    self.definitions.push(definition);
    self
  }
}

/// Collects the factory-method beans of several configuration objects.
#[derive(Default)]
pub struct ConfigurationScanner {
  pending: Vec<Box<dyn BeanDefinition>>,
  configurations: usize,
}

impl ConfigurationScanner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn configuration<C: Send + Sync + 'static>(mut self, configuration: Configuration<C>) -> Self {
    debug!(
      "Registering configuration {} with {} bean methods",
      std::any::type_name::<C>(),
      configuration.len()
    );
    self.pending.extend(configuration.definitions);
    self.configurations += 1;
    self
  }
}

impl BeanScanner for ConfigurationScanner {
  fn scan(&mut self) -> Result<Vec<Box<dyn BeanDefinition>>> {
    info!("Scanning {} configurations", self.configurations);
    if self.pending.is_empty() {
      warn!("No bean methods found in configurations");
    }
    let definitions = std::mem::take(&mut self.pending);
    debug!("Found {} bean methods", definitions.len());
    Ok(definitions)
  }
}
