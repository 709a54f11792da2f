//! The `ApplicationContext`: a frozen, fully wired bean graph.

use crate::error::{Error, Result};
use crate::initializer::BeanInitializer;
use crate::post_processor::PostProcessor;
use crate::registry::{select_unique, BeanDefinitionRegistry};
use crate::scanner::BeanScanner;
use crate::settings::Settings;
use crate::types::{BeanInstance, Injectable};

use dashmap::DashMap;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A container whose beans are all built and wired.
///
/// A context only exists once every phase succeeded: scanning, registry
/// construction, dependency resolution, initialization and post-processing.
/// After that it is read-only and may be shared across threads.
///
/// ```
/// use fibre_context::{injectable, ApplicationContext, ComponentScanner, DefaultBeanDefinition};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Clock;
/// injectable!(Clock);
///
/// struct Scheduler {
///   clock: Arc<Clock>,
/// }
/// injectable!(Scheduler);
///
/// let context = ApplicationContext::builder()
///   .scanner(
///     ComponentScanner::new("app")
///       .component(DefaultBeanDefinition::<Clock>::from_default())
///       .component(DefaultBeanDefinition::builder(|clock: Arc<Clock>| Scheduler { clock })),
///   )
///   .build()
///   .unwrap();
///
/// let scheduler = context.get_bean::<Scheduler>().unwrap();
/// assert!(Arc::ptr_eq(&scheduler.clock, &context.get_bean::<Clock>().unwrap()));
/// ```
pub struct ApplicationContext {
  registry: BeanDefinitionRegistry,
  beans: DashMap<String, BeanInstance>,
}

impl ApplicationContext {
  pub fn builder() -> ApplicationContextBuilder {
    ApplicationContextBuilder::default()
  }

  /// Returns the single bean assignable to `T`.
  ///
  /// With several candidates the one marked primary wins; without exactly
  /// one primary the lookup fails.
  pub fn get_bean<T: ?Sized + Injectable>(&self) -> Result<Arc<T>> {
    let ty = T::type_ref();
    let candidates = self.registry.by_assignable_type(&ty);
    select_unique(candidates, &ty)?
      .and_then(|definition| definition.instance())
      .and_then(|instance| instance.get_as::<T>(&ty))
      .ok_or_else(|| Error::NoSuchBean {
        type_name: ty.simple_name(),
      })
  }

  /// Returns the bean registered as `name`, provided it is assignable to `T`.
  pub fn get_bean_named<T: ?Sized + Injectable>(&self, name: &str) -> Result<Arc<T>> {
    let ty = T::type_ref();
    self
      .beans
      .get(name)
      .and_then(|instance| instance.get_as::<T>(&ty))
      .ok_or_else(|| Error::NoSuchBeanNamed {
        name: name.to_string(),
        type_name: ty.simple_name(),
      })
  }

  /// Returns every bean assignable to `T`, keyed by bean name, in
  /// registration order.
  pub fn get_all_beans<T: ?Sized + Injectable>(&self) -> IndexMap<String, Arc<T>> {
    let ty = T::type_ref();
    self
      .registry
      .by_assignable_type(&ty)
      .into_iter()
      .filter_map(|definition| {
        let bean = definition.instance()?.get_as::<T>(&ty)?;
        Some((definition.name().to_string(), bean))
      })
      .collect()
  }

  /// The type-erased bean registered as `name`.
  pub fn instance(&self, name: &str) -> Option<BeanInstance> {
    self.beans.get(name).map(|entry| entry.value().clone())
  }

  pub fn contains_bean(&self, name: &str) -> bool {
    self.beans.contains_key(name)
  }

  /// Bean names in registration order.
  pub fn bean_names(&self) -> Vec<String> {
    self.registry.names().map(str::to_string).collect()
  }

  pub fn len(&self) -> usize {
    self.registry.len()
  }

  pub fn is_empty(&self) -> bool {
    self.registry.is_empty()
  }

  pub fn registry(&self) -> &BeanDefinitionRegistry {
    &self.registry
  }

  fn post_process(&self, post_processors: &[Box<dyn PostProcessor>]) -> Result<()> {
    if post_processors.is_empty() {
      return Ok(());
    }
    for definition in self.registry.all() {
      let Some(bean) = definition.instance() else {
        continue;
      };
      for post_processor in post_processors {
        debug!("Post-processing bean '{}' with {}", definition.name(), post_processor.name());
        post_processor
          .process(definition.name(), bean, self)
          .map_err(|e| Error::PostProcessing {
            processor: post_processor.name().to_string(),
            bean: definition.name().to_string(),
            reason: e.to_string(),
          })?;
      }
    }
    Ok(())
  }
}

impl std::fmt::Debug for ApplicationContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ApplicationContext")
      .field("beans", &self.bean_names())
      .finish()
  }
}

/// Assembles an [`ApplicationContext`] from scanners, post-processors and
/// settings.
#[derive(Default)]
pub struct ApplicationContextBuilder {
  scanners: Vec<Box<dyn BeanScanner>>,
  post_processors: Vec<Box<dyn PostProcessor>>,
  settings: Settings,
}

impl ApplicationContextBuilder {
  pub fn scanner(mut self, scanner: impl BeanScanner + 'static) -> Self {
    self.scanners.push(Box::new(scanner));
    self
  }

  pub fn post_processor(mut self, post_processor: impl PostProcessor + 'static) -> Self {
    self.post_processors.push(Box::new(post_processor));
    self
  }

  pub fn settings(mut self, settings: Settings) -> Self {
    self.settings = settings;
    self
  }

  /// Runs every phase and returns the finished context.
  ///
  /// Failures are reported as [`Error::ContextInitialization`].
  pub fn build(self) -> Result<ApplicationContext> {
    self.try_build().map_err(|source| Error::ContextInitialization {
      source: Box::new(source),
    })
  }

  fn try_build(mut self) -> Result<ApplicationContext> {
    let mut definitions = Vec::new();
    for scanner in &mut self.scanners {
      definitions.extend(scanner.scan()?);
    }

    let mut registry = BeanDefinitionRegistry::with_policy(definitions, self.settings.duplicate_names)?;
    BeanInitializer::default().initialize(&mut registry)?;

    let beans = DashMap::with_capacity(registry.len());
    for definition in registry.all() {
      if let Some(instance) = definition.instance() {
        beans.insert(definition.name().to_string(), instance.clone());
      }
    }

    let context = ApplicationContext { registry, beans };
    if self.settings.post_processing {
      context.post_process(&self.post_processors)?;
    }

    info!("Application context initialization has been finished");
    Ok(context)
  }
}
