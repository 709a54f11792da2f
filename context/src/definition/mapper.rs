use super::{BeanDefinition, DefaultBeanDefinitionBuilder, FactoryBeanDefinition};
use crate::injection::FactoryMethod;
use crate::types::Injectable;

use std::sync::Arc;
use tracing::debug;

/// Turns component builders and factory methods into boxed definitions
/// ready for a scanner to hand over.
pub struct BeanDefinitionMapper;

impl BeanDefinitionMapper {
  pub fn map_component<T>(builder: DefaultBeanDefinitionBuilder<T>) -> Box<dyn BeanDefinition>
  where
    T: Injectable + Send + Sync,
  {
    let definition = builder.build();
    debug!(
      "Created bean definition '{}' for component {}",
      definition.name(),
      definition.ty().simple_name()
    );
    Box::new(definition)
  }

  pub fn map_factory<C, Args, M, T>(
    factory: &Arc<C>,
    method_name: &str,
    method: M,
    primary: bool,
  ) -> Box<dyn BeanDefinition>
  where
    C: Send + Sync + 'static,
    M: FactoryMethod<C, Args, T>,
    T: Injectable + Send + Sync,
  {
    let mut builder = FactoryBeanDefinition::builder(Arc::clone(factory), method_name, method);
    if primary {
      builder = builder.primary();
    }
    let definition = builder.build();
    debug!(
      "Created bean definition '{}' for factory method {}::{}",
      definition.name(),
      std::any::type_name::<C>(),
      method_name
    );
    Box::new(definition)
  }
}
