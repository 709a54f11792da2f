use crate::context::ApplicationContext;
use crate::error::{Error, Result};
use crate::types::{BeanInstance, Injectable, TypeRef};

use std::sync::Arc;
use tracing::{debug, trace};

/// A hook that runs once per bean after the whole graph is initialized.
///
/// Post-processors see fully wired beans and the completed context, so they
/// can look up other beans. Beans are visited in registration order, and each
/// bean goes through every post-processor in the order they were added to the
/// [`ApplicationContextBuilder`](crate::ApplicationContextBuilder). An `Err`
/// aborts context construction.
pub trait PostProcessor: Send + Sync {
  /// A label used in logs and errors.
  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }

  fn process(&self, bean_name: &str, bean: &BeanInstance, context: &ApplicationContext) -> Result<()>;
}

type SetterFn = Box<dyn Fn(&BeanInstance, &ApplicationContext) -> Result<()> + Send + Sync>;

// One registered setter: applies to beans viewable as `bean_ty`.
struct Setter {
  name: String,
  bean_ty: TypeRef,
  invoke: SetterFn,
}

/// Injects dependencies through setters once the graph is initialized.
///
/// Each setter is registered for a bean type `B` and a dependency type `D`.
/// Every bean that can be viewed as `B` gets its setter called with the bean
/// [`ApplicationContext::get_bean`] returns for `D`, so the usual primary
/// rule applies. Setters fit slots that are filled after construction, such
/// as a `OnceCell<Arc<D>>`.
///
/// ```
/// use fibre_context::{
///   injectable, ApplicationContext, ComponentScanner, DefaultBeanDefinition, SetterAutowiringPostProcessor,
/// };
/// use once_cell::sync::OnceCell;
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Clock;
/// injectable!(Clock);
///
/// #[derive(Default)]
/// struct Scheduler {
///   clock: OnceCell<Arc<Clock>>,
/// }
/// injectable!(Scheduler);
///
/// let context = ApplicationContext::builder()
///   .scanner(
///     ComponentScanner::new("app")
///       .component(DefaultBeanDefinition::<Clock>::from_default())
///       .component(DefaultBeanDefinition::<Scheduler>::from_default()),
///   )
///   .post_processor(SetterAutowiringPostProcessor::new().setter(
///     "set_clock",
///     |scheduler: &Scheduler, clock: Arc<Clock>| {
///       let _ = scheduler.clock.set(clock);
///     },
///   ))
///   .build()
///   .unwrap();
///
/// assert!(context.get_bean::<Scheduler>().unwrap().clock.get().is_some());
/// ```
#[derive(Default)]
pub struct SetterAutowiringPostProcessor {
  setters: Vec<Setter>,
}

impl SetterAutowiringPostProcessor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `setter` for beans of type `B`, fed with the bean of type `D`.
  ///
  /// Setters run in registration order. A dependency that cannot be looked
  /// up fails with [`Error::SetterInvocation`].
  pub fn setter<B, D, F>(mut self, name: impl Into<String>, setter: F) -> Self
  where
    B: ?Sized + Injectable,
    D: ?Sized + Injectable,
    F: Fn(&B, Arc<D>) + Send + Sync + 'static,
  {
    let name = name.into();
    let setter_name = name.clone();
    self.setters.push(Setter {
      name,
      bean_ty: B::type_ref(),
      invoke: Box::new(move |bean, context| {
        let Some(target) = bean.get::<B>() else {
          return Ok(());
        };
        let dependency = context.get_bean::<D>().map_err(|source| Error::SetterInvocation {
          setter: setter_name.clone(),
          source: Box::new(source),
        })?;
        setter(&*target, dependency);
        Ok(())
      }),
    });
    self
  }

  pub fn len(&self) -> usize {
    self.setters.len()
  }

  pub fn is_empty(&self) -> bool {
    self.setters.is_empty()
  }
}

impl PostProcessor for SetterAutowiringPostProcessor {
  fn name(&self) -> &str {
    "SetterAutowiringPostProcessor"
  }

  fn process(&self, bean_name: &str, bean: &BeanInstance, context: &ApplicationContext) -> Result<()> {
    for setter in &self.setters {
      if !setter.bean_ty.is_assignable_from(bean.ty()) {
        continue;
      }
      trace!("Trying to inject bean '{}' through setter '{}'", bean_name, setter.name);
      (setter.invoke)(bean, context)?;
      debug!("Setter '{}' of bean '{}' has been invoked", setter.name, bean_name);
    }
    Ok(())
  }
}
