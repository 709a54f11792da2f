//! # Fibre Context
//!
//! A small Inversion of Control runtime built around bean definitions.
//!
//! Components are described up front as bean definitions: a name, the type of
//! the instance, the dependencies it needs, and how to build it (a
//! constructor with optional field autowiring, or a factory method on a
//! configuration object). An [`ApplicationContext`] then
//!
//! 1. collects definitions from its [`BeanScanner`]s into a
//!    [`BeanDefinitionRegistry`],
//! 2. rewrites every dependency name to the bean that will satisfy it
//!    ([`DependencyNameResolver`]), using the primary marker to settle ties,
//! 3. instantiates each bean exactly once, dependencies first
//!    ([`BeanInitializer`]),
//! 4. runs the registered [`PostProcessor`]s, such as the
//!    [`SetterAutowiringPostProcessor`],
//!
//! and answers lookups by type or by name afterwards.
//!
//! ## Core Concepts
//!
//! - **Injectable types**: every type taking part in wiring implements
//!   [`Injectable`], usually through the [`injectable!`] macro, which also
//!   declares the traits a component may be injected as.
//! - **Primary beans**: when several beans fit a dependency, the one marked
//!   primary is chosen.
//! - **All or nothing**: any failure aborts context construction with an
//!   [`Error`] describing the bean and dependency involved.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_context::{injectable, ApplicationContext, ComponentScanner, DefaultBeanDefinition};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!   fn greet(&self) -> String;
//! }
//! injectable!(dyn Greeter);
//!
//! #[derive(Default)]
//! struct EnglishGreeter;
//! impl Greeter for EnglishGreeter {
//!   fn greet(&self) -> String {
//!     "Hello, World!".to_string()
//!   }
//! }
//! injectable!(EnglishGreeter: dyn Greeter);
//!
//! #[derive(Default)]
//! struct Banner {
//!   greeter: Option<Arc<dyn Greeter>>,
//! }
//! injectable!(Banner);
//!
//! let context = ApplicationContext::builder()
//!   .scanner(
//!     ComponentScanner::new("greetings")
//!       .component(DefaultBeanDefinition::<EnglishGreeter>::from_default())
//!       .component(
//!         DefaultBeanDefinition::<Banner>::from_default()
//!           .field("greeter", |banner: &mut Banner| &mut banner.greeter),
//!       ),
//!   )
//!   .build()
//!   .unwrap();
//!
//! let banner = context.get_bean::<Banner>().unwrap();
//! assert_eq!(banner.greeter.as_ref().unwrap().greet(), "Hello, World!");
//! ```

mod context;
mod definition;
mod dependency;
mod error;
mod initializer;
mod injection;
mod macros;
mod post_processor;
mod registry;
mod resolver;
mod scanner;
mod settings;
mod types;

pub use context::{ApplicationContext, ApplicationContextBuilder};
pub use definition::{
  BeanDefinition, BeanDefinitionMapper, DefaultBeanDefinition, DefaultBeanDefinitionBuilder,
  FactoryBeanDefinition, FactoryBeanDefinitionBuilder,
};
pub use dependency::{BeanDependency, Dependencies};
pub use error::{Error, Result};
pub use initializer::BeanInitializer;
pub use injection::{Arguments, Constructor, FactoryMethod};
pub use post_processor::{PostProcessor, SetterAutowiringPostProcessor};
pub use registry::BeanDefinitionRegistry;
pub use resolver::DependencyNameResolver;
pub use scanner::{BeanScanner, ComponentScanner, Configuration, ConfigurationScanner};
pub use settings::{find_config_file, find_config_file_in, DuplicateNamePolicy, Settings};
pub use types::{BeanInstance, Injectable, TypeRef, TypeRefBuilder};
