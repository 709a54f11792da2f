use thiserror::Error;

/// The error type for every fallible `fibre_context` operation.
///
/// All errors are fatal for the container being built: there is no retry or
/// partial recovery. Variants carry the bean name, type and dependency under
/// contention so the component graph can be fixed.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Dependency of type {type_name} and name {name} hasn't been found for [{bean}] bean")]
  MissingDependency {
    type_name: String,
    name: String,
    bean: String,
  },

  #[error("There is more than one bean matching the {type_name} type: [{candidates}]. Please specify a bean name!")]
  NoUniqueBean {
    type_name: String,
    candidates: String,
  },

  #[error("More than one 'primary' bean found among candidates: [{candidates}]")]
  NoUniquePrimaryBean { candidates: String },

  #[error("Bean with type {type_name} not found")]
  NoSuchBean { type_name: String },

  #[error("Bean with name {name} and type {type_name} not found")]
  NoSuchBeanNamed { name: String, type_name: String },

  #[error("Bean with name '{bean}' can't be instantiated: {source}")]
  BeanInstanceCreation {
    bean: String,
    #[source]
    source: Box<Error>,
  },

  #[error("'{bean}' bean has no dependency that matches parameter '{parameter}'")]
  NoMatchingDependency { bean: String, parameter: String },

  #[error("Argument #{index} could not be converted to {type_name}")]
  ArgumentMismatch { index: usize, type_name: String },

  #[error("Field injection failed for bean instance of type {type_name}. Unresolved fields: {fields:?}")]
  FieldInjection {
    type_name: String,
    fields: Vec<String>,
  },

  #[error("Bean named `{bean}` has a supertype and one of its subtypes in dependencies and they have the same candidate for injection")]
  SameCandidate { bean: String },

  #[error("More than one bean definition is named '{name}'")]
  DuplicateBeanName { name: String },

  #[error("Circular dependency detected while initializing beans: {chain}")]
  CircularDependency { chain: String },

  #[error("Can't initialize beans: {source}")]
  InitializationPhase {
    #[source]
    source: Box<Error>,
  },

  #[error("ApplicationContext initialization has failed: {source}")]
  ContextInitialization {
    #[source]
    source: Box<Error>,
  },

  #[error("Can't invoke '{setter}' method: {source}")]
  SetterInvocation {
    setter: String,
    #[source]
    source: Box<Error>,
  },

  #[error("Post processor '{processor}' failed for bean '{bean}': {reason}")]
  PostProcessing {
    processor: String,
    bean: String,
    reason: String,
  },

  #[error("Failed to read settings file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse settings: {0}")]
  ConfigParse(String),
}

impl Error {
  /// Walks `source` wrappers down to the error that started the failure.
  pub fn root_cause(&self) -> &Error {
    match self {
      Error::BeanInstanceCreation { source, .. }
      | Error::SetterInvocation { source, .. }
      | Error::InitializationPhase { source }
      | Error::ContextInitialization { source } => source.root_cause(),
      other => other,
    }
  }
}

/// A specialized `Result` type for `fibre_context` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
