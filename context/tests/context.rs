// context/tests/context.rs

//! End-to-end tests for `ApplicationContext`: building from scanners, bean
//! lookups, post-processing and settings.

use fibre_context::{
  injectable, ApplicationContext, BeanDefinition, BeanInstance, ComponentScanner, Configuration, ConfigurationScanner,
  DefaultBeanDefinition, DuplicateNamePolicy, Error, PostProcessor, Result, SetterAutowiringPostProcessor,
  Settings,
};
use once_cell::sync::OnceCell;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::thread;

// --- Test Fixtures ---

fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

type Journal = Arc<Mutex<Vec<String>>>;

struct UserRepository {
  users: Vec<&'static str>,
}
injectable!(UserRepository);

struct UserService {
  repository: Arc<UserRepository>,
}
injectable!(UserService);

impl UserService {
  fn count(&self) -> usize {
    self.repository.users.len()
  }
}

#[derive(Default)]
struct UserController {
  service: Option<Arc<UserService>>,
}
injectable!(UserController);

trait PaymentGateway: Send + Sync {
  fn provider(&self) -> &'static str;
}
injectable!(dyn PaymentGateway);

#[derive(Default)]
struct StripeGateway;
impl PaymentGateway for StripeGateway {
  fn provider(&self) -> &'static str {
    "stripe"
  }
}
injectable!(StripeGateway: dyn PaymentGateway);

#[derive(Default)]
struct PaypalGateway;
impl PaymentGateway for PaypalGateway {
  fn provider(&self) -> &'static str {
    "paypal"
  }
}
injectable!(PaypalGateway: dyn PaymentGateway);

struct Checkout {
  gateway: Arc<dyn PaymentGateway>,
}
injectable!(Checkout);

// Wired after initialization through setters.
#[derive(Default)]
struct Receipts {
  gateway: OnceCell<Arc<dyn PaymentGateway>>,
  repository: OnceCell<Arc<UserRepository>>,
}
injectable!(Receipts);

trait Logger: Send + Sync {
  fn target(&self) -> &'static str;
}
injectable!(dyn Logger);

trait Audit: Logger {}
injectable!(dyn Audit: dyn Logger);

#[derive(Default)]
struct FileAudit;
impl Logger for FileAudit {
  fn target(&self) -> &'static str {
    "file"
  }
}
impl Audit for FileAudit {}
injectable!(FileAudit: dyn Audit, dyn Logger);

#[derive(Default)]
struct Console;
impl Logger for Console {
  fn target(&self) -> &'static str {
    "console"
  }
}
injectable!(Console: dyn Logger);

struct Reporter {
  logger: Arc<dyn Logger>,
  audit: Arc<dyn Audit>,
}
injectable!(Reporter);

struct HttpClient {
  timeout_ms: u64,
}
injectable!(HttpClient);

struct HttpConfig {
  timeout_ms: u64,
}

// Records every (bean, processor) visit.
struct RecordingProcessor {
  label: &'static str,
  journal: Journal,
}

impl PostProcessor for RecordingProcessor {
  fn name(&self) -> &str {
    self.label
  }

  fn process(&self, bean_name: &str, _bean: &BeanInstance, context: &ApplicationContext) -> Result<()> {
    assert!(context.contains_bean(bean_name));
    self
      .journal
      .lock()
      .unwrap()
      .push(format!("{}:{}", self.label, bean_name));
    Ok(())
  }
}

// Rejects every bean of the given name.
struct RejectingProcessor {
  bean: &'static str,
}

impl PostProcessor for RejectingProcessor {
  fn process(&self, bean_name: &str, _bean: &BeanInstance, _context: &ApplicationContext) -> Result<()> {
    if bean_name == self.bean {
      return Err(Error::NoSuchBean {
        type_name: "rejected".to_string(),
      });
    }
    Ok(())
  }
}

fn user_components(journal: &Journal) -> ComponentScanner {
  let repository_journal = Arc::clone(journal);
  let service_journal = Arc::clone(journal);
  let controller_journal = Arc::clone(journal);

  // Registered dependents first on purpose.
  ComponentScanner::new("users")
    .component(
      DefaultBeanDefinition::builder(move || {
        controller_journal.lock().unwrap().push("controller".to_string());
        UserController::default()
      })
      .name("controller")
      .field("service", |controller: &mut UserController| &mut controller.service),
    )
    .component(
      DefaultBeanDefinition::builder(move |repository: Arc<UserRepository>| {
        service_journal.lock().unwrap().push("service".to_string());
        UserService { repository }
      })
      .name("service"),
    )
    .component(
      DefaultBeanDefinition::builder(move || {
        repository_journal.lock().unwrap().push("repository".to_string());
        UserRepository {
          users: vec!["ada", "grace"],
        }
      })
      .name("repository"),
    )
}

fn gateways(primary_paypal: bool) -> ComponentScanner {
  let mut paypal = DefaultBeanDefinition::<PaypalGateway>::from_default().name("paypal");
  if primary_paypal {
    paypal = paypal.primary();
  }
  ComponentScanner::new("payments")
    .component(DefaultBeanDefinition::<StripeGateway>::from_default().name("stripe"))
    .component(paypal)
}

// --- Building ---

#[test]
fn test_end_to_end_wiring() {
  // Arrange
  init_tracing();
  let journal: Journal = Arc::default();

  // Act
  let context = ApplicationContext::builder()
    .scanner(user_components(&journal))
    .build()
    .unwrap();

  // Assert
  assert_eq!(*journal.lock().unwrap(), vec!["repository", "service", "controller"]);
  let controller = context.get_bean::<UserController>().unwrap();
  let service = context.get_bean::<UserService>().unwrap();
  assert!(Arc::ptr_eq(controller.service.as_ref().unwrap(), &service));
  assert_eq!(service.count(), 2);
  assert_eq!(context.bean_names(), vec!["controller", "service", "repository"]);
}

#[test]
fn test_failed_phase_yields_no_context() {
  let result = ApplicationContext::builder()
    .scanner(
      ComponentScanner::new("broken")
        .component(DefaultBeanDefinition::builder(|gateway: Arc<dyn PaymentGateway>| Checkout { gateway })),
    )
    .build();

  let error = result.unwrap_err();
  assert!(error.to_string().starts_with("ApplicationContext initialization has failed"));
  match error.root_cause() {
    Error::MissingDependency { type_name, .. } => {
      assert_eq!(type_name, std::any::type_name::<dyn PaymentGateway>());
    }
    other => panic!("unexpected cause: {}", other),
  }
}

#[test]
fn test_configuration_beans_join_the_graph() {
  let context = ApplicationContext::builder()
    .scanner(gateways(false))
    .scanner(
      ConfigurationScanner::new().configuration(
        Configuration::new(HttpConfig { timeout_ms: 250 })
          .bean("http_client", |config: &HttpConfig| HttpClient {
            timeout_ms: config.timeout_ms,
          })
          .primary_bean("checkout", |_: &HttpConfig, gateway: Arc<StripeGateway>| Checkout {
            gateway,
          }),
      ),
    )
    .build()
    .unwrap();

  assert_eq!(context.get_bean_named::<HttpClient>("http_client").unwrap().timeout_ms, 250);
  assert_eq!(context.get_bean::<Checkout>().unwrap().gateway.provider(), "stripe");
}

#[test]
fn test_trait_hierarchy_is_wired_by_specificity() {
  // Arrange: both loggers fit `dyn Logger`, only the file audit fits `dyn Audit`.
  let scanner = ComponentScanner::new("logging")
    .component(DefaultBeanDefinition::<FileAudit>::from_default().name("file"))
    .component(DefaultBeanDefinition::<Console>::from_default().name("console").primary())
    .component(
      DefaultBeanDefinition::builder(|logger: Arc<dyn Logger>, audit: Arc<dyn Audit>| Reporter { logger, audit })
        .name("reporter"),
    );

  // Act
  let context = ApplicationContext::builder().scanner(scanner).build().unwrap();

  // Assert
  let reporter = context.get_bean::<Reporter>().unwrap();
  assert_eq!(reporter.logger.target(), "console");
  assert_eq!(reporter.audit.target(), "file");
  assert_eq!(context.get_bean::<dyn Audit>().unwrap().target(), "file");
  assert_eq!(context.get_bean::<dyn Logger>().unwrap().target(), "console");
  assert_eq!(context.get_all_beans::<dyn Logger>().len(), 2);
}

// --- Lookups ---

#[test]
fn test_single_candidate_is_found_by_trait() {
  let context = ApplicationContext::builder()
    .scanner(ComponentScanner::new("payments").component(DefaultBeanDefinition::<StripeGateway>::from_default()))
    .build()
    .unwrap();

  assert_eq!(context.get_bean::<dyn PaymentGateway>().unwrap().provider(), "stripe");
}

#[test]
fn test_two_candidates_without_primary_are_ambiguous() {
  let context = ApplicationContext::builder().scanner(gateways(false)).build().unwrap();

  match context.get_bean::<dyn PaymentGateway>() {
    Err(Error::NoUniqueBean { type_name, candidates }) => {
      assert_eq!(type_name, std::any::type_name::<dyn PaymentGateway>());
      assert_eq!(candidates, "stripe: StripeGateway, paypal: PaypalGateway");
    }
    other => panic!("expected NoUniqueBean, got {:?}", other.map(|g| g.provider())),
  }
}

#[test]
fn test_primary_candidate_is_returned() {
  let context = ApplicationContext::builder().scanner(gateways(true)).build().unwrap();

  assert_eq!(context.get_bean::<dyn PaymentGateway>().unwrap().provider(), "paypal");
  // Exact-type lookups are unaffected.
  assert_eq!(context.get_bean::<StripeGateway>().unwrap().provider(), "stripe");
}

#[test]
fn test_missing_type_is_reported() {
  let context = ApplicationContext::builder().scanner(gateways(false)).build().unwrap();

  match context.get_bean::<HttpClient>() {
    Err(Error::NoSuchBean { type_name }) => assert_eq!(type_name, "HttpClient"),
    other => panic!("expected NoSuchBean, got {:?}", other.map(|c| c.timeout_ms)),
  }
}

#[test]
fn test_lookup_by_name_checks_the_type() {
  let context = ApplicationContext::builder().scanner(gateways(false)).build().unwrap();

  assert_eq!(context.get_bean_named::<dyn PaymentGateway>("paypal").unwrap().provider(), "paypal");
  assert!(context.get_bean_named::<PaypalGateway>("paypal").is_ok());
  assert!(matches!(
    context.get_bean_named::<StripeGateway>("paypal"),
    Err(Error::NoSuchBeanNamed { .. })
  ));
  assert!(matches!(
    context.get_bean_named::<StripeGateway>("unknown"),
    Err(Error::NoSuchBeanNamed { .. })
  ));
}

#[test]
fn test_all_beans_of_a_type() {
  let context = ApplicationContext::builder().scanner(gateways(false)).build().unwrap();

  let all = context.get_all_beans::<dyn PaymentGateway>();
  let providers: Vec<(&str, &str)> = all.iter().map(|(name, bean)| (name.as_str(), bean.provider())).collect();

  assert_eq!(providers, vec![("stripe", "stripe"), ("paypal", "paypal")]);
  assert!(context.get_all_beans::<HttpClient>().is_empty());
}

#[test]
fn test_registry_keeps_the_resolved_definitions() {
  let journal: Journal = Arc::default();
  let context = ApplicationContext::builder()
    .scanner(user_components(&journal))
    .build()
    .unwrap();

  let registry = context.registry();
  assert_eq!(registry.len(), context.len());
  let controller = registry.by_name("controller").unwrap();
  let dependency_names: Vec<&str> = controller.dependencies().keys().map(String::as_str).collect();
  assert_eq!(dependency_names, vec!["service"]);
  assert!(registry.all().all(|definition| definition.is_instantiated()));
}

#[test]
fn test_context_is_shared_across_threads() {
  let context = Arc::new(ApplicationContext::builder().scanner(gateways(true)).build().unwrap());

  let handles: Vec<_> = (0..4)
    .map(|_| {
      let context = Arc::clone(&context);
      thread::spawn(move || context.get_bean::<dyn PaymentGateway>().unwrap().provider())
    })
    .collect();

  for handle in handles {
    assert_eq!(handle.join().unwrap(), "paypal");
  }
}

// --- Post-processing ---

#[test]
fn test_post_processors_visit_each_bean_in_order() {
  let journal: Journal = Arc::default();

  ApplicationContext::builder()
    .scanner(gateways(false))
    .post_processor(RecordingProcessor {
      label: "first",
      journal: Arc::clone(&journal),
    })
    .post_processor(RecordingProcessor {
      label: "second",
      journal: Arc::clone(&journal),
    })
    .build()
    .unwrap();

  assert_eq!(
    *journal.lock().unwrap(),
    vec!["first:stripe", "second:stripe", "first:paypal", "second:paypal"]
  );
}

#[test]
fn test_post_processing_can_be_disabled() {
  let journal: Journal = Arc::default();
  let settings = Settings {
    post_processing: false,
    ..Settings::default()
  };

  ApplicationContext::builder()
    .scanner(gateways(false))
    .settings(settings)
    .post_processor(RecordingProcessor {
      label: "skipped",
      journal: Arc::clone(&journal),
    })
    .build()
    .unwrap();

  assert!(journal.lock().unwrap().is_empty());
}

#[test]
fn test_post_processor_failure_aborts_the_build() {
  let result = ApplicationContext::builder()
    .scanner(gateways(false))
    .post_processor(RejectingProcessor { bean: "paypal" })
    .build();

  match result.unwrap_err().root_cause() {
    Error::PostProcessing { bean, reason, .. } => {
      assert_eq!(bean, "paypal");
      assert!(reason.contains("rejected"));
    }
    other => panic!("unexpected cause: {}", other),
  }
}

#[test]
fn test_setters_receive_their_dependencies() {
  // Arrange
  let journal: Journal = Arc::default();
  let setters = SetterAutowiringPostProcessor::new()
    .setter("set_gateway", |receipts: &Receipts, gateway: Arc<dyn PaymentGateway>| {
      let _ = receipts.gateway.set(gateway);
    })
    .setter("set_repository", |receipts: &Receipts, repository: Arc<UserRepository>| {
      let _ = receipts.repository.set(repository);
    });
  assert_eq!(setters.len(), 2);

  // Act
  let context = ApplicationContext::builder()
    .scanner(gateways(true))
    .scanner(user_components(&journal))
    .scanner(ComponentScanner::new("receipts").component(DefaultBeanDefinition::<Receipts>::from_default()))
    .post_processor(setters)
    .build()
    .unwrap();

  // Assert: the primary gateway wins, the repository is the registered one.
  let receipts = context.get_bean::<Receipts>().unwrap();
  assert_eq!(receipts.gateway.get().unwrap().provider(), "paypal");
  let repository = context.get_bean::<UserRepository>().unwrap();
  assert!(Arc::ptr_eq(receipts.repository.get().unwrap(), &repository));
}

#[test]
fn test_setter_with_an_ambiguous_dependency_aborts_the_build() {
  let result = ApplicationContext::builder()
    .scanner(gateways(false))
    .scanner(ComponentScanner::new("receipts").component(DefaultBeanDefinition::<Receipts>::from_default()))
    .post_processor(SetterAutowiringPostProcessor::new().setter(
      "set_gateway",
      |receipts: &Receipts, gateway: Arc<dyn PaymentGateway>| {
        let _ = receipts.gateway.set(gateway);
      },
    ))
    .build();

  match result.unwrap_err().root_cause() {
    Error::PostProcessing { processor, bean, reason } => {
      assert_eq!(processor, "SetterAutowiringPostProcessor");
      assert_eq!(bean, std::any::type_name::<Receipts>());
      assert!(reason.starts_with("Can't invoke 'set_gateway' method"));
      assert!(reason.contains("stripe: StripeGateway, paypal: PaypalGateway"));
    }
    other => panic!("unexpected cause: {}", other),
  }
}

// --- Settings ---

#[test]
fn test_duplicate_names_follow_the_settings() {
  let duplicates = || {
    ComponentScanner::new("payments")
      .component(DefaultBeanDefinition::<StripeGateway>::from_default().name("gateway"))
      .component(DefaultBeanDefinition::<PaypalGateway>::from_default().name("gateway"))
  };

  let rejected = ApplicationContext::builder().scanner(duplicates()).build();
  assert!(matches!(
    rejected.unwrap_err().root_cause(),
    Error::DuplicateBeanName { .. }
  ));

  let context = ApplicationContext::builder()
    .scanner(duplicates())
    .settings(Settings {
      duplicate_names: DuplicateNamePolicy::Overwrite,
      ..Settings::default()
    })
    .build()
    .unwrap();
  assert_eq!(context.len(), 1);
  assert_eq!(context.get_bean::<dyn PaymentGateway>().unwrap().provider(), "paypal");
}
