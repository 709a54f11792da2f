use fibre_context::{
  injectable, ApplicationContext, BeanInstance, ComponentScanner, Configuration, ConfigurationScanner,
  DefaultBeanDefinition, PostProcessor, Result, Settings,
};
use std::sync::Arc;

struct DatabaseSettings {
  url: String,
  pool_size: usize,
}

struct ConnectionPool {
  url: String,
  size: usize,
}
injectable!(ConnectionPool);

struct UserRepository {
  pool: Arc<ConnectionPool>,
}
injectable!(UserRepository);

#[derive(Default)]
struct UserController {
  repository: Option<Arc<UserRepository>>,
}
injectable!(UserController);

// Prints every bean once the graph is wired.
struct InventoryPrinter;

impl PostProcessor for InventoryPrinter {
  fn process(&self, bean_name: &str, bean: &BeanInstance, _context: &ApplicationContext) -> Result<()> {
    println!("  {} -> {}", bean_name, bean.ty().simple_name());
    Ok(())
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  // Settings come from ./fibre_context.yaml (or fibre_context.$FIBRE_ENV.yaml) if present.
  let settings = Settings::discover().expect("settings file should be valid");

  // Beans produced by factory methods on a configuration object.
  let database = Configuration::new(DatabaseSettings {
    url: "postgres://localhost/app".to_string(),
    pool_size: 8,
  })
  .bean("pool", |settings: &DatabaseSettings| ConnectionPool {
    url: settings.url.clone(),
    size: settings.pool_size,
  });

  // Beans produced by constructors, with field injection for the controller.
  let components = ComponentScanner::new("users")
    .component(DefaultBeanDefinition::builder(|pool: Arc<ConnectionPool>| UserRepository { pool }).name("users"))
    .component(
      DefaultBeanDefinition::<UserController>::from_default()
        .name("controller")
        .field("repository", |controller: &mut UserController| &mut controller.repository),
    );

  println!("Beans:");
  let context = ApplicationContext::builder()
    .settings(settings)
    .scanner(ConfigurationScanner::new().configuration(database))
    .scanner(components)
    .post_processor(InventoryPrinter)
    .build()
    .expect("context should build");

  let controller = context
    .get_bean_named::<UserController>("controller")
    .expect("controller is registered");
  let pool = &controller.repository.as_ref().expect("repository is injected").pool;
  println!("Controller talks to {} with {} connections", pool.url, pool.size);
}
