use fibre_context::{injectable, ApplicationContext, ComponentScanner, DefaultBeanDefinition};
use std::sync::Arc;

// 1. Define the abstraction (the trait) and make it injectable.
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}
injectable!(dyn Logger);

// 2. Two implementations, each declaring the trait it can be injected as.
#[derive(Default)]
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}
injectable!(ConsoleLogger: dyn Logger);

#[derive(Default)]
struct JsonLogger;
impl Logger for JsonLogger {
  fn log(&self, message: &str) {
    println!("{{\"message\": \"{}\"}}", message);
  }
}
injectable!(JsonLogger: dyn Logger);

// 3. A service that depends on the abstraction only.
struct ReportService {
  logger: Arc<dyn Logger>,
}
injectable!(ReportService);

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  // Two loggers fit `dyn Logger`; the primary one is injected.
  let context = ApplicationContext::builder()
    .scanner(
      ComponentScanner::new("reports")
        .component(DefaultBeanDefinition::<ConsoleLogger>::from_default().name("console"))
        .component(DefaultBeanDefinition::<JsonLogger>::from_default().name("json").primary())
        .component(DefaultBeanDefinition::builder(|logger: Arc<dyn Logger>| ReportService { logger })),
    )
    .build()
    .expect("context should build");

  context
    .get_bean::<ReportService>()
    .expect("report service is registered")
    .generate_report();

  // Every logger is still reachable by name.
  for (name, logger) in context.get_all_beans::<dyn Logger>() {
    logger.log(&format!("hello from '{}'", name));
  }
}
