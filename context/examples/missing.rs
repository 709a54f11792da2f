use fibre_context::{injectable, ApplicationContext, ComponentScanner, DefaultBeanDefinition, Error};
use std::sync::Arc;

struct UnregisteredService;
injectable!(UnregisteredService);

struct Consumer {
  _service: Arc<UnregisteredService>,
}
injectable!(Consumer);

fn main() {
  // --- A dependency nobody provides ---
  println!("Building a context whose only bean needs a service that was never registered...");

  let result = ApplicationContext::builder()
    .scanner(
      ComponentScanner::new("consumers").component(
        DefaultBeanDefinition::builder(|service: Arc<UnregisteredService>| Consumer { _service: service })
          .name("consumer"),
      ),
    )
    .build();

  match result {
    Ok(_) => panic!("The context should not have been built!"),
    Err(error) => {
      println!("Context construction failed: {}", error);
      assert!(matches!(error.root_cause(), Error::MissingDependency { .. }));
    }
  }

  // --- A lookup that finds nothing ---
  println!("\nNow, looking up a bean in an empty context...");

  let context = ApplicationContext::builder()
    .build()
    .expect("an empty context is valid");

  match context.get_bean::<UnregisteredService>() {
    Ok(_) => panic!("Should not have found the service!"),
    Err(error) => println!("Correctly received an error: {}", error),
  }
}
