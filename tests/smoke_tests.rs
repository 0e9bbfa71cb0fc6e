use async_trait::async_trait;
use inboxics::components::feed_relay::FeedRelay;
use inboxics::components::{ComponentManager, ServiceComponent};
use inboxics::config::Config;
use inboxics::error::{component_error, RelayResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn test_config() -> Arc<Config> {
    let vars: HashMap<&str, &str> = [
        ("FEED_URL", "https://calendar.example.com/feed.ics"),
        ("MAILJET_API_KEY", "key"),
        ("MAILJET_SECRET_KEY", "secret"),
        ("MAILJET_SENDER", "relay@example.com"),
        ("RECIPIENT_EMAIL", "paul@example.com"),
        ("RECIPIENT_NAME", "Paul"),
    ]
    .into_iter()
    .collect();
    Arc::new(Config::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap())
}

/// Smoke test to verify that the config can be built
#[test]
fn test_config_builds() {
    let config = test_config();
    assert_eq!(config.recipient.email, "paul@example.com");
    assert_eq!(config.sender.name, "Inboxics");
    assert!(!config.is_periodic());
}

/// Component that records the order in which it was initialized
struct RecordingComponent {
    name: &'static str,
    fail_init: bool,
    counter: Arc<AtomicUsize>,
    order_recorder: Arc<Mutex<Vec<(String, usize)>>>,
    shut_down: Arc<AtomicUsize>,
}

#[async_trait]
impl ServiceComponent for RecordingComponent {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn init(&self, _config: Arc<Config>) -> RelayResult<()> {
        let order = self.counter.fetch_add(1, Ordering::SeqCst);
        self.order_recorder
            .lock()
            .unwrap()
            .push((self.name.to_string(), order));
        if self.fail_init {
            return Err(component_error("init failed"));
        }
        Ok(())
    }

    async fn shutdown(&self) -> RelayResult<()> {
        self.shut_down.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// A failing component does not stop the others from starting or stopping
#[tokio::test]
async fn test_component_manager_isolates_failures() {
    let counter = Arc::new(AtomicUsize::new(0));
    let order_recorder = Arc::new(Mutex::new(Vec::new()));
    let shut_down = Arc::new(AtomicUsize::new(0));

    let mut manager = ComponentManager::new(test_config());
    for (name, fail_init) in [("first", true), ("second", false)] {
        manager.register(RecordingComponent {
            name,
            fail_init,
            counter: Arc::clone(&counter),
            order_recorder: Arc::clone(&order_recorder),
            shut_down: Arc::clone(&shut_down),
        });
    }

    assert_eq!(manager.len(), 2);
    manager.init_all().await.unwrap();
    manager.shutdown_all().await.unwrap();

    let records = order_recorder.lock().unwrap().clone();
    assert_eq!(
        records,
        vec![("first".to_string(), 0), ("second".to_string(), 1)]
    );
    assert_eq!(shut_down.load(Ordering::SeqCst), 2);
    assert!(manager.get_component_by_name("second").is_some());
    assert!(manager.get_component_by_name("missing").is_none());
}

/// The feed relay component can be registered and found by name
#[tokio::test]
async fn test_feed_relay_registers() {
    let mut manager = ComponentManager::new(test_config());
    manager.register(FeedRelay::new());

    let component = manager.get_component_by_name("feed_relay").unwrap();
    let relay = component.as_any().downcast_ref::<FeedRelay>().unwrap();
    assert!(relay.get_handle().await.is_none());
}
