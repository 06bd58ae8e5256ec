pub mod notifier;
pub mod templates;

pub use notifier::EmailNotifier;
