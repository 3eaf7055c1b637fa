pub mod hook;
pub mod notifier;
