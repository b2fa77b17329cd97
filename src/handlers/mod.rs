//! Event handlers for refresh loop events

pub mod composite;
pub mod console;
pub mod telegram;

// Re-export for convenience
pub use composite::CompositeEventHandler;
pub use console::ConsoleEventHandler;
pub use telegram::TelegramEventHandler;
