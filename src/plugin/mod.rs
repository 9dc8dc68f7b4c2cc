use crate::event::EventHandled;
use anyhow::Result;

// Re-exported so that plugin modules get the full plugin-facing API from `use crate::plugin::*`.
pub use crate::context::Context;

mod debug;
mod help;
mod ignore_bots;
mod register;
mod roles;

#[serenity::async_trait]
pub trait Plugin: Sync + Send {
    /// Plugin name.  Used for debug
    fn name(&self) -> &'static str;
    /// Help message lines.  None if no help message
    async fn usage(&self, ctx: &Context<'_>) -> Option<String>;
    /// Potentially handle event.  Returns:
    /// - Ok(EventHandled::Yes) if the event has been handled and no other plugin should attempt to
    ///   handle it
    /// - Ok(EventHandled::No) if another plugin should attempt to handle the event
    /// - Err if an error occurred
    async fn handle(&self, ctx: &Context<'_>, event: &crate::event::Event) -> Result<EventHandled>;
}

/// Ordered list of available plugins
pub fn plugins() -> Vec<Box<dyn Plugin>> {
    use crate::plugin::*;

    vec![
        // Core bot operations
        Box::new(ignore_bots::IgnoreBots),
        Box::new(debug::Debug),
        Box::new(help::Help),
        // Command plugins
        Box::new(register::Register),
        Box::new(roles::Roles),
    ]
}
