//! The Serenity crate we're using for the Discord API is designed around callbacks to handle
//! events.  However, this does not mesh well with our plugin framework here.  To resolve this,
//! the handler translates the callbacks into a distinct Event enum which is offered to each
//! plugin in turn.

use crate::context::Context;
use serenity::all::{Message, Ready};

/// A Discord event
pub enum Event {
    Ready(Ready),
    Message(Message),
}

impl Event {
    // When an event occurs, iterate over all the plugins to see if any can/should handle it.
    pub async fn handle(self, ctx: Context<'_>) {
        for plugin in crate::plugin::plugins() {
            match plugin.handle(&ctx, &self).await {
                Ok(EventHandled::Yes) => return,
                Ok(EventHandled::No) => continue,
                Err(err) => eprintln!("Error in plugin {}: {}", plugin.name(), err),
            }
        }
    }

    // Check if a message should be interpreted as a special bot command.
    //
    // These are prefixed with the configured command prefix, e.g. `!register foo bar`.  Only the
    // first whitespace-separated term is inspected so that a plugin can report syntax errors on
    // its own malformed invocations rather than silently ignoring them.
    pub async fn bot_cmd(&self, ctx: &Context<'_>, keyword: &str) -> Option<&Message> {
        let Event::Message(msg) = self else {
            return None;
        };

        let prefix = &ctx.cfg.read().await.general.command_prefix;
        let first = msg.content.split_whitespace().next()?;
        (first == format!("{prefix}{keyword}")).then_some(msg)
    }
}

pub enum EventHandled {
    Yes,
    No,
}
