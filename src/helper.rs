//! Miscellaneous convenience methods

use crate::context::Context;
use anyhow::Result;
use serenity::all::{Member, Message};
use serenity::http::StatusCode;

#[serenity::async_trait]
pub trait MessageHelper {
    async fn consume_and_respond(&self, ctx: &Context<'_>, response: &str) -> Result<()>;
    async fn guild_member(&self, ctx: &Context<'_>) -> Result<Member>;
}

#[serenity::async_trait]
impl MessageHelper for Message {
    /// Delete the triggering message to keep the channel clean, then post the single response
    /// for this invocation to the bot spam channel.
    async fn consume_and_respond(&self, ctx: &Context<'_>, response: &str) -> Result<()> {
        let spam_channel = ctx.cfg.read().await.spam_channel().await?;

        self.delete(ctx.cache_http).await?;
        spam_channel.say(ctx.cache_http, response).await?;

        Ok(())
    }

    /// The message author as a member of the guild the message was sent in.
    async fn guild_member(&self, ctx: &Context<'_>) -> Result<Member> {
        let guild_id = self
            .guild_id
            .ok_or(anyhow::anyhow!("message was not sent in a guild"))?;

        guild_id
            .member(ctx.cache_http, self.author.id)
            .await
            .map_err(Into::into)
    }
}

/// Discord answers 403 when the bot principal lacks the privilege to perform a mutation.  Those
/// are reported to the invoking member rather than treated as bot failures.
pub fn is_permission_refusal(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(http_err) => http_err.status_code() == Some(StatusCode::FORBIDDEN),
        _ => false,
    }
}
