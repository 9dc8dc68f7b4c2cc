//! Register and unregister from classes to show/hide them in the sidebar

use crate::catalog::{self, ClassCatalog, ClassEntry};
use crate::command::{self, Grammar};
use crate::helper::*;
use crate::resolve::{self, Resolution};
use crate::{event::*, log_internal, plugin::*};
use anyhow::{anyhow, Result};
use serenity::all::{
    Mentionable, Message, PermissionOverwrite, PermissionOverwriteType, Permissions, UserId,
};

const LIST_COMMAND: &str = "listclasses";
const REGISTER_COMMAND: &str = "register";
const UNREGISTER_COMMAND: &str = "unregister";

/// Grants and revokes a member's read access to class channels.
pub struct Register;

#[serenity::async_trait]
impl Plugin for Register {
    fn name(&self) -> &'static str {
        "register"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{p}{list} - list the available classes\n\
             {p}{reg} <class...> - gain access to class channels\n\
             {p}{unreg} <class...> - drop access to class channels",
            p = prefix,
            list = LIST_COMMAND,
            reg = REGISTER_COMMAND,
            unreg = UNREGISTER_COMMAND,
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some(msg) = event.bot_cmd(ctx, LIST_COMMAND).await {
            command_list(ctx, msg).await?;
            return Ok(EventHandled::Yes);
        }
        if let Some(msg) = event.bot_cmd(ctx, REGISTER_COMMAND).await {
            command_access(ctx, msg, Access::Grant).await?;
            return Ok(EventHandled::Yes);
        }
        if let Some(msg) = event.bot_cmd(ctx, UNREGISTER_COMMAND).await {
            command_access(ctx, msg, Access::Revoke).await?;
            return Ok(EventHandled::Yes);
        }

        Ok(EventHandled::No)
    }
}

/// Desired read-access state for the invoking member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Grant,
    Revoke,
}

/// List the available classes
async fn command_list(ctx: &Context<'_>, msg: &Message) -> Result<()> {
    let prefix = ctx.cfg.read().await.general.command_prefix.clone();

    let matched = command::parse_args(
        &format!("{prefix}{LIST_COMMAND}"),
        Grammar::NoArgs,
        &msg.content,
    );
    if matched.is_err() {
        return syntax_error(ctx, msg, &prefix).await;
    }

    let member = msg.guild_member(ctx).await?;

    // Snapshot the catalog and the member's access marks in one scope; the guild reference
    // holds a cache lock and must not live across an await.
    let marked: Vec<(bool, String)> = {
        let guild = msg
            .guild(ctx.cache)
            .ok_or(anyhow!("message was not sent in a guild"))?;
        let catalog = ClassCatalog::collect(&guild);
        catalog
            .classes
            .iter()
            .map(|class| {
                (
                    catalog::member_can_read(&guild, class.channel_id, &member),
                    class.name.clone(),
                )
            })
            .collect()
    };

    let response = format_class_list(&marked, &msg.author.mention().to_string(), &prefix);
    msg.consume_and_respond(ctx, &response).await
}

/// Give the member access to the requested class channels, or take it away
async fn command_access(ctx: &Context<'_>, msg: &Message, access: Access) -> Result<()> {
    let prefix = ctx.cfg.read().await.general.command_prefix.clone();
    let keyword = match access {
        Access::Grant => REGISTER_COMMAND,
        Access::Revoke => UNREGISTER_COMMAND,
    };

    let tokens = match command::parse_args(
        &format!("{prefix}{keyword}"),
        Grammar::ClassTokens,
        &msg.content,
    ) {
        Ok(tokens) => tokens,
        Err(_) => return syntax_error(ctx, msg, &prefix).await,
    };

    let catalog = {
        let guild = msg
            .guild(ctx.cache)
            .ok_or(anyhow!("message was not sent in a guild"))?;
        ClassCatalog::collect(&guild)
    };

    // Every token must resolve before any permission is touched.
    let resolution = match resolve::resolve_classes(&catalog.classes, &tokens) {
        Ok(resolution) => resolution,
        Err(err) => {
            let response = format!(
                "{}, {}. Try `{prefix}{LIST_COMMAND}`.",
                msg.author.mention(),
                err
            );
            return msg.consume_and_respond(ctx, &response).await;
        }
    };

    if let Err(err) = apply_access(ctx, &catalog, &resolution, msg.author.id, access).await {
        if is_permission_refusal(&err) {
            let response = format!(
                "Insufficient permissions to handle one of your specified classes. {}",
                msg.author.mention()
            );
            return msg.consume_and_respond(ctx, &response).await;
        }
        return Err(err.into());
    }

    log_internal!(
        "{} {} read access to {} class channel(s)",
        msg.author.name,
        match access {
            Access::Grant => "gained",
            Access::Revoke => "dropped",
        },
        if resolution.all {
            catalog.classes.len()
        } else {
            resolution.entries.len()
        },
    );

    let response = match (access, resolution.all) {
        (Access::Grant, false) => {
            format_registered(&resolution.entries, &msg.author.mention().to_string())
        }
        (Access::Grant, true) => {
            format!("{}, you have registered all classes.", msg.author.mention())
        }
        (Access::Revoke, _) => {
            format!("{}, you have unregistered from classes.", msg.author.mention())
        }
    };

    msg.consume_and_respond(ctx, &response).await
}

async fn syntax_error(ctx: &Context<'_>, msg: &Message, prefix: &str) -> Result<()> {
    let response = format!(
        "{}, that is the incorrect command syntax. Try `{prefix}help`.",
        msg.author.mention()
    );
    msg.consume_and_respond(ctx, &response).await
}

/// Apply the permission change.  The wildcard mutates whole categories rather than each channel
/// individually.
async fn apply_access(
    ctx: &Context<'_>,
    catalog: &ClassCatalog,
    resolution: &Resolution<'_, ClassEntry>,
    user_id: UserId,
    access: Access,
) -> serenity::Result<()> {
    let overwrite = read_overwrite(user_id, access);

    if resolution.all {
        for category_id in &catalog.categories {
            category_id
                .create_permission(ctx.http, overwrite.clone())
                .await?;
        }
    } else {
        for class in &resolution.entries {
            class
                .channel_id
                .create_permission(ctx.http, overwrite.clone())
                .await?;
        }
    }

    Ok(())
}

fn read_overwrite(user_id: UserId, access: Access) -> PermissionOverwrite {
    let (allow, deny) = match access {
        Access::Grant => (Permissions::VIEW_CHANNEL, Permissions::empty()),
        Access::Revoke => (Permissions::empty(), Permissions::VIEW_CHANNEL),
    };

    PermissionOverwrite {
        allow,
        deny,
        kind: PermissionOverwriteType::Member(user_id),
    }
}

fn format_class_list(marked: &[(bool, String)], mention: &str, prefix: &str) -> String {
    let mut response = String::from("**All classes:**\n```\n");
    for (has_access, name) in marked {
        let arrow = if *has_access { "-->" } else { "" };
        response.push_str(&format!("{arrow:4}{name}\n"));
    }
    response.push_str(&format!(
        "```\n{mention}, your classes are highlighted with an arrow.\n\
         You can manage your classes with `{prefix}{REGISTER_COMMAND}` and `{prefix}{UNREGISTER_COMMAND}`"
    ));

    response
}

fn format_registered(classes: &[&ClassEntry], mention: &str) -> String {
    let mut response = format!("{mention} **Registered classes:**");
    for class in classes {
        response.push_str(&format!("\n<#{}>", class.channel_id));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::all::ChannelId;

    #[test]
    fn class_list_marks_access_with_an_arrow() {
        let marked = vec![
            (true, "cs101_smith".to_owned()),
            (false, "ma200_jones".to_owned()),
        ];

        let response = format_class_list(&marked, "@member", "!");
        assert!(response.contains("--> cs101_smith\n"));
        assert!(response.contains("    ma200_jones\n"));
        assert!(response.contains("`!register` and `!unregister`"));
    }

    #[test]
    fn registered_classes_are_listed_as_channel_mentions() {
        let classes = vec![
            ClassEntry::new("cs101_smith", ChannelId::new(11)),
            ClassEntry::new("cs101_lee", ChannelId::new(12)),
        ];
        let refs: Vec<&ClassEntry> = classes.iter().collect();

        let response = format_registered(&refs, "@member");
        assert_eq!(response, "@member **Registered classes:**\n<#11>\n<#12>");
    }

    #[test]
    fn grant_and_revoke_overwrites_are_opposites() {
        let grant = read_overwrite(UserId::new(1), Access::Grant);
        assert_eq!(grant.allow, Permissions::VIEW_CHANNEL);
        assert!(grant.deny.is_empty());

        let revoke = read_overwrite(UserId::new(1), Access::Revoke);
        assert!(revoke.allow.is_empty());
        assert_eq!(revoke.deny, Permissions::VIEW_CHANNEL);
    }
}
