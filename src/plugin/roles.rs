//! Plugin to manage one's own non-critical roles.

use crate::catalog::{self, RoleEntry};
use crate::command::{self, Grammar};
use crate::helper::*;
use crate::resolve;
use crate::{event::*, log_internal, plugin::*};
use anyhow::{anyhow, Result};
use serenity::all::{Mentionable, Message, RoleId};

const LIST_COMMAND: &str = "listroles";
const ADD_COMMAND: &str = "addroles";
const REMOVE_COMMAND: &str = "removeroles";

/// Lets members add and remove non-critical roles on themselves.
pub struct Roles;

#[serenity::async_trait]
impl Plugin for Roles {
    fn name(&self) -> &'static str {
        "roles"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{p}{list} - list all server roles\n\
             {p}{add} <role...> - give yourself roles\n\
             {p}{remove} <role...> - remove roles from yourself",
            p = prefix,
            list = LIST_COMMAND,
            add = ADD_COMMAND,
            remove = REMOVE_COMMAND,
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some(msg) = event.bot_cmd(ctx, LIST_COMMAND).await {
            command_list(ctx, msg).await?;
            return Ok(EventHandled::Yes);
        }
        if let Some(msg) = event.bot_cmd(ctx, ADD_COMMAND).await {
            command_edit(ctx, msg, Edit::Add).await?;
            return Ok(EventHandled::Yes);
        }
        if let Some(msg) = event.bot_cmd(ctx, REMOVE_COMMAND).await {
            command_edit(ctx, msg, Edit::Remove).await?;
            return Ok(EventHandled::Yes);
        }

        Ok(EventHandled::No)
    }
}

/// Whether roles are being added to or removed from the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Add,
    Remove,
}

/// List all roles available on the server.
async fn command_list(ctx: &Context<'_>, msg: &Message) -> Result<()> {
    let prefix = ctx.cfg.read().await.general.command_prefix.clone();

    let matched = command::parse_args(
        &format!("{prefix}{LIST_COMMAND}"),
        Grammar::NoArgs,
        &msg.content,
    );
    if matched.is_err() {
        return syntax_error(ctx, msg, LIST_COMMAND, &prefix).await;
    }

    let member = msg.guild_member(ctx).await?;

    let marked: Vec<(bool, String)> = {
        let guild = msg
            .guild(ctx.cache)
            .ok_or(anyhow!("message was not sent in a guild"))?;
        catalog::role_catalog(&guild)
            .into_iter()
            .map(|role| (catalog::member_has_role(&member, role.id), role.name))
            .collect()
    };

    let response = format_role_list(&marked, &msg.author.mention().to_string());
    msg.consume_and_respond(ctx, &response).await
}

/// Add roles to or remove roles from the member.
async fn command_edit(ctx: &Context<'_>, msg: &Message, edit: Edit) -> Result<()> {
    let prefix = ctx.cfg.read().await.general.command_prefix.clone();
    let keyword = match edit {
        Edit::Add => ADD_COMMAND,
        Edit::Remove => REMOVE_COMMAND,
    };

    let tokens = match command::parse_args(
        &format!("{prefix}{keyword}"),
        Grammar::RoleTokens,
        &msg.content,
    ) {
        Ok(tokens) => tokens,
        Err(_) => return syntax_error(ctx, msg, keyword, &prefix).await,
    };

    let roles: Vec<RoleEntry> = {
        let guild = msg
            .guild(ctx.cache)
            .ok_or(anyhow!("message was not sent in a guild"))?;
        catalog::role_catalog(&guild)
    };

    // Every token must resolve before any role is touched.
    let resolution = match resolve::resolve_roles(&roles, &tokens) {
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

    let role_ids: Vec<RoleId> = resolution.entries.iter().map(|role| role.id).collect();
    let member = msg.guild_member(ctx).await?;

    let result = match edit {
        Edit::Add => member.add_roles(ctx.http, &role_ids).await,
        Edit::Remove => member.remove_roles(ctx.http, &role_ids).await,
    };

    if let Err(err) = result {
        if is_permission_refusal(&err) {
            let response = format!(
                "Insufficient permissions to handle one of your specified roles. {}",
                msg.author.mention()
            );
            return msg.consume_and_respond(ctx, &response).await;
        }
        return Err(err.into());
    }

    log_internal!(
        "{} {} {} role(s)",
        msg.author.name,
        match edit {
            Edit::Add => "added",
            Edit::Remove => "removed",
        },
        role_ids.len(),
    );

    let response = match edit {
        Edit::Add => format!(
            "{} Added roles! Check them out with `{prefix}{LIST_COMMAND}`",
            msg.author.mention()
        ),
        Edit::Remove => format!(
            "{} Removed roles. Confirm with `{prefix}{LIST_COMMAND}`",
            msg.author.mention()
        ),
    };

    msg.consume_and_respond(ctx, &response).await
}

async fn syntax_error(ctx: &Context<'_>, msg: &Message, keyword: &str, prefix: &str) -> Result<()> {
    let response = format!(
        "{}, you've got the {keyword} syntax wrong. Try `{prefix}help`.",
        msg.author.mention()
    );
    msg.consume_and_respond(ctx, &response).await
}

fn format_role_list(marked: &[(bool, String)], mention: &str) -> String {
    let mut response = String::from("**All server roles:**\n```\n");
    for (has_role, name) in marked {
        if *has_role {
            response.push_str(&format!("--> {name}\n"));
        } else {
            response.push_str(&format!("    {name}\n"));
        }
    }
    response.push_str("```");
    response.push_str(&format!(
        "\n{mention}, your roles are highlighted with an arrow!"
    ));

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_list_marks_held_roles_with_an_arrow() {
        let marked = vec![(false, "Admin".to_owned()), (true, "Member".to_owned())];

        let response = format_role_list(&marked, "@member");
        assert!(response.contains("    Admin\n"));
        assert!(response.contains("--> Member\n"));
        assert!(response.ends_with("@member, your roles are highlighted with an arrow!"));
    }

    #[test]
    fn role_list_is_empty_but_well_formed_without_roles() {
        let response = format_role_list(&[], "@member");
        assert!(response.starts_with("**All server roles:**\n```"));
        assert!(response.contains("```\n@member"));
    }
}
