//! Read-only queries over the live guild object graph.
//!
//! Catalogs are rebuilt from the guild on every command invocation and discarded once the
//! response is sent; nothing here is cached between invocations.

use serenity::all::{
    ChannelId, ChannelType, Guild, GuildChannel, Member, Permissions, Role, RoleId,
};

/// Category names (uppercased) whose channels count as classes.
pub const ALLOWED_CATEGORIES: &[&str] = &["CLASSES"];

/// A channel representing one course section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub name: String,
    pub channel_id: ChannelId,
    /// `<group>_<qualifier>` decomposition of the channel name.  Absent when the name does not
    /// follow the class naming convention.
    pub parts: Option<ClassParts>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassParts {
    /// Short course code shared by every section of a course.
    pub group: String,
    /// Section qualifier, e.g. the professor's name.
    pub qualifier: String,
}

impl ClassEntry {
    pub fn new(name: &str, channel_id: ChannelId) -> Self {
        Self {
            name: name.to_owned(),
            channel_id,
            parts: split_class_name(name),
        }
    }
}

/// Split a channel name into its group and qualifier.
///
/// The class naming convention is `<group>_<qualifier>`: the qualifier is the trailing run of
/// letters after the last underscore, and the group is everything before it.  Channel names on
/// Discord are always lowercase, so anything else disqualifies the name.
fn split_class_name(name: &str) -> Option<ClassParts> {
    let (group, qualifier) = name.rsplit_once('_')?;

    if group.is_empty() || qualifier.is_empty() {
        return None;
    }
    if !group
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return None;
    }
    if !qualifier.chars().all(|c| c.is_ascii_lowercase()) {
        return None;
    }

    Some(ClassParts {
        group: group.to_owned(),
        qualifier: qualifier.to_owned(),
    })
}

/// Every class channel nested under the allowed categories, in the guild's native
/// category/channel order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCatalog {
    /// Ids of the allowed categories, for wildcard category-level mutations.
    pub categories: Vec<ChannelId>,
    pub classes: Vec<ClassEntry>,
}

impl ClassCatalog {
    pub fn collect(guild: &Guild) -> Self {
        let mut categories: Vec<&GuildChannel> = guild
            .channels
            .values()
            .filter(|channel| channel.kind == ChannelType::Category)
            .filter(|channel| ALLOWED_CATEGORIES.contains(&channel.name.to_uppercase().as_str()))
            .collect();
        categories.sort_by_key(|category| (category.position, category.id));

        let mut classes = Vec::new();
        for category in &categories {
            let mut channels: Vec<&GuildChannel> = guild
                .channels
                .values()
                .filter(|channel| channel.parent_id == Some(category.id))
                .collect();
            channels.sort_by_key(|channel| (channel.position, channel.id));
            classes.extend(
                channels
                    .iter()
                    .map(|channel| ClassEntry::new(&channel.name, channel.id)),
            );
        }

        Self {
            categories: categories.into_iter().map(|category| category.id).collect(),
            classes,
        }
    }
}

/// A role defined on the guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEntry {
    pub name: String,
    pub id: RoleId,
}

/// All roles defined on the guild, in native order.
pub fn role_catalog(guild: &Guild) -> Vec<RoleEntry> {
    let mut roles: Vec<&Role> = guild.roles.values().collect();
    roles.sort_by_key(|role| (role.position, role.id));

    roles
        .into_iter()
        .map(|role| RoleEntry {
            name: role.name.clone(),
            id: role.id,
        })
        .collect()
}

/// Whether the member can currently read the given class channel.
pub fn member_can_read(guild: &Guild, channel_id: ChannelId, member: &Member) -> bool {
    guild.channels.get(&channel_id).is_some_and(|channel| {
        guild
            .user_permissions_in(channel, member)
            .contains(Permissions::VIEW_CHANNEL)
    })
}

/// Whether the member currently holds the given role.
pub fn member_has_role(member: &Member, role_id: RoleId) -> bool {
    member.roles.contains(&role_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(name: &str) -> Option<ClassParts> {
        ClassEntry::new(name, ChannelId::new(1)).parts
    }

    #[test]
    fn class_name_splits_into_group_and_qualifier() {
        let parts = parts("cs101_smith").unwrap();
        assert_eq!(parts.group, "cs101");
        assert_eq!(parts.qualifier, "smith");
    }

    #[test]
    fn group_may_itself_contain_underscores() {
        let parts = parts("cs_101_smith").unwrap();
        assert_eq!(parts.group, "cs_101");
        assert_eq!(parts.qualifier, "smith");
    }

    #[test]
    fn names_without_separator_have_no_parts() {
        assert_eq!(parts("general"), None);
    }

    #[test]
    fn qualifier_must_be_letters() {
        assert_eq!(parts("cs101_2"), None);
        assert_eq!(parts("cs101_smith2"), None);
    }

    #[test]
    fn empty_halves_are_rejected() {
        assert_eq!(parts("_smith"), None);
        assert_eq!(parts("cs101_"), None);
        assert_eq!(parts("_"), None);
    }

    #[test]
    fn group_charset_is_limited() {
        assert_eq!(parts("cs-101_smith"), None);
    }
}
