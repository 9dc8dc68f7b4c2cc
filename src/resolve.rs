//! Token-to-entity resolution.
//!
//! Resolution is all-or-nothing: every token must resolve before the caller touches a single
//! permission, and the first unresolvable token aborts with an error naming it.

use crate::catalog::{ClassEntry, RoleEntry};
use crate::error::CommandError;
use std::collections::HashSet;

/// The wildcard token selecting the entire catalog.
const ALL_TOKEN: &str = "all";

/// Outcome of resolving user tokens against a catalog.
///
/// `all` records that the wildcard keyword was used, in which case `entries` holds the entire
/// catalog and the caller may mutate at a coarser granularity.
#[derive(Debug, PartialEq, Eq)]
pub struct Resolution<'a, T> {
    pub entries: Vec<&'a T>,
    pub all: bool,
}

/// Lowercase and deduplicate tokens, keeping first-occurrence order so that the first
/// unresolvable token is deterministic.
fn normalize(tokens: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .iter()
        .map(|token| token.to_lowercase())
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Resolve class tokens.
///
/// A token without the `_` separator is a group reference and selects every section of that
/// course; a token with the separator must match exactly one full class name.  Matched entries
/// are accumulated in token order and are not deduplicated.
pub fn resolve_classes<'a>(
    catalog: &'a [ClassEntry],
    tokens: &[String],
) -> Result<Resolution<'a, ClassEntry>, CommandError> {
    let tokens = normalize(tokens);

    if tokens.len() == 1 && tokens[0] == ALL_TOKEN {
        return Ok(Resolution {
            entries: catalog.iter().collect(),
            all: true,
        });
    }

    let mut entries = Vec::new();
    for token in &tokens {
        if token.contains('_') {
            // Full class name; require exactly one match.
            match catalog
                .iter()
                .find(|class| class.name.eq_ignore_ascii_case(token))
            {
                Some(class) => entries.push(class),
                None => return Err(CommandError::UnknownClass(token.clone())),
            }
        } else {
            // Group code; select every section of the course.
            let sections: Vec<&ClassEntry> = catalog
                .iter()
                .filter(|class| {
                    class
                        .parts
                        .as_ref()
                        .is_some_and(|parts| parts.group == *token)
                })
                .collect();
            if sections.is_empty() {
                return Err(CommandError::UnknownClassGroup(token.clone()));
            }
            entries.extend(sections);
        }
    }

    Ok(Resolution {
        entries,
        all: false,
    })
}

/// Resolve role tokens.  Always an exact, case-insensitive match against the full role name.
pub fn resolve_roles<'a>(
    catalog: &'a [RoleEntry],
    tokens: &[String],
) -> Result<Resolution<'a, RoleEntry>, CommandError> {
    let tokens = normalize(tokens);

    let mut entries = Vec::new();
    for token in &tokens {
        match catalog
            .iter()
            .find(|role| role.name.eq_ignore_ascii_case(token))
        {
            Some(role) => entries.push(role),
            None => return Err(CommandError::UnknownRole(token.clone())),
        }
    }

    Ok(Resolution {
        entries,
        all: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::all::{ChannelId, RoleId};

    fn class_catalog() -> Vec<ClassEntry> {
        vec![
            ClassEntry::new("cs101_smith", ChannelId::new(11)),
            ClassEntry::new("cs101_lee", ChannelId::new(12)),
            ClassEntry::new("ma200_jones", ChannelId::new(13)),
        ]
    }

    fn role_catalog() -> Vec<RoleEntry> {
        ["Admin", "Member", "Guest"]
            .iter()
            .enumerate()
            .map(|(i, name)| RoleEntry {
                name: (*name).to_owned(),
                id: RoleId::new(i as u64 + 1),
            })
            .collect()
    }

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| (*t).to_owned()).collect()
    }

    fn names<T>(resolution: &Resolution<'_, T>, name: fn(&T) -> &str) -> Vec<String> {
        resolution
            .entries
            .iter()
            .map(|entry| name(entry).to_owned())
            .collect()
    }

    #[test]
    fn lone_all_token_selects_entire_catalog() {
        let catalog = class_catalog();
        let resolution = resolve_classes(&catalog, &tokens(&["all"])).unwrap();
        assert!(resolution.all);
        assert_eq!(resolution.entries.len(), catalog.len());
    }

    #[test]
    fn all_token_is_case_insensitive() {
        let catalog = class_catalog();
        let resolution = resolve_classes(&catalog, &tokens(&["ALL"])).unwrap();
        assert!(resolution.all);
    }

    #[test]
    fn all_against_empty_catalog_is_empty_with_flag_set() {
        let resolution = resolve_classes(&[], &tokens(&["all"])).unwrap();
        assert!(resolution.all);
        assert!(resolution.entries.is_empty());
    }

    #[test]
    fn all_mixed_with_other_tokens_is_not_the_wildcard() {
        let catalog = class_catalog();
        let result = resolve_classes(&catalog, &tokens(&["all", "cs101"]));
        assert_eq!(
            result.unwrap_err(),
            CommandError::UnknownClassGroup("all".to_owned())
        );
    }

    #[test]
    fn group_token_selects_every_section() {
        let catalog = class_catalog();
        let resolution = resolve_classes(&catalog, &tokens(&["cs101"])).unwrap();
        assert!(!resolution.all);
        assert_eq!(
            names(&resolution, |c| &c.name),
            vec!["cs101_smith", "cs101_lee"]
        );
    }

    #[test]
    fn full_name_token_selects_one_section() {
        let catalog = class_catalog();
        let resolution = resolve_classes(&catalog, &tokens(&["ma200_jones"])).unwrap();
        assert_eq!(names(&resolution, |c| &c.name), vec!["ma200_jones"]);
    }

    #[test]
    fn unknown_group_names_the_token() {
        let catalog = class_catalog();
        let err = resolve_classes(&catalog, &tokens(&["phys1"])).unwrap_err();
        assert_eq!(err, CommandError::UnknownClassGroup("phys1".to_owned()));
    }

    #[test]
    fn unknown_full_name_names_the_token() {
        let catalog = class_catalog();
        let err = resolve_classes(&catalog, &tokens(&["phys1_who"])).unwrap_err();
        assert_eq!(err, CommandError::UnknownClass("phys1_who".to_owned()));
    }

    #[test]
    fn first_unresolvable_token_aborts_resolution() {
        let catalog = class_catalog();
        let err = resolve_classes(&catalog, &tokens(&["nope", "cs101"])).unwrap_err();
        assert_eq!(err, CommandError::UnknownClassGroup("nope".to_owned()));
    }

    #[test]
    fn duplicate_tokens_are_collapsed() {
        let catalog = class_catalog();
        let resolution = resolve_classes(&catalog, &tokens(&["ma200_jones", "MA200_JONES"])).unwrap();
        assert_eq!(names(&resolution, |c| &c.name), vec!["ma200_jones"]);
    }

    #[test]
    fn overlapping_tokens_may_select_an_entry_twice() {
        let catalog = class_catalog();
        let resolution = resolve_classes(&catalog, &tokens(&["cs101", "cs101_smith"])).unwrap();
        assert_eq!(
            names(&resolution, |c| &c.name),
            vec!["cs101_smith", "cs101_lee", "cs101_smith"]
        );
    }

    #[test]
    fn roles_match_case_insensitively() {
        let catalog = role_catalog();
        let resolution = resolve_roles(&catalog, &tokens(&["member", "guest"])).unwrap();
        assert!(!resolution.all);
        assert_eq!(names(&resolution, |r| &r.name), vec!["Member", "Guest"]);
    }

    #[test]
    fn unknown_role_names_the_token_and_resolves_nothing() {
        let catalog = role_catalog();
        let err = resolve_roles(&catalog, &tokens(&["member", "vip"])).unwrap_err();
        assert_eq!(err, CommandError::UnknownRole("vip".to_owned()));
    }

    #[test]
    fn all_is_just_a_role_name_for_roles() {
        let catalog = role_catalog();
        let err = resolve_roles(&catalog, &tokens(&["all"])).unwrap_err();
        assert_eq!(err, CommandError::UnknownRole("all".to_owned()));
    }
}
