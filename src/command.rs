//! Command grammar checks.
//!
//! Every command has a fixed shape: a case-sensitive keyword anchored at the start of the
//! message, then either nothing or one or more argument tokens.  Malformed invocations are
//! rejected here, before any catalog lookup or permission change happens.

use crate::error::CommandError;

/// Argument grammar for one command keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// The message must be exactly the keyword.
    NoArgs,
    /// One or more tokens of letters, digits, and underscores.
    ClassTokens,
    /// One or more tokens of any non-whitespace characters.
    RoleTokens,
}

/// Validate `content` against the prefixed keyword and its grammar, returning the argument
/// tokens in message order.
pub fn parse_args(
    prefixed_keyword: &str,
    grammar: Grammar,
    content: &str,
) -> Result<Vec<String>, CommandError> {
    let mut terms = content.split_whitespace();
    if terms.next() != Some(prefixed_keyword) {
        return Err(CommandError::Syntax);
    }

    let args: Vec<String> = terms.map(str::to_owned).collect();

    match grammar {
        Grammar::NoArgs => {
            if args.is_empty() {
                Ok(args)
            } else {
                Err(CommandError::Syntax)
            }
        }
        Grammar::ClassTokens => {
            let well_formed = !args.is_empty()
                && args
                    .iter()
                    .all(|arg| arg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            if well_formed {
                Ok(args)
            } else {
                Err(CommandError::Syntax)
            }
        }
        Grammar::RoleTokens => {
            if args.is_empty() {
                Err(CommandError::Syntax)
            } else {
                Ok(args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args_matches_bare_keyword() {
        let args = parse_args("!listclasses", Grammar::NoArgs, "!listclasses").unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn no_args_rejects_trailing_tokens() {
        let result = parse_args("!listclasses", Grammar::NoArgs, "!listclasses now");
        assert_eq!(result, Err(CommandError::Syntax));
    }

    #[test]
    fn keyword_is_case_sensitive() {
        let result = parse_args("!register", Grammar::ClassTokens, "!Register cs101");
        assert_eq!(result, Err(CommandError::Syntax));
    }

    #[test]
    fn class_tokens_require_at_least_one_argument() {
        let result = parse_args("!register", Grammar::ClassTokens, "!register");
        assert_eq!(result, Err(CommandError::Syntax));
    }

    #[test]
    fn class_tokens_are_split_on_whitespace() {
        let args =
            parse_args("!register", Grammar::ClassTokens, "!register cs101  ma200_jones").unwrap();
        assert_eq!(args, vec!["cs101", "ma200_jones"]);
    }

    #[test]
    fn class_tokens_reject_punctuation() {
        let result = parse_args("!register", Grammar::ClassTokens, "!register cs-101");
        assert_eq!(result, Err(CommandError::Syntax));
    }

    #[test]
    fn role_tokens_allow_punctuation() {
        let args = parse_args("!addroles", Grammar::RoleTokens, "!addroles d&d-player").unwrap();
        assert_eq!(args, vec!["d&d-player"]);
    }

    #[test]
    fn role_tokens_require_at_least_one_argument() {
        let result = parse_args("!addroles", Grammar::RoleTokens, "!addroles");
        assert_eq!(result, Err(CommandError::Syntax));
    }
}
