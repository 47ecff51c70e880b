//! Match criteria of a rule.
//!
//! A [`Predicate`] is the conjunction of every clause that was configured on
//! the rule builder. Unset clauses are wildcards, so a predicate with no
//! clause at all matches every message (a catch-all rule).
//!
//! | clause            | comparison                                            |
//! |-------------------|-------------------------------------------------------|
//! | `from_user`       | exact                                                 |
//! | `msg_type`        | case-insensitive                                      |
//! | `event`           | case-insensitive                                      |
//! | `event_key`       | case-insensitive                                      |
//! | `content`         | exact, against the trimmed message content            |
//! | `content_pattern` | full regex match against the trimmed content          |
//! | `matcher`         | custom [`MessageMatcher`](crate::MessageMatcher)      |
//!
//! The platform is inconsistent about the letter case of event names
//! (`subscribe` in the docs, `SUBSCRIBE` on the wire), hence the
//! case-insensitive identifier clauses.

use regex::Regex;

use crate::handler::BoxedMatcher;
use courier_core::InMessage;

/// Compiled match criteria of one rule.
#[derive(Clone, Default)]
pub struct Predicate {
    pub(crate) from_user: Option<String>,
    /// Stored lower-cased.
    pub(crate) msg_type: Option<String>,
    /// Stored lower-cased.
    pub(crate) event: Option<String>,
    /// Stored lower-cased.
    pub(crate) event_key: Option<String>,
    pub(crate) content: Option<String>,
    /// Anchored on both ends at compile time.
    pub(crate) content_pattern: Option<Regex>,
    pub(crate) matcher: Option<BoxedMatcher>,
}

impl Predicate {
    /// Compiles a content pattern so that it must match the whole content.
    pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$"))
    }

    /// Returns `true` if `message` satisfies every configured clause.
    pub fn test(&self, message: &InMessage) -> bool {
        self.from_user
            .as_deref()
            .is_none_or(|expected| message.from_user.as_deref() == Some(expected))
            && eq_ignore_case(self.msg_type.as_deref(), message.msg_type.as_deref())
            && eq_ignore_case(self.event.as_deref(), message.event.as_deref())
            && eq_ignore_case(self.event_key.as_deref(), message.event_key.as_deref())
            && self
                .content
                .as_deref()
                .is_none_or(|expected| message.trimmed_content() == Some(expected))
            && self
                .content_pattern
                .as_ref()
                .is_none_or(|re| re.is_match(message.trimmed_content().unwrap_or("")))
            && self.matcher.as_ref().is_none_or(|m| m.matches(message))
    }

    /// Returns `true` if no clause is configured.
    pub fn is_catch_all(&self) -> bool {
        self.from_user.is_none()
            && self.msg_type.is_none()
            && self.event.is_none()
            && self.event_key.is_none()
            && self.content.is_none()
            && self.content_pattern.is_none()
            && self.matcher.is_none()
    }
}

/// `expected` is already lower-cased; an absent actual value never matches.
fn eq_ignore_case(expected: Option<&str>, actual: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => actual.is_some_and(|a| a.to_lowercase() == expected),
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate")
            .field("from_user", &self.from_user)
            .field("msg_type", &self.msg_type)
            .field("event", &self.event)
            .field("event_key", &self.event_key)
            .field("content", &self.content)
            .field(
                "content_pattern",
                &self.content_pattern.as_ref().map(Regex::as_str),
            )
            .field("has_matcher", &self.matcher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn with_msg_type(value: &str) -> Predicate {
        Predicate {
            msg_type: Some(value.to_lowercase()),
            ..Default::default()
        }
    }

    fn with_content(value: &str) -> Predicate {
        Predicate {
            content: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn with_pattern(pattern: &str) -> Predicate {
        Predicate {
            content_pattern: Some(Predicate::compile_pattern(pattern).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_predicate_matches_everything() {
        let predicate = Predicate::default();
        assert!(predicate.is_catch_all());
        assert!(predicate.test(&InMessage::new()));
        assert!(predicate.test(&InMessage::new().with_content("anything").with_event("click")));
    }

    #[test]
    fn identifiers_ignore_case() {
        assert!(with_msg_type("text").test(&InMessage::new().with_msg_type("TEXT")));
        assert!(with_msg_type("TEXT").test(&InMessage::new().with_msg_type("text")));
        assert!(!with_msg_type("text").test(&InMessage::new().with_msg_type("image")));
    }

    #[test]
    fn absent_field_never_matches_configured_clause() {
        assert!(!with_msg_type("text").test(&InMessage::new()));
        assert!(!with_content("hi").test(&InMessage::new()));
    }

    #[test]
    fn content_is_case_sensitive() {
        assert!(!with_content("Hi").test(&InMessage::new().with_content("hi")));
    }

    #[test]
    fn content_is_compared_after_trimming() {
        assert!(with_content("hi").test(&InMessage::new().with_content("  hi  ")));
        // the configured value is used verbatim
        assert!(!with_content(" hi ").test(&InMessage::new().with_content(" hi ")));
    }

    #[test]
    fn ideographic_space_is_part_of_content() {
        assert!(!with_content("hi").test(&InMessage::new().with_content("\u{3000}hi\u{3000}")));
    }

    #[test]
    fn pattern_must_match_whole_content() {
        let predicate = with_pattern("^hi.*");
        assert!(predicate.test(&InMessage::new().with_content("hi there")));
        assert!(!predicate.test(&InMessage::new().with_content("bye")));

        let partial = with_pattern("hi");
        assert!(!partial.test(&InMessage::new().with_content("oh hi there")));
        assert!(partial.test(&InMessage::new().with_content(" hi ")));
    }

    #[test]
    fn pattern_sees_empty_string_for_absent_content() {
        assert!(with_pattern(".*").test(&InMessage::new()));
        assert!(!with_pattern(".+").test(&InMessage::new()));
    }

    #[test]
    fn from_user_is_exact() {
        let predicate = Predicate {
            from_user: Some("o_Alice".into()),
            ..Default::default()
        };
        assert!(predicate.test(&InMessage::new().with_from_user("o_Alice")));
        assert!(!predicate.test(&InMessage::new().with_from_user("o_alice")));
    }

    #[test]
    fn all_clauses_must_hold() {
        let predicate = Predicate {
            msg_type: Some("event".into()),
            event: Some("click".into()),
            event_key: Some("menu_help".into()),
            matcher: Some(Arc::new(|msg: &InMessage| msg.from_user.is_some())),
            ..Default::default()
        };
        let message = InMessage::new()
            .with_msg_type("event")
            .with_event("CLICK")
            .with_event_key("MENU_HELP")
            .with_from_user("o_user");

        assert!(predicate.test(&message));
        assert!(!predicate.test(&message.clone().with_event_key("menu_about")));

        let mut anonymous = message;
        anonymous.from_user = None;
        assert!(!predicate.test(&anonymous));
    }
}
