//! Envelope and address types.

use chrono::{DateTime, FixedOffset};

/// Message envelope.
///
/// Address lists are `None` when the server sent `NIL` and `Some(vec![])`
/// for an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    /// Date header.
    pub date: Option<String>,
    /// Subject header.
    pub subject: Option<String>,
    /// From addresses.
    pub from: Option<Vec<Address>>,
    /// Sender addresses.
    pub sender: Option<Vec<Address>>,
    /// Reply-To addresses.
    pub reply_to: Option<Vec<Address>>,
    /// To addresses.
    pub to: Option<Vec<Address>>,
    /// Cc addresses.
    pub cc: Option<Vec<Address>>,
    /// Bcc addresses.
    pub bcc: Option<Vec<Address>>,
    /// In-Reply-To header.
    pub in_reply_to: Option<String>,
    /// Message-ID header.
    pub message_id: Option<String>,
}

impl Envelope {
    /// Parses the `date` field as an RFC 2822 date.
    ///
    /// Returns `None` when the field is missing or not a valid date.
    #[must_use]
    pub fn parsed_date(&self) -> Option<DateTime<FixedOffset>> {
        let date = self.date.as_deref()?;
        DateTime::parse_from_rfc2822(date.trim()).ok()
    }
}

/// Email address from an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Display name.
    pub name: Option<String>,
    /// Source route (obsolete).
    pub source_route: Option<String>,
    /// Local part of the mailbox.
    pub account: Option<String>,
    /// Host name (domain part).
    pub host: Option<String>,
}

impl Address {
    /// Returns `account@host`, or an empty string without an account.
    #[must_use]
    pub fn mailbox(&self) -> String {
        match &self.account {
            Some(account) => format!("{account}@{}", self.host.as_deref().unwrap_or_default()),
            None => String::new(),
        }
    }

    /// Returns a human-readable form of the address.
    ///
    /// `Name <mailbox>` when both are known, whichever one is known
    /// otherwise, and an empty string when neither is.
    #[must_use]
    pub fn display(&self) -> String {
        let mailbox = self.mailbox();
        let name = self.name.as_deref().unwrap_or_default();

        match (name.is_empty(), mailbox.is_empty()) {
            (true, true) => String::new(),
            (true, false) => mailbox,
            (false, true) => name.to_string(),
            (false, false) => format!("{name} <{mailbox}>"),
        }
    }

    /// Returns true if this entry opens an RFC 2822 group.
    ///
    /// The group name is carried in `account`.
    #[must_use]
    pub const fn is_group_start(&self) -> bool {
        self.host.is_none() && self.account.is_some()
    }

    /// Returns true if this entry closes an RFC 2822 group.
    #[must_use]
    pub const fn is_group_end(&self) -> bool {
        self.host.is_none() && self.account.is_none()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn address(name: Option<&str>, account: Option<&str>, host: Option<&str>) -> Address {
        Address {
            name: name.map(str::to_string),
            source_route: None,
            account: account.map(str::to_string),
            host: host.map(str::to_string),
        }
    }

    #[test]
    fn test_display_mailbox_only() {
        let addr = address(None, Some("bob"), Some("x.com"));
        assert_eq!(addr.mailbox(), "bob@x.com");
        assert_eq!(addr.display(), "bob@x.com");
    }

    #[test]
    fn test_display_name_only() {
        let addr = address(Some("Bob"), None, None);
        assert_eq!(addr.mailbox(), "");
        assert_eq!(addr.display(), "Bob");
    }

    #[test]
    fn test_display_both() {
        let addr = address(Some("Bob"), Some("bob"), Some("x.com"));
        assert_eq!(addr.display(), "Bob <bob@x.com>");
    }

    #[test]
    fn test_display_neither() {
        let addr = address(None, None, Some("x.com"));
        assert_eq!(addr.display(), "");
        let addr = address(Some(""), None, None);
        assert_eq!(addr.display(), "");
    }

    #[test]
    fn test_group_markers() {
        assert!(address(None, Some("team"), None).is_group_start());
        assert!(address(None, None, None).is_group_end());
        assert!(!address(None, Some("bob"), Some("x.com")).is_group_start());
    }

    #[test]
    fn test_parsed_date() {
        let envelope = Envelope {
            date: Some("Wed, 17 Jul 1996 02:23:25 -0700".to_string()),
            ..Default::default()
        };
        let date = envelope.parsed_date().unwrap();
        assert_eq!(date.offset().local_minus_utc(), -7 * 3600);

        let envelope = Envelope {
            date: Some("yesterday-ish".to_string()),
            ..Default::default()
        };
        assert!(envelope.parsed_date().is_none());
        assert!(Envelope::default().parsed_date().is_none());
    }
}
