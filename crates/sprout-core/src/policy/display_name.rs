use crate::domain::identity::{IdentityAttributes, non_blank};

/// Pick a display name: username, preferred username, full name, then the
/// local part of the email. Empty when nothing usable is available.
#[must_use]
pub fn resolve_display_name(username: &str, attrs: &IdentityAttributes) -> String {
    let email_local = attrs
        .email()
        .and_then(|email| email.split('@').next())
        .and_then(|local| non_blank(Some(local)));

    [
        non_blank(Some(username)),
        non_blank(attrs.preferred_username.as_deref()),
        non_blank(attrs.name.as_deref()),
        email_local,
    ]
    .into_iter()
    .flatten()
    .next()
    .unwrap_or_default()
    .to_string()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(email: Option<&str>, name: Option<&str>, preferred: Option<&str>) -> IdentityAttributes {
        IdentityAttributes {
            email: email.map(str::to_string),
            name: name.map(str::to_string),
            preferred_username: preferred.map(str::to_string),
        }
    }

    #[test]
    fn first_non_empty_source_wins() {
        let cases = [
            ("ann", attrs(Some("a@x.com"), Some("Ann A"), Some("annie")), "ann"),
            ("", attrs(Some("a@x.com"), Some("Ann A"), Some("annie")), "annie"),
            (" ", attrs(Some("a@x.com"), Some("Ann A"), Some("  ")), "Ann A"),
            ("", attrs(Some("a.b@x.com"), None, None), "a.b"),
            ("", attrs(Some("@x.com"), None, None), ""),
            ("", attrs(None, None, None), ""),
        ];

        for (username, attrs, expected) in cases {
            assert_eq!(resolve_display_name(username, &attrs), expected, "{attrs:?}");
        }
    }
}
