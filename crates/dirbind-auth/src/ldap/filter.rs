//! Search filter construction
//!
//! Caller-supplied values are escaped per RFC 4515 before being embedded in a
//! filter: `(`, `)`, `*`, `\` and NUL become `\28`, `\29`, `\2a`, `\5c` and `\00`.
//! `ldap3::ldap_escape` does this in a single pass over the input, so the
//! backslash of an escape produced for one character is never escaped again.

use dirbind_core::LOGIN_ATTRIBUTE;
use ldap3::ldap_escape;

/// Escape a value for embedding in a search filter.
pub fn escape_filter_value(value: &str) -> String {
    ldap_escape(value).into_owned()
}

/// Build the user search filter for a login name.
pub fn login_filter(login: &str) -> String {
    format!("(&({}={}))", LOGIN_ATTRIBUTE, escape_filter_value(login))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_login_untouched() {
        assert_eq!(escape_filter_value("jdoe"), "jdoe");
        assert_eq!(escape_filter_value("jean.doe-2@corp"), "jean.doe-2@corp");
        assert_eq!(escape_filter_value(""), "");
    }

    #[test]
    fn test_each_special_character() {
        assert_eq!(escape_filter_value("("), "\\28");
        assert_eq!(escape_filter_value(")"), "\\29");
        assert_eq!(escape_filter_value("*"), "\\2a");
        assert_eq!(escape_filter_value("\\"), "\\5c");
        assert_eq!(escape_filter_value("\0"), "\\00");
    }

    #[test]
    fn test_injection_attempt() {
        assert_eq!(escape_filter_value("a)(b"), "a\\29\\28b");
        assert_eq!(
            login_filter("*)(objectClass=*"),
            "(&(sAMAccountName=\\2a\\29\\28objectClass=\\2a))"
        );
    }

    #[test]
    fn test_escapes_are_not_rescaped() {
        // A literal backslash followed by hex must survive as data.
        assert_eq!(escape_filter_value("\\28"), "\\5c28");
        assert_eq!(escape_filter_value("(\\)"), "\\28\\5c\\29");
    }

    #[test]
    fn test_no_unescaped_metacharacters_remain() {
        let login = "x(y)z*w\\v\0u";
        let escaped = escape_filter_value(login);
        assert!(!escaped.contains(['(', ')', '*', '\0']));
        // Every remaining backslash starts one of the five escapes.
        for (i, _) in escaped.match_indices('\\') {
            let code = &escaped[i + 1..i + 3];
            assert!(["28", "29", "2a", "5c", "00"].contains(&code), "{}", code);
        }
    }

    #[test]
    fn test_non_ascii_preserved() {
        assert_eq!(escape_filter_value("josé(ü)"), "josé\\28ü\\29");
    }

    #[test]
    fn test_login_filter_shape() {
        assert_eq!(login_filter("jdoe"), "(&(sAMAccountName=jdoe))");
    }
}
