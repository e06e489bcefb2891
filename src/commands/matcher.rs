//! Whole-token executor matching.

/// Characters that end an executor token.
#[inline]
pub fn is_separator(c: char) -> bool {
    c.is_whitespace()
}

/// Match `executor` against the start of `text`, ignoring ASCII case.
///
/// Matches only whole tokens: the executor must be followed by end of input
/// or a separator. On a match returns the argument text with exactly one
/// leading separator removed.
///
/// ```
/// use slcmd::commands::match_executor;
///
/// assert_eq!(match_executor("ban", "BAN @user"), Some("@user"));
/// assert_eq!(match_executor("ban", "banana"), None);
/// ```
pub fn match_executor<'t>(executor: &str, text: &'t str) -> Option<&'t str> {
    let head = text.get(..executor.len())?;
    if !head.eq_ignore_ascii_case(executor) {
        return None;
    }

    let mut rest = text[executor.len()..].chars();
    match rest.next() {
        None => Some(""),
        Some(c) if is_separator(c) => Some(rest.as_str()),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_with_arguments() {
        assert_eq!(match_executor("ping", "ping"), Some(""));
        assert_eq!(match_executor("ban", "ban @user"), Some("@user"));
        assert_eq!(match_executor("ban", "ban"), Some(""));
        assert_eq!(match_executor("ban", "ban "), Some(""));
    }

    #[test]
    fn test_whole_token_only() {
        assert_eq!(match_executor("ban", "banana"), None);
        assert_eq!(match_executor("kick", "kick-all @x"), None);
        assert_eq!(match_executor("kick-all", "kick-all @x"), Some("@x"));
        assert_eq!(match_executor("ping", "pin"), None);
        assert_eq!(match_executor("ping", ""), None);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(match_executor("Help", "hElP me"), Some("me"));
    }

    #[test]
    fn test_single_separator_stripped() {
        assert_eq!(match_executor("say", "say  two spaces"), Some(" two spaces"));
        assert_eq!(match_executor("say", "say\nline two"), Some("line two"));
        assert_eq!(match_executor("say", "say\tx"), Some("x"));
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(match_executor("ban", "bä"), None);
        assert_eq!(match_executor("grüß", "grüß dich"), Some("dich"));
        assert_eq!(match_executor("ping", "ping\u{3000}全角"), Some("全角"));
    }
}
