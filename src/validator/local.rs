// ponctuation atext permise dans un dot-atom, en plus des lettres et chiffres ASCII
const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

/// Règles strictes: dot-atom, atomes atext non vides séparés par un seul '.'.
pub(crate) fn is_local_strict(s: &str) -> bool {
    s.split('.').all(|atom| {
        !atom.is_empty()
            && atom
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c))
    })
}

/// Règles relaxed: autorise aussi une quoted-string simple. Elle part telle
/// quelle dans `RCPT TO`, donc ni caractères de contrôle ni guillemets internes.
pub(crate) fn is_local_relaxed(s: &str) -> bool {
    match s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => !inner.chars().any(|c| c.is_ascii_control() || c == '"'),
        None => is_local_strict(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_dots() {
        assert!(!is_local_strict(".abc"));
        assert!(!is_local_strict("abc."));
        assert!(!is_local_strict("a..b"));
        assert!(is_local_strict("a.b"));
    }

    #[test]
    fn strict_rejects_spaces_and_brackets() {
        assert!(!is_local_strict("a b"));
        assert!(!is_local_strict("a<b"));
        assert!(!is_local_strict("jos\u{e9}"));
        assert!(is_local_strict("first.last+tag"));
        assert!(is_local_strict("o'brien"));
    }

    #[test]
    fn relaxed_quoted() {
        assert!(is_local_relaxed("\"a b\""));
        assert!(is_local_relaxed("first.last"));
        assert!(!is_local_relaxed("\"a\r\nb\""));
        assert!(!is_local_relaxed("\"a\"b\""));
        assert!(!is_local_relaxed("\""));
    }
}
