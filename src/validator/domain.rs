const MAX_LABEL_LEN: usize = 63;

/// Passe le domaine en IDNA puis vérifie chaque label et le TLD.
/// Push des raisons invalidantes dans `reasons`.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) {
    let Ok(ascii) = idna::domain_to_ascii(domain) else {
        reasons.push("domain punycode conversion failed".to_string());
        return;
    };
    if ascii.is_empty() {
        reasons.push("domain empty after IDNA conversion".to_string());
        return;
    }
    if !ascii.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }
    for label in ascii.split('.') {
        if let Some(problem) = label_problem(label) {
            reasons.push(problem);
        }
    }
    if let Some((_, tld)) = ascii.rsplit_once('.') {
        if !tld.is_empty() && !is_valid_tld(tld) {
            reasons.push(format!(
                "top-level domain '{tld}' must be 2+ letters or an IDNA label"
            ));
        }
    }
}

// TLD: au moins deux lettres, ou un label punycode (`xn--`). Exclut donc les
// littéraux IP (`1.2.3.4`) et les TLD numériques.
fn is_valid_tld(tld: &str) -> bool {
    let lower = tld.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("xn--") {
        return rest.len() >= 2;
    }
    lower.len() >= 2 && lower.bytes().all(|b| b.is_ascii_alphabetic())
}

fn label_problem(label: &str) -> Option<String> {
    if label.is_empty() {
        return Some("empty domain label".to_string());
    }
    if label.len() > MAX_LABEL_LEN {
        return Some(format!(
            "domain label '{label}' length {} > {MAX_LABEL_LEN}",
            label.len()
        ));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Some(format!("domain label '{label}' cannot start/end with '-'"));
    }
    if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Some(format!("domain label '{label}' has invalid chars"));
    }
    None
}

/// Minuscules + IDNA: renvoie `(domaine, domaine_ascii)`.
pub(crate) fn normalize_domain(domain: &str) -> Option<(String, String)> {
    let lower = domain.trim().to_lowercase();
    let ascii = idna::domain_to_ascii(&lower).ok()?;
    if ascii.is_empty() {
        return None;
    }
    Some((lower, ascii))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problems(domain: &str) -> Vec<String> {
        let mut reasons = Vec::new();
        check_domain(domain, &mut reasons);
        reasons
    }

    #[test]
    fn basic_domain_ok() {
        assert!(problems("example.com").is_empty());
        assert!(problems("mail-01.sub.example.co.uk").is_empty());
    }

    #[test]
    fn label_too_long() {
        let long = "a".repeat(64);
        assert!(problems(&format!("{long}.com"))[0].contains("> 63"));
    }

    #[test]
    fn single_label_rejected() {
        assert!(problems("picasso").iter().any(|r| r.contains("at least one dot")));
    }

    #[test]
    fn hyphen_edges_and_empty_labels() {
        assert!(!problems("-bad.example").is_empty());
        assert!(!problems("bad-.example").is_empty());
        assert!(!problems("a..example").is_empty());
    }

    #[test]
    fn tld_must_be_alphabetic() {
        for domain in ["1.2.3.4", "example.123", "example.c", "example.c0m"] {
            assert!(
                problems(domain).iter().any(|r| r.contains("top-level domain")),
                "{domain}"
            );
        }
        assert!(problems("example.io").is_empty());
        assert!(problems("пример.рф").is_empty());
    }

    #[test]
    fn normalize_lowercases_and_converts() {
        let (lower, ascii) = normalize_domain("ExÄmple.COM").expect("valid domain");
        assert_eq!(lower, "exämple.com");
        assert!(ascii.starts_with("xn--"));
    }
}
