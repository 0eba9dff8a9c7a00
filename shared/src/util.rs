/// Minimal email-format check for receipt prompts.
///
/// Mirrors the console's behavior: an address that fails this check is
/// treated as "no email", never as a reason to block checkout.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
        && !email.contains(char::is_whitespace)
}
