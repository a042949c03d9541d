//! Scrubbing of secrets from diagnostic output.

use std::sync::OnceLock;

use regex::Regex;

pub const FILTERED: &str = "[FILTERED]";

static FORM_SECRETS: OnceLock<Regex> = OnceLock::new();
static JSON_ACCESS_TOKEN: OnceLock<Regex> = OnceLock::new();

fn form_secrets() -> &'static Regex {
    FORM_SECRETS.get_or_init(|| {
        Regex::new(r"(?i)(refresh_token|client_id|client_secret)=([^&\s]+)")
            .expect("static regex is valid")
    })
}

fn json_access_token() -> &'static Regex {
    JSON_ACCESS_TOKEN.get_or_init(|| {
        Regex::new(r#"(?i)"access_token"\s*:\s*"[^"]*""#).expect("static regex is valid")
    })
}

/// Replace credential values in form- or JSON-encoded text.
pub fn redact(text: &str) -> String {
    let text = form_secrets().replace_all(text, format!("${{1}}={FILTERED}").as_str());
    json_access_token()
        .replace_all(&text, format!(r#""access_token":"{FILTERED}""#).as_str())
        .into_owned()
}

/// Header value as it may appear in logs.
pub fn redact_header(name: &str, value: &str) -> String {
    if name.eq_ignore_ascii_case("authorization") {
        FILTERED.to_string()
    } else {
        redact(value)
    }
}
