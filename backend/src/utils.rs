//! Shared helpers used across API domains and background services.
//!
//! Houses human-facing reference-number generation and the `{placeholder}`
//! template renderer used by the SMS pipeline.

use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z0-9_]+)\}").expect("valid placeholder regex"));

/// Builds a reference number like `RES202608071234`.
///
/// Uniqueness is enforced by the corresponding column constraint; callers
/// retry on conflict.
pub fn generate_reference(prefix: &str, date: NaiveDate) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(1000..10000);
    format!("{prefix}{}{suffix}", date.format("%Y%m%d"))
}

/// Substitutes `{variable}` placeholders from the context map.
///
/// Unknown placeholders are left intact so template problems stay visible in
/// the rendered message instead of silently disappearing.
pub fn render_template(body: &str, context: &HashMap<&str, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(body, |caps: &regex::Captures<'_>| {
            match context.get(caps.get(1).map(|m| m.as_str()).unwrap_or_default()) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_number_embeds_date_and_prefix() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).expect("valid date");
        let reference = generate_reference("RES", date);
        assert!(reference.starts_with("RES20260807"));
        assert_eq!(reference.len(), "RES20260807".len() + 4);
    }

    #[test]
    fn render_substitutes_known_placeholders() {
        let mut context = HashMap::new();
        context.insert("customer_name", "Ada Wong".to_string());
        context.insert("room_number", "302".to_string());
        let rendered = render_template(
            "Hi {customer_name}, room {room_number} is ready.",
            &context,
        );
        assert_eq!(rendered, "Hi Ada Wong, room 302 is ready.");
    }

    #[test]
    fn render_keeps_unknown_placeholders() {
        let context = HashMap::new();
        let rendered = render_template("Hello {missing}!", &context);
        assert_eq!(rendered, "Hello {missing}!");
    }
}
