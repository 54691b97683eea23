//! Text sanitization for upstream prose

use regex::Regex;
use std::sync::OnceLock;

/// Longest description kept on a normalized event, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

fn slug_separator_regex() -> &'static Regex {
    static SEP: OnceLock<Regex> = OnceLock::new();
    SEP.get_or_init(|| Regex::new(r"[/\s]+").expect("valid slug regex"))
}

fn leading_subject_regex() -> &'static Regex {
    static LEAD: OnceLock<Regex> = OnceLock::new();
    LEAD.get_or_init(|| Regex::new(r"^(.*?)(?:\s*[-–—]|\s*:)").expect("valid subject regex"))
}

/// Subject of a headline: the text before the first dash or colon, else the
/// first four words.
pub fn leading_subject(title: &str) -> String {
    let title = title.trim();
    if let Some(caps) = leading_subject_regex().captures(title) {
        let subject = caps[1].trim();
        if !subject.is_empty() {
            return subject.to_string();
        }
    }

    title.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// Decode named and numeric HTML entities.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Remove tags, decode entities and trim.
pub fn strip_markup(text: &str) -> String {
    let without_tags = tag_regex().replace_all(text, "");
    decode_entities(&without_tags).trim().to_string()
}

/// Cut to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// Markup-free, length-capped event description.
pub fn sanitize_description(text: &str) -> String {
    truncate_chars(&strip_markup(text), MAX_DESCRIPTION_CHARS)
}

/// "Pub/Sub" -> "pub-sub", "Amazon  EC2" -> "amazon-ec2".
pub fn slugify(name: &str) -> String {
    slug_separator_regex()
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("  <p>Increased <b>error</b> rates</p>\n"),
            "Increased error rates"
        );
        assert_eq!(strip_markup("R&amp;D &lt;beta&gt;"), "R&D <beta>");
        assert_eq!(strip_markup(""), "");
    }

    #[test]
    fn test_decodes_named_and_numeric_entities() {
        assert_eq!(strip_markup("It&rsquo;s back"), "It\u{2019}s back");
        assert_eq!(strip_markup("Caf&eacute; &mdash; done"), "Caf\u{e9} \u{2014} done");
        assert_eq!(decode_entities("We&#8217;re &#x41;ll set"), "We\u{2019}re All set");
        assert_eq!(strip_markup("&nbsp;Storage&nbsp;"), "Storage");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 50), "short");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = format!("<div>{}</div>", "a".repeat(800));
        assert_eq!(sanitize_description(&long).chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_leading_subject() {
        assert_eq!(leading_subject("Cloud Run - elevated latency"), "Cloud Run");
        assert_eq!(leading_subject("BigQuery: Elevated error rates"), "BigQuery");
        assert_eq!(leading_subject("Vertex AI — quota issue"), "Vertex AI");
        assert_eq!(
            leading_subject("Multiple products experiencing elevated latency"),
            "Multiple products experiencing elevated"
        );
        assert_eq!(leading_subject("- leading dash only"), "- leading dash only");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Amazon EC2"), "amazon-ec2");
        assert_eq!(slugify("Pub/Sub"), "pub-sub");
        assert_eq!(slugify("Security  &  Identity"), "security-&-identity");
        assert_eq!(slugify("App Service (Linux)"), "app-service-(linux)");
    }
}
