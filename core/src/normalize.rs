use crate::config::ParserConfig;
use url::{Url, form_urlencoded};

/// Step names equal to the placeholder mean the step identity is not known yet.
pub fn normalize_step_name(name: Option<&str>, config: &ParserConfig) -> Option<String> {
    match name {
        Some(name) if name.is_empty() || name == config.placeholder_step_name => {
            tracing::trace!(name, "suppressing placeholder step name");
            None
        }
        Some(name) => Some(name.to_string()),
        None => None,
    }
}

/// Strip the transport's routing parameters from a step URL.
///
/// Kept parameters, the fragment and the rest of the URL survive byte-for-byte.
/// Unparseable URLs are kept as-is.
pub fn normalize_url(raw: &str, config: &ParserConfig) -> String {
    if let Err(error) = Url::parse(raw) {
        tracing::trace!(%error, raw, "keeping unparseable step url");
        return raw.to_string();
    }

    let (base, rest) = match raw.split_once('?') {
        Some(parts) => parts,
        None => return raw.to_string(),
    };
    let (query, fragment) = match rest.split_once('#') {
        Some((query, fragment)) => (query, Some(fragment)),
        None => (rest, None),
    };

    let segments: Vec<&str> = query.split('&').collect();
    let kept: Vec<&str> = segments
        .iter()
        .copied()
        .filter(|segment| !is_stripped_segment(segment, config))
        .collect();
    if kept.len() == segments.len() {
        return raw.to_string();
    }

    let mut normalized = base.to_string();
    if !kept.is_empty() {
        normalized.push('?');
        normalized.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        normalized.push('#');
        normalized.push_str(fragment);
    }
    normalized
}

fn is_stripped_segment(segment: &str, config: &ParserConfig) -> bool {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .is_some_and(|(key, _)| config.is_stripped_param(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_name_is_suppressed() {
        let config = ParserConfig::default();
        assert_eq!(normalize_step_name(Some("step"), &config), None);
        assert_eq!(normalize_step_name(Some(""), &config), None);
        assert_eq!(normalize_step_name(None, &config), None);
        assert_eq!(
            normalize_step_name(Some("send-email"), &config),
            Some("send-email".to_string())
        );
    }

    #[test]
    fn test_custom_placeholder() {
        let config = ParserConfig {
            placeholder_step_name: "$pending".into(),
            ..ParserConfig::default()
        };
        assert_eq!(
            normalize_step_name(Some("step"), &config),
            Some("step".to_string())
        );
        assert_eq!(normalize_step_name(Some("$pending"), &config), None);
    }

    #[test]
    fn test_routing_params_are_stripped() {
        let config = ParserConfig::default();
        assert_eq!(
            normalize_url("http://localhost:3000/api/inngest?fnId=hello&stepId=step", &config),
            "http://localhost:3000/api/inngest"
        );
    }

    #[test]
    fn test_other_params_survive() {
        let config = ParserConfig::default();
        assert_eq!(
            normalize_url("https://app.example.com/api?fnId=a&region=eu&stepId=b", &config),
            "https://app.example.com/api?region=eu"
        );
    }

    #[test]
    fn test_kept_params_survive_byte_for_byte() {
        let config = ParserConfig::default();
        assert_eq!(
            normalize_url("https://h/api?fnId=a&debug&q=a%20b", &config),
            "https://h/api?debug&q=a%20b"
        );
        assert_eq!(
            normalize_url("https://h/api?step%49d=s&x=1#frag", &config),
            "https://h/api?x=1#frag"
        );
    }

    #[test]
    fn test_origin_only_url_gains_no_trailing_slash() {
        let config = ParserConfig::default();
        assert_eq!(normalize_url("http://h?fnId=a", &config), "http://h");
        assert_eq!(normalize_url("http://h?fnId=a#top", &config), "http://h#top");
    }

    #[test]
    fn test_url_without_routing_params_is_untouched() {
        let config = ParserConfig::default();
        assert_eq!(
            normalize_url("https://app.example.com/api?q=a+b", &config),
            "https://app.example.com/api?q=a+b"
        );
    }

    #[test]
    fn test_unparseable_url_is_kept() {
        let config = ParserConfig::default();
        assert_eq!(normalize_url("not a url", &config), "not a url");
    }
}
