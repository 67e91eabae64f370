//! Campaign attribution parameters carried in the page URL query string.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    #[serde(rename = "utm_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "utm_medium", default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(rename = "utm_campaign", default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(rename = "utm_content", default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "utm_term", default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

impl UtmParams {
    /// Extract `utm_*` parameters from an absolute page URL. Unparseable
    /// URLs and empty values yield no parameters. The first occurrence of a
    /// repeated key wins.
    pub fn from_page_url(page_url: &str) -> Self {
        let Ok(parsed) = url::Url::parse(page_url) else {
            return Self::default();
        };

        let mut params = Self::default();
        for (key, value) in parsed.query_pairs() {
            if value.is_empty() {
                continue;
            }
            let slot = match &*key {
                "utm_source" => &mut params.source,
                "utm_medium" => &mut params.medium,
                "utm_campaign" => &mut params.campaign,
                "utm_content" => &mut params.content,
                "utm_term" => &mut params.term,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.medium.is_none()
            && self.campaign.is_none()
            && self.content.is_none()
            && self.term.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_known_keys() {
        let utm = UtmParams::from_page_url(
            "https://shop.example.com/sale?utm_source=newsletter&utm_medium=email&utm_campaign=spring%20sale&page=2",
        );
        assert_eq!(utm.source.as_deref(), Some("newsletter"));
        assert_eq!(utm.medium.as_deref(), Some("email"));
        assert_eq!(utm.campaign.as_deref(), Some("spring sale"));
        assert_eq!(utm.content, None);
        assert_eq!(utm.term, None);
        assert!(!utm.is_empty());
    }

    #[test]
    fn test_no_query_or_bad_url() {
        assert!(UtmParams::from_page_url("https://example.com/").is_empty());
        assert!(UtmParams::from_page_url("not a url").is_empty());
        assert!(UtmParams::from_page_url("https://example.com/?utm_source=").is_empty());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let utm = UtmParams::from_page_url("https://example.com/?utm_term=a&utm_term=b");
        assert_eq!(utm.term.as_deref(), Some("a"));
    }

    #[test]
    fn test_serializes_only_present_keys() {
        let utm = UtmParams {
            source: Some("ads".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&utm).unwrap();
        assert_eq!(json, r#"{"utm_source":"ads"}"#);
    }
}
