use crate::errors::AuditError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// A page to audit; `name` keys the screenshot file names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTarget {
    pub url: String,
    pub name: String,
}

impl PageTarget {
    pub fn new(url: &str, name: &str) -> Self {
        Self {
            url: url.to_string(),
            name: name.to_string(),
        }
    }
}

/// An article link found on an index page. Identity is `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleLink {
    pub url: String,
    pub text: String,
}

/// Outcome of auditing one target.
///
/// Serialized untagged: a success is the flattened metadata object with
/// `statusCode`, a failure is exactly `{error, url, name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditResult {
    Success(PageAudit),
    Failure(AuditFailure),
}

impl AuditResult {
    pub fn failure(target: &PageTarget, error: &AuditError) -> Self {
        AuditResult::Failure(AuditFailure {
            error: error.to_string(),
            url: target.url.clone(),
            name: target.name.clone(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            AuditResult::Success(page) => &page.name,
            AuditResult::Failure(failure) => &failure.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            AuditResult::Success(page) => &page.url,
            AuditResult::Failure(failure) => &failure.url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuditResult::Success(_))
    }

    /// One-line operator summary of this result
    pub fn summary_line(&self) -> String {
        match self {
            AuditResult::Success(page) => format!(
                "{}: title='{}' | words={} | H1s={} | status={}",
                page.name,
                page.metadata.title.chars().take(60).collect::<String>(),
                page.metadata.word_count,
                page.metadata.h1s.len(),
                page.status_code
            ),
            AuditResult::Failure(failure) => format!(
                "ERROR {}: {}",
                failure.name,
                failure.error.chars().take(100).collect::<String>()
            ),
        }
    }
}

/// A successfully audited page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAudit {
    pub url: String,
    pub name: String,
    /// HTTP status of the desktop navigation, 0 when no response was seen
    pub status_code: u16,
    #[serde(flatten)]
    pub metadata: ExtractedMetadata,
    pub screenshots: Vec<Screenshot>,
}

/// A failed audit; carries no metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditFailure {
    pub error: String,
    pub url: String,
    pub name: String,
}

/// A screenshot written for a target, tagged with its viewport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    /// `desktop`, `desktop_full`, `mobile` or `mobile_full`
    pub viewport: String,
    pub path: PathBuf,
}

/// SEO-relevant snapshot of a rendered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetadata {
    pub title: String,
    pub meta_desc: String,
    pub meta_keywords: String,
    pub canonical: String,
    pub og_title: String,
    pub og_desc: String,
    pub og_image: String,
    pub og_type: String,
    pub twitter_card: String,
    pub robots: String,
    pub h1s: Vec<String>,
    pub h2s: Vec<String>,
    pub h3s: Vec<String>,
    pub h4s: Vec<String>,
    pub internal_links: Vec<LinkInfo>,
    pub external_links: Vec<LinkInfo>,
    pub word_count: usize,
    pub images: Vec<ImageInfo>,
    /// Parsed JSON-LD blocks; malformed blocks are dropped
    pub schemas: Vec<Value>,
    pub ctas: Vec<CtaInfo>,
    pub action_links: Vec<ActionLink>,
    pub author_elements: Vec<String>,
    pub date_elements: Vec<DateInfo>,
    /// Number of paragraphs longer than the minimum length
    pub paragraphs: usize,
    pub paragraph_texts: Vec<String>,
    pub lists: usize,
    pub list_items: usize,
    pub trust_signals: Vec<TrustSignal>,
    pub main_content: String,
    pub body_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInfo {
    pub href: String,
    pub text: String,
    pub is_nav: bool,
    pub has_nofollow: bool,
    pub has_target: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    pub has_alt: bool,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtaInfo {
    pub text: String,
    pub tag: String,
    pub href: String,
    pub classes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLink {
    pub text: String,
    pub href: String,
    pub classes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInfo {
    pub text: String,
    pub datetime: String,
}

/// Keyword categories matched against the lower-cased body text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustSignal {
    EncryptionMentioned,
    SecurityMentioned,
    PrivacyMentioned,
    SocialProof,
    ComplianceMentioned,
    LowRiskOffer,
}

impl TrustSignal {
    /// Every category, in reporting order
    pub const ALL: [TrustSignal; 6] = [
        TrustSignal::EncryptionMentioned,
        TrustSignal::SecurityMentioned,
        TrustSignal::PrivacyMentioned,
        TrustSignal::SocialProof,
        TrustSignal::ComplianceMentioned,
        TrustSignal::LowRiskOffer,
    ];

    /// Lower-case phrases any one of which satisfies the category
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            TrustSignal::EncryptionMentioned => &["bank-level", "256-bit", "encryption"],
            TrustSignal::SecurityMentioned => &["secure", "security"],
            TrustSignal::PrivacyMentioned => &["privacy"],
            TrustSignal::SocialProof => &["testimonial", "review"],
            TrustSignal::ComplianceMentioned => &["fdic", "soc 2", "compliant"],
            TrustSignal::LowRiskOffer => &["free", "no credit card"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success() -> AuditResult {
        AuditResult::Success(PageAudit {
            url: "https://example.com/".to_string(),
            name: "home".to_string(),
            status_code: 200,
            metadata: ExtractedMetadata {
                title: "Home".to_string(),
                h1s: vec!["Welcome".to_string()],
                word_count: 12,
                trust_signals: vec![TrustSignal::LowRiskOffer],
                ..ExtractedMetadata::default()
            },
            screenshots: vec![Screenshot {
                viewport: "desktop".to_string(),
                path: PathBuf::from("out/home_desktop.png"),
            }],
        })
    }

    #[test]
    fn test_success_shape_has_status_and_no_error() {
        let value = serde_json::to_value(success()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["statusCode"], 200);
        assert_eq!(object["title"], "Home");
        assert_eq!(object["metaDesc"], "");
        assert_eq!(object["trustSignals"][0], "low_risk_offer");
        assert!(object.contains_key("h1s"));
        assert!(!object.contains_key("error"));
    }

    #[test]
    fn test_failure_shape_is_exactly_error_url_name() {
        let target = PageTarget::new("https://example.com/slow", "slow");
        let error = AuditError::NavigationTimeout {
            url: target.url.clone(),
            timeout_ms: 15_000,
        };
        let value = serde_json::to_value(AuditResult::failure(&target, &error)).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["error", "name", "url"]);
        assert!(object["error"].as_str().unwrap().contains("Timeout"));
    }

    #[test]
    fn test_untagged_round_trip_picks_the_right_variant() {
        let json = serde_json::to_string(&vec![
            success(),
            AuditResult::Failure(AuditFailure {
                error: "boom".to_string(),
                url: "https://example.com/x".to_string(),
                name: "x".to_string(),
            }),
        ])
        .unwrap();

        let parsed: Vec<AuditResult> = serde_json::from_str(&json).unwrap();
        assert!(parsed[0].is_success());
        assert!(!parsed[1].is_success());
        assert_eq!(parsed[1].name(), "x");
    }

    #[test]
    fn test_summary_lines() {
        assert_eq!(
            success().summary_line(),
            "home: title='Home' | words=12 | H1s=1 | status=200"
        );

        let failure = AuditResult::Failure(AuditFailure {
            error: "x".repeat(300),
            url: "u".to_string(),
            name: "n".to_string(),
        });
        assert_eq!(failure.summary_line(), format!("ERROR n: {}", "x".repeat(100)));
    }
}
