//! crates/essay_writer_core/src/domain.rs
//!
//! Defines the core data structures for the essay writer.
//! The raw `EssayForm` is what a user edits; `GenerationRequest` is the validated
//! request that is allowed to reach the generation service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::num::NonZeroU32;
use uuid::Uuid;

//=========================================================================================
// Essay Output
//=========================================================================================

/// One heading/content pair of a generated essay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EssayParagraph {
    pub heading: String,
    pub content: String,
}

//=========================================================================================
// Form Selections
//=========================================================================================

/// The academic level the essay is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EssayLevel {
    MiddleSchool,
    #[default]
    HighSchool,
    University,
    Professional,
}

impl EssayLevel {
    pub const ALL: [EssayLevel; 4] = [
        EssayLevel::MiddleSchool,
        EssayLevel::HighSchool,
        EssayLevel::University,
        EssayLevel::Professional,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EssayLevel::MiddleSchool => "Middle School",
            EssayLevel::HighSchool => "High School",
            EssayLevel::University => "University",
            EssayLevel::Professional => "Professional / CSS",
        }
    }
}

/// The user-selected essay size category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LengthClass {
    Short,
    Medium,
    Long,
    Custom,
}

impl LengthClass {
    pub fn label(self) -> &'static str {
        match self {
            LengthClass::Short => "Short (approx. 300 words)",
            LengthClass::Medium => "Medium (approx. 600 words)",
            LengthClass::Long => "Long (approx. 1000 words)",
            LengthClass::Custom => "Custom Word Count",
        }
    }

    /// Parses the wire name of a length class. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "SHORT" => Some(LengthClass::Short),
            "MEDIUM" => Some(LengthClass::Medium),
            "LONG" => Some(LengthClass::Long),
            "CUSTOM" => Some(LengthClass::Custom),
            _ => None,
        }
    }
}

/// The natural language the essay text should be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetLanguage {
    #[default]
    English,
    Spanish,
    French,
    German,
    ChineseSimplified,
    Japanese,
    Arabic,
    Hindi,
}

impl TargetLanguage {
    /// The language name as used in generation instructions.
    pub fn name(self) -> &'static str {
        match self {
            TargetLanguage::English => "English",
            TargetLanguage::Spanish => "Spanish",
            TargetLanguage::French => "French",
            TargetLanguage::German => "German",
            TargetLanguage::ChineseSimplified => "Chinese (Simplified)",
            TargetLanguage::Japanese => "Japanese",
            TargetLanguage::Arabic => "Arabic",
            TargetLanguage::Hindi => "Hindi",
        }
    }

    /// The language name as shown in a selection list.
    pub fn label(self) -> &'static str {
        match self {
            TargetLanguage::English => "English (Default)",
            other => other.name(),
        }
    }

    pub fn is_default(self) -> bool {
        self == TargetLanguage::default()
    }
}

//=========================================================================================
// Raw Form Input
//=========================================================================================

/// The form exactly as the user filled it in. Nothing here is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayForm {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub level: EssayLevel,
    /// `None` when the selection is absent or not a known length class.
    #[serde(default, deserialize_with = "lenient_length_class")]
    pub length: Option<LengthClass>,
    /// The custom word count as typed; only consulted for `LengthClass::Custom`.
    #[serde(default)]
    pub custom_word_count: Option<String>,
    #[serde(default)]
    pub target_language: TargetLanguage,
    #[serde(default)]
    pub requirements: String,
}

fn lenient_length_class<'de, D>(deserializer: D) -> Result<Option<LengthClass>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(LengthClass::parse))
}

/// Reasons a form cannot be turned into a `GenerationRequest`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a topic for the essay.")]
    EmptyTopic,
    #[error("Please enter a custom word count.")]
    MissingWordCount,
    #[error("Please enter a valid custom word count greater than zero (got '{0}').")]
    InvalidWordCount(String),
}

impl EssayForm {
    /// Checks the form and produces the request that may be sent for generation.
    pub fn validate(&self) -> Result<GenerationRequest, ValidationError> {
        if self.topic.trim().is_empty() {
            return Err(ValidationError::EmptyTopic);
        }

        let length = match self.length.unwrap_or(LengthClass::Medium) {
            LengthClass::Short => EssayLength::Short,
            LengthClass::Medium => EssayLength::Medium,
            LengthClass::Long => EssayLength::Long,
            LengthClass::Custom => EssayLength::Custom {
                word_count: parse_word_count(self.custom_word_count.as_deref())?,
            },
        };

        Ok(GenerationRequest {
            topic: self.topic.clone(),
            level: self.level,
            length,
            target_language: self.target_language,
            requirements: self.requirements.clone(),
        })
    }
}

fn parse_word_count(raw: Option<&str>) -> Result<NonZeroU32, ValidationError> {
    let text = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingWordCount)?;

    text.parse::<i64>()
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .and_then(NonZeroU32::new)
        .ok_or_else(|| ValidationError::InvalidWordCount(text.to_string()))
}

//=========================================================================================
// Validated Request
//=========================================================================================

/// The validated essay length. A custom length always carries a positive word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "class",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum EssayLength {
    Short,
    Medium,
    Long,
    Custom { word_count: NonZeroU32 },
}

impl EssayLength {
    pub fn class(self) -> LengthClass {
        match self {
            EssayLength::Short => LengthClass::Short,
            EssayLength::Medium => LengthClass::Medium,
            EssayLength::Long => LengthClass::Long,
            EssayLength::Custom { .. } => LengthClass::Custom,
        }
    }

    pub fn custom_word_count(self) -> Option<u32> {
        match self {
            EssayLength::Custom { word_count } => Some(word_count.get()),
            _ => None,
        }
    }
}

/// A request that has passed form validation: non-blank topic and, for custom
/// lengths, a positive word count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub(crate) topic: String,
    pub(crate) level: EssayLevel,
    pub(crate) length: EssayLength,
    pub(crate) target_language: TargetLanguage,
    pub(crate) requirements: String,
}

impl GenerationRequest {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn level(&self) -> EssayLevel {
        self.level
    }

    pub fn length(&self) -> EssayLength {
        self.length
    }

    pub fn target_language(&self) -> TargetLanguage {
        self.target_language
    }

    pub fn requirements(&self) -> &str {
        &self.requirements
    }

    /// Copies the request back into editable form state.
    pub fn to_form(&self) -> EssayForm {
        EssayForm {
            topic: self.topic.clone(),
            level: self.level,
            length: Some(self.length.class()),
            custom_word_count: self.length.custom_word_count().map(|n| n.to_string()),
            target_language: self.target_language,
            requirements: self.requirements.clone(),
        }
    }
}

//=========================================================================================
// History
//=========================================================================================

/// A persisted record of one successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub request: GenerationRequest,
    pub essay_content: Vec<EssayParagraph>,
}

impl HistoryEntry {
    /// Records a generation that just succeeded.
    pub fn new(request: GenerationRequest, essay_content: Vec<EssayParagraph>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            request,
            essay_content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(topic: &str) -> EssayForm {
        EssayForm {
            topic: topic.to_string(),
            ..EssayForm::default()
        }
    }

    fn custom_form(word_count: Option<&str>) -> EssayForm {
        EssayForm {
            length: Some(LengthClass::Custom),
            custom_word_count: word_count.map(str::to_string),
            ..form("Renewable energy")
        }
    }

    #[test]
    fn blank_topic_is_rejected() {
        assert_eq!(form("").validate(), Err(ValidationError::EmptyTopic));
        assert_eq!(form("   \t\n").validate(), Err(ValidationError::EmptyTopic));
    }

    #[test]
    fn custom_length_requires_positive_word_count() {
        assert_eq!(
            custom_form(None).validate(),
            Err(ValidationError::MissingWordCount)
        );
        assert_eq!(
            custom_form(Some("")).validate(),
            Err(ValidationError::MissingWordCount)
        );
        assert_eq!(
            custom_form(Some("0")).validate(),
            Err(ValidationError::InvalidWordCount("0".to_string()))
        );
        assert_eq!(
            custom_form(Some("-5")).validate(),
            Err(ValidationError::InvalidWordCount("-5".to_string()))
        );
        assert!(matches!(
            custom_form(Some("many")).validate(),
            Err(ValidationError::InvalidWordCount(_))
        ));
    }

    #[test]
    fn custom_length_keeps_word_count() {
        let request = custom_form(Some(" 750 ")).validate().unwrap();
        assert_eq!(request.length().custom_word_count(), Some(750));
        assert_eq!(request.length().class(), LengthClass::Custom);
    }

    #[test]
    fn word_count_is_ignored_for_fixed_lengths() {
        let request = EssayForm {
            length: Some(LengthClass::Long),
            custom_word_count: Some("-5".to_string()),
            ..form("Tides")
        }
        .validate()
        .unwrap();
        assert_eq!(request.length(), EssayLength::Long);
    }

    #[test]
    fn missing_or_unknown_length_falls_back_to_medium() {
        assert_eq!(form("Tides").validate().unwrap().length(), EssayLength::Medium);

        let parsed: EssayForm =
            serde_json::from_str(r#"{"topic":"Tides","length":"ENORMOUS"}"#).unwrap();
        assert_eq!(parsed.length, None);
        assert_eq!(parsed.validate().unwrap().length(), EssayLength::Medium);
    }

    #[test]
    fn form_deserializes_wire_names() {
        let parsed: EssayForm = serde_json::from_str(
            r#"{"topic":"Tides","level":"UNIVERSITY","length":"custom","customWordCount":"400","targetLanguage":"CHINESE_SIMPLIFIED"}"#,
        )
        .unwrap();
        assert_eq!(parsed.level, EssayLevel::University);
        assert_eq!(parsed.length, Some(LengthClass::Custom));
        assert_eq!(parsed.target_language, TargetLanguage::ChineseSimplified);
        assert_eq!(parsed.requirements, "");
    }

    #[test]
    fn request_copies_back_into_form() {
        let original = EssayForm {
            level: EssayLevel::Professional,
            target_language: TargetLanguage::German,
            requirements: "Cite two economists.".to_string(),
            ..custom_form(Some("900"))
        };
        let request = original.validate().unwrap();
        let mut restored = request.to_form();
        assert_eq!(restored.custom_word_count.as_deref(), Some("900"));
        assert_eq!(restored.level, EssayLevel::Professional);

        restored.topic.push_str(" (edited)");
        assert_eq!(request.topic(), "Renewable energy");
    }

    #[test]
    fn labels_match_selection_lists() {
        assert_eq!(EssayLevel::Professional.label(), "Professional / CSS");
        assert_eq!(TargetLanguage::English.label(), "English (Default)");
        assert_eq!(TargetLanguage::English.name(), "English");
        assert!(TargetLanguage::English.is_default());
        assert!(!TargetLanguage::Hindi.is_default());
    }
}
