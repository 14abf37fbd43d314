//! crates/essay_writer_core/src/prompt.rs
//!
//! Turns a validated `GenerationRequest` into the instruction text sent to the
//! generation service, together with the word and output-size budgets.

use crate::domain::{EssayLength, GenerationRequest};

/// Substituted for the requirements section when the user left it blank.
pub const REQUIREMENTS_PLACEHOLDER: &str =
    "None provided. Adhere to general best practices for this academic level.";

/// Output tokens allowed per target word. Covers the JSON structure around the text.
const TOKENS_PER_WORD: f64 = 2.0;

const MIN_CUSTOM_WORDS: u32 = 50;
const CUSTOM_WORD_SLACK: u32 = 50;

/// Inclusive word-count bounds the essay is asked to respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordBudget {
    pub min: u32,
    pub max: u32,
}

impl WordBudget {
    pub fn for_length(length: EssayLength) -> Self {
        match length {
            EssayLength::Short => Self { min: 250, max: 350 },
            EssayLength::Medium => Self { min: 550, max: 650 },
            EssayLength::Long => Self { min: 900, max: 1100 },
            EssayLength::Custom { word_count } => {
                let n = word_count.get();
                Self {
                    min: n.saturating_sub(CUSTOM_WORD_SLACK).max(MIN_CUSTOM_WORDS),
                    max: n.saturating_add(CUSTOM_WORD_SLACK),
                }
            }
        }
    }

    /// Upper bound on the reply size, in output tokens.
    pub fn output_token_budget(self) -> u32 {
        let budget = (f64::from(self.max) * TOKENS_PER_WORD).ceil();
        if budget >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            budget as u32
        }
    }
}

/// The prompt for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub text: String,
    pub word_budget: WordBudget,
    pub output_token_budget: u32,
}

/// Builds the prompt for a request. Pure and deterministic.
pub fn build_prompt(request: &GenerationRequest) -> BuiltPrompt {
    let word_budget = WordBudget::for_length(request.length());

    let language_instruction = if request.target_language().is_default() {
        String::new()
    } else {
        format!(
            "\n**Language:** Write entirely in {}. Every heading and every paragraph must be in {}.\n",
            request.target_language().name(),
            request.target_language().name()
        )
    };

    let requirements = if request.requirements().trim().is_empty() {
        REQUIREMENTS_PLACEHOLDER
    } else {
        request.requirements()
    };

    let text = format!(
        r#"You are an expert academic writer and linguist. Your task is to write a high-quality, engaging, and well-structured essay.

**Topic:** "{topic}"

**Academic Level:** "{level}"

**Length:** The essay must be between {min} and {max} words in total.
{language}
**Specific Requirements:** "{requirements}"

**Tone:** Professional and humanized. The writing should sound natural, confident, and intelligent, avoiding robotic phrasing and cliches.

**Instructions:**
1. **Introduction:** Open with a compelling introduction that grabs the reader's attention.
2. **Body:** Write several body sections that logically develop the main arguments. Give each body section its own short, descriptive heading.
3. **Conclusion:** Close with a powerful conclusion that summarizes the key points and offers a final thought.
4. **Language and Complexity:** Tailor the vocabulary, sentence structure, and depth of analysis to the specified academic level.
5. **Formatting:** Return the essay only as the requested list of paragraphs, each with a "heading" and a "content" field. Do not include an overall essay title and do not write any text outside the paragraph structure."#,
        topic = request.topic(),
        level = request.level().label(),
        min = word_budget.min,
        max = word_budget.max,
        language = language_instruction,
        requirements = requirements,
    );

    BuiltPrompt {
        text,
        word_budget,
        output_token_budget: word_budget.output_token_budget(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EssayForm, EssayLevel, LengthClass, TargetLanguage};
    use std::num::NonZeroU32;

    fn custom(n: u32) -> EssayLength {
        EssayLength::Custom {
            word_count: NonZeroU32::new(n).unwrap(),
        }
    }

    fn request(form: EssayForm) -> GenerationRequest {
        form.validate().unwrap()
    }

    fn base_form() -> EssayForm {
        EssayForm {
            topic: "The ethics of gene editing".to_string(),
            level: EssayLevel::University,
            ..EssayForm::default()
        }
    }

    #[test]
    fn fixed_lengths_use_table_bounds() {
        assert_eq!(
            WordBudget::for_length(EssayLength::Short),
            WordBudget { min: 250, max: 350 }
        );
        assert_eq!(
            WordBudget::for_length(EssayLength::Medium),
            WordBudget { min: 550, max: 650 }
        );
        assert_eq!(
            WordBudget::for_length(EssayLength::Long),
            WordBudget { min: 900, max: 1100 }
        );
    }

    #[test]
    fn custom_length_is_centered_with_floor() {
        assert_eq!(WordBudget::for_length(custom(750)), WordBudget { min: 700, max: 800 });
        assert_eq!(WordBudget::for_length(custom(60)), WordBudget { min: 50, max: 110 });
        assert_eq!(WordBudget::for_length(custom(1)), WordBudget { min: 50, max: 51 });
    }

    #[test]
    fn token_budget_doubles_max_words() {
        let prompt = build_prompt(&request(base_form()));
        assert_eq!(prompt.output_token_budget, 1300);
        assert_eq!(WordBudget { min: 0, max: u32::MAX }.output_token_budget(), u32::MAX);
    }

    #[test]
    fn prompt_embeds_request_details() {
        let prompt = build_prompt(&request(EssayForm {
            length: Some(LengthClass::Custom),
            custom_word_count: Some("750".to_string()),
            requirements: "Discuss CRISPR specifically.".to_string(),
            ..base_form()
        }));

        assert!(prompt.text.contains("\"The ethics of gene editing\""));
        assert!(prompt.text.contains("\"University\""));
        assert!(prompt.text.contains("between 700 and 800 words"));
        assert!(prompt.text.contains("Discuss CRISPR specifically."));
        assert!(!prompt.text.contains(REQUIREMENTS_PLACEHOLDER));
        assert!(prompt.text.contains("introduction"));
        assert!(prompt.text.contains("conclusion"));
        assert!(prompt.text.contains("own short, descriptive heading"));
        assert!(prompt.text.contains("Do not include an overall essay title"));
    }

    #[test]
    fn blank_requirements_use_placeholder() {
        let prompt = build_prompt(&request(EssayForm {
            requirements: "   ".to_string(),
            ..base_form()
        }));
        assert!(prompt.text.contains(REQUIREMENTS_PLACEHOLDER));
    }

    #[test]
    fn language_instruction_only_for_non_default_language() {
        let english = build_prompt(&request(base_form()));
        assert!(!english.text.contains("Write entirely in"));

        let spanish = build_prompt(&request(EssayForm {
            target_language: TargetLanguage::Spanish,
            ..base_form()
        }));
        assert!(spanish.text.contains("Write entirely in Spanish."));
    }

    #[test]
    fn building_is_deterministic() {
        let req = request(base_form());
        assert_eq!(build_prompt(&req), build_prompt(&req));
    }
}
