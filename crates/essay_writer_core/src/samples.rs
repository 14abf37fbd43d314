//! crates/essay_writer_core/src/samples.rs
//!
//! Built-in sample essays a user can load into the form to see what the tool produces.

use crate::domain::{
    EssayForm, EssayLength, EssayLevel, EssayParagraph, GenerationRequest, TargetLanguage,
};
use serde::Serialize;

/// A read-only example request together with its essay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleEssay {
    #[serde(flatten)]
    pub request: GenerationRequest,
    pub essay_content: Vec<EssayParagraph>,
}

impl SampleEssay {
    /// Copies the sample into editable form state and a fresh essay.
    pub fn to_form(&self) -> (EssayForm, Vec<EssayParagraph>) {
        (self.request.to_form(), self.essay_content.clone())
    }
}

fn paragraph(heading: &str, content: &str) -> EssayParagraph {
    EssayParagraph {
        heading: heading.to_string(),
        content: content.to_string(),
    }
}

/// The sample catalogue, in display order.
pub fn sample_essays() -> Vec<SampleEssay> {
    vec![
        SampleEssay {
            request: GenerationRequest {
                topic: "The Role of Social Media in Modern Democracy".to_string(),
                level: EssayLevel::University,
                length: EssayLength::Short,
                target_language: TargetLanguage::English,
                requirements: "Discuss both benefits and risks.".to_string(),
            },
            essay_content: vec![
                paragraph(
                    "Introduction",
                    "Social media has become the public square of the twenty-first century. Platforms that began as tools for staying in touch with friends now shape how citizens learn about candidates, debate policy, and organize for change.",
                ),
                paragraph(
                    "A Wider Door to Participation",
                    "The most visible benefit is access. Movements that once needed printing presses and broadcast licenses can now reach millions from a phone, and elected officials are expected to answer questions in public, in real time.",
                ),
                paragraph(
                    "Echo Chambers and Misinformation",
                    "The same reach that empowers ordinary voices also rewards outrage. Recommendation systems tuned for engagement tend to narrow what users see, and false stories often travel faster than the corrections that follow them.",
                ),
                paragraph(
                    "Conclusion",
                    "Social media neither saves nor ruins democracy on its own. Its effect depends on the rules platforms adopt and on the habits citizens build, which makes media literacy as important as any regulation.",
                ),
            ],
        },
        SampleEssay {
            request: GenerationRequest {
                topic: "Why Bees Matter".to_string(),
                level: EssayLevel::MiddleSchool,
                length: EssayLength::Short,
                target_language: TargetLanguage::English,
                requirements: String::new(),
            },
            essay_content: vec![
                paragraph(
                    "Introduction",
                    "Bees are small, but the work they do is enormous. Without them, many of the fruits and vegetables we eat every day would be much harder to grow.",
                ),
                paragraph(
                    "Tiny Farmers",
                    "When a bee visits a flower to collect nectar, pollen sticks to its body and is carried to the next flower. This pollination is how apples, almonds, and blueberries form.",
                ),
                paragraph(
                    "Bees in Trouble",
                    "Pesticides, disease, and the loss of wild flowers have made life harder for bees. In some places, beekeepers lose a large share of their hives each winter.",
                ),
                paragraph(
                    "Conclusion",
                    "Planting flowers, avoiding harsh chemicals, and supporting local beekeepers are simple ways to help. Protecting bees means protecting our food.",
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_loadable_forms() {
        for sample in sample_essays() {
            let (form, essay) = sample.to_form();
            assert_eq!(form.validate().unwrap(), sample.request);
            assert!(essay.len() >= 3);
            assert!(essay.iter().all(|p| !p.heading.is_empty() && !p.content.is_empty()));
        }
    }
}
