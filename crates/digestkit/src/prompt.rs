//! Prompt rendering

use crate::types::{Document, RenderedPrompt};

/// Placeholder replaced with the document text
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Instruction asking for a bounded-length summary
pub const DEFAULT_TEMPLATE: &str =
    "Provide a summary of the following content in 300 words:\nContent: {text}\n";

/// Instruction template with a `{text}` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Create a template; it must contain the `{text}` placeholder
    pub fn new(template: impl Into<String>) -> Result<Self, String> {
        let template = template.into();
        if !template.contains(TEXT_PLACEHOLDER) {
            return Err(format!(
                "Invalid prompt template: must contain the {} placeholder",
                TEXT_PLACEHOLDER
            ));
        }
        Ok(Self { template })
    }

    /// The raw template text
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute the document text into the template
    ///
    /// Only the text is rendered; metadata stays out of the prompt.
    pub fn render(&self, document: &Document) -> RenderedPrompt {
        RenderedPrompt::new(self.template.replace(TEXT_PLACEHOLDER, &document.text))
    }
}

/// Render a document with the default template
pub fn build(document: &Document) -> RenderedPrompt {
    PromptTemplate::default().render(document)
}
