//! Prompt construction for batch analysis and chat

use crate::types::{BatchEntry, EntryContent};
use docket_domain::DocumentAnalysis;

/// Builds the composite prompt for one analysis batch
pub struct PromptBuilder<'a> {
    entries: &'a [BatchEntry],
    instructions: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder over the batch entries
    pub fn new(entries: &'a [BatchEntry]) -> Self {
        Self {
            entries,
            instructions: None,
        }
    }

    /// Add the user's free-text instructions
    pub fn with_instructions(mut self, instructions: Option<&'a str>) -> Self {
        self.instructions = instructions.filter(|s| !s.trim().is_empty());
        self
    }

    /// Build the complete analysis prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(PERSONA);

        if let Some(instructions) = self.instructions {
            prompt.push_str(&format!(
                "\n\nUSER'S SPECIFIC INSTRUCTIONS: {instructions}\n\
                 Pay special attention to these instructions while analyzing the documents. \
                 Tailor your extraction and suggested actions to address what the user is asking for.\n"
            ));
        }

        prompt.push_str("\n\n");
        if self.entries.len() == 1 {
            prompt.push_str("Analyze the following legal document and extract:\n");
        } else {
            prompt.push_str(&format!(
                "Analyze the following {} legal documents together, cross-referencing facts \
                 between them, and extract:\n",
                self.entries.len()
            ));
        }
        prompt.push_str(EXTRACTION_TASK);
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_SHAPE);
        prompt.push_str("\n\n");

        for entry in self.entries {
            match &entry.content {
                EntryContent::Text(text) => {
                    prompt.push_str(&format!("Document: {}\n---\n{}\n---\n\n", entry.file_name, text));
                }
                EntryContent::Native(_) => {
                    prompt.push_str(&format!(
                        "Document: {} (provided as an attached file)\n\n",
                        entry.file_name
                    ));
                }
            }
        }

        prompt.push_str("Provide only the JSON response, no other text.");
        prompt
    }
}

/// Prompt for the follow-up conversational summary
///
/// Issued only when the user supplied instructions; restates what the
/// analysis found in a way that answers them directly.
pub fn summary_prompt(analysis: &DocumentAnalysis, instructions: &str) -> String {
    let parties = if analysis.parties.is_empty() {
        "Not found".to_string()
    } else {
        analysis.parties.join(", ")
    };
    let deadlines = if analysis.deadlines.is_empty() {
        "Not found".to_string()
    } else {
        analysis
            .deadlines
            .iter()
            .map(|d| format!("{} ({})", d.description, d.date))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let key_facts = if analysis.key_facts.is_empty() {
        "Not found".to_string()
    } else {
        analysis
            .key_facts
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join("; ")
    };

    format!(
        "{PERSONA} A user just uploaded documents and asked you to: \"{instructions}\"\n\n\
         Based on the analysis you performed, here's what you found:\n\
         - Case Number: {case_number}\n\
         - Parties: {parties}\n\
         - Deadlines: {deadlines}\n\
         - Key Facts: {key_facts}\n\n\
         Provide a helpful, conversational response that directly answers the user's request. \
         Be specific and reference the information you found. If you found the information they \
         asked for, present it clearly. If not, explain what you did find. Keep it concise and \
         professional.",
        case_number = analysis.case_number.as_deref().unwrap_or("Not found"),
    )
}

/// Prompt for a plain conversational exchange (no upload involved)
pub fn chat_prompt(message: &str, context: Option<&str>) -> String {
    let context_section = match context {
        Some(context) => format!("Context from recent analysis:\n{context}\n\n"),
        None => String::new(),
    };

    format!(
        "{PERSONA} You help analyze case documents, extract key information, and suggest \
         actionable next steps.\n\n\
         {context_section}User message: {message}\n\n\
         Respond helpfully and professionally. If the user asks about document analysis, \
         encourage them to upload documents. Keep responses concise and actionable."
    )
}

const PERSONA: &str =
    "You are Docket, an AI legal assistant helping plaintiff legal teams process case documents.";

const EXTRACTION_TASK: &str = r#"
1. Case Number (if mentioned)
2. Parties Involved (plaintiff, defendant, counsel, witnesses)
3. Critical Deadlines (dates with descriptions and priority: high/medium/low)
4. Key Facts (important facts, evidence, or testimony)
5. Suggested Actions (specific next steps the legal team should take)

For each suggested action, provide:
- A clear title
- Detailed description
- Rationale explaining why this action is important
- Priority level (high/medium/low)"#;

const OUTPUT_SHAPE: &str = r#"Return your analysis in valid JSON format with this structure:
{
  "caseNumber": "string or null",
  "parties": ["string array"],
  "deadlines": [{"date": "string", "description": "string", "priority": "high|medium|low"}],
  "keyFacts": ["string array"],
  "confidence": 0.0-1.0,
  "suggestedActions": [{
    "title": "string",
    "description": "string",
    "rationale": "string",
    "priority": "high|medium|low"
  }]
}"#;
