// Prompt constants for the summary service.
// Callers put their own directives inside the text; the budget lives here.

/// System prompt for every summary. Replace `{budget}` before sending.
pub const SUMMARY_SYSTEM_TEMPLATE: &str = "You are a precise professional writer. \
    Write plain prose only: no headings, no bullet points, no markdown. \
    Your answer MUST be {budget} long. \
    Do NOT include explanations, apologies or any preamble.";

/// User prompt template. Replace `{budget}` and `{text}` before sending.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Summarize the text below in {budget}.
Follow any instructions it contains about tone and focus.

TEXT:
{text}"#;
