//! the SMART rewrite instruction sent to the completion service.

/// label + description for each criterion, in the order they are listed.
pub const SMART_CRITERIA: [(&str, &str); 5] = [
    ("Specific", "Clearly defined and unambiguous"),
    ("Measurable", "Include criteria for measuring progress and success"),
    ("Achievable", "Realistic and attainable"),
    ("Relevant", "Aligned with the overall objective"),
    ("Time-bound", "Include a deadline or timeframe"),
];

/// render the instruction with `original` embedded verbatim at its single
/// interpolation point. no escaping: braces or other template-looking text in
/// `original` pass through untouched.
pub fn smart_prompt(original: &str) -> String {
    let mut out = String::with_capacity(original.len() + 512);
    out.push_str(
        "Improve the following Copilot prompt to be more specific and align with SMART goals:\n\n",
    );
    out.push_str("Original prompt: ");
    out.push_str(original);
    out.push_str("\n\nPlease provide an improved version that is:\n");
    for (label, description) in SMART_CRITERIA {
        out.push_str("- ");
        out.push_str(label);
        out.push_str(": ");
        out.push_str(description);
        out.push('\n');
    }
    out.push_str("\nImproved prompt:");
    out
}
