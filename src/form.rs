//! the form controller: one input, one output, one busy flag.

use bevy::prelude::*;

use crate::completion::CompletionError;
use crate::template::smart_prompt;

/// shown in place of the output whenever a completion fails, whatever the cause.
pub const FAILURE_MESSAGE: &str = "An error occurred while improving the prompt. Please try again.";

pub const SUBMIT_LABEL_IDLE: &str = "Improve Prompt";
pub const SUBMIT_LABEL_BUSY: &str = "Improving...";

/// attach to an entity to give it prompt-improver form state.
///
/// `busy` is true strictly while one completion is in flight; `output` is
/// overwritten wholesale each time a completion settles.
#[derive(Component, Clone, Debug, Default)]
pub struct PromptForm {
    input_text: String,
    output_text: String,
    busy: bool,
}

impl PromptForm {
    pub fn input(&self) -> &str {
        &self.input_text
    }

    pub fn output(&self) -> &str {
        &self.output_text
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// replace the input; never validated, never touches output or busy.
    pub fn update_input(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
    }

    /// mutable access for keystroke-level editing in views.
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input_text
    }

    pub fn can_submit(&self) -> bool {
        !self.busy && !self.input_text.trim().is_empty()
    }

    /// idle -> in-flight. returns the prompt to send, or `None` (no-op) when
    /// busy or the trimmed input is empty.
    pub fn begin_submit(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        self.busy = true;
        Some(smart_prompt(&self.input_text))
    }

    /// in-flight -> idle. success stores the trimmed text; failure logs the
    /// cause and stores `FAILURE_MESSAGE`. busy is cleared last on both paths.
    pub fn settle(&mut self, result: Result<String, CompletionError>) {
        match result {
            Ok(text) => self.output_text = text.trim().to_string(),
            Err(err) => {
                error!(target: "bevy_prompt_improver", "Error improving prompt: {}", err);
                self.output_text = FAILURE_MESSAGE.to_string();
            }
        }
        self.busy = false;
    }

    pub fn submit_label(&self) -> &'static str {
        if self.busy { SUBMIT_LABEL_BUSY } else { SUBMIT_LABEL_IDLE }
    }

    pub fn submit_enabled(&self) -> bool {
        self.can_submit()
    }

    pub fn output_visible(&self) -> bool {
        !self.output_text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::SMART_CRITERIA;
    use pretty_assertions::assert_eq;

    fn form(input: &str) -> PromptForm {
        let mut f = PromptForm::default();
        f.update_input(input);
        f
    }

    #[test]
    fn starts_idle_and_hidden() {
        let f = PromptForm::default();
        assert!(!f.is_busy());
        assert!(!f.output_visible());
        assert!(!f.submit_enabled());
        assert_eq!(f.submit_label(), "Improve Prompt");
    }

    #[test]
    fn blank_input_is_a_noop() {
        for input in ["", "   ", "\n\t "] {
            let mut f = form(input);
            assert_eq!(f.begin_submit(), None);
            assert!(!f.is_busy());
            assert_eq!(f.output(), "");
        }
    }

    #[test]
    fn blank_submit_keeps_previous_output() {
        let mut f = form("x");
        f.begin_submit();
        f.settle(Ok("kept".into()));
        f.update_input("  ");
        assert_eq!(f.begin_submit(), None);
        assert_eq!(f.output(), "kept");
    }

    #[test]
    fn begin_sets_busy_and_embeds_input() {
        let input = "summarize {input} ${x}";
        let mut f = form(input);
        let prompt = f.begin_submit().expect("submittable");
        assert!(f.is_busy());
        assert_eq!(f.submit_label(), "Improving...");
        assert!(prompt.contains(input));
        for (label, _) in SMART_CRITERIA {
            assert!(prompt.contains(label));
        }
    }

    #[test]
    fn second_submit_while_busy_is_rejected() {
        let mut f = form("refactor the parser");
        assert!(f.begin_submit().is_some());
        assert!(!f.submit_enabled());
        assert_eq!(f.begin_submit(), None);
        assert!(f.is_busy());
    }

    #[test]
    fn success_trims_and_clears_busy() {
        let mut f = form("p");
        f.begin_submit();
        f.settle(Ok("  Rewritten prompt.  ".into()));
        assert_eq!(f.output(), "Rewritten prompt.");
        assert!(!f.is_busy());
        assert!(f.output_visible());
        assert!(f.submit_enabled());
    }

    #[test]
    fn failure_shows_fixed_message_and_clears_busy() {
        let mut f = form("p");
        f.begin_submit();
        f.settle(Err(CompletionError::MissingText));
        assert_eq!(f.output(), FAILURE_MESSAGE);
        assert_eq!(f.output(), "An error occurred while improving the prompt. Please try again.");
        assert!(!f.is_busy());
    }

    #[test]
    fn output_is_overwritten_not_appended() {
        let mut f = form("p");
        f.begin_submit();
        f.settle(Ok("first".into()));
        f.begin_submit();
        f.settle(Ok("second".into()));
        assert_eq!(f.output(), "second");
    }

    #[test]
    fn editing_input_never_changes_output() {
        let mut f = form("p");
        f.begin_submit();
        f.settle(Ok("result".into()));
        f.update_input("something else");
        f.input_mut().push_str(" more");
        f.update_input("");
        assert_eq!(f.output(), "result");
        assert!(f.output_visible());
    }

    #[test]
    fn whitespace_only_success_hides_output() {
        let mut f = form("p");
        f.begin_submit();
        f.settle(Ok("   ".into()));
        assert!(!f.output_visible());
    }
}
