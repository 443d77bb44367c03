//! Confirmation gate for destructive operations.

/// What a destructive operation is about to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// One-line summary.
    pub title: String,
    /// Affected items (files, commits).
    pub items: Vec<String>,
}

impl Preview {
    /// Create a preview.
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

/// Something that can show a preview and ask a yes/no question.
///
/// Implementations must treat an empty answer as "no".
pub trait Confirm {
    /// Show the preview to the operator.
    fn render(&self, preview: &Preview);

    /// Ask `prompt` and return the operator's answer.
    fn ask(&self, prompt: &str) -> bool;
}

/// Render `preview`, then ask `prompt`.
///
/// Only an explicit affirmative answer lets the guarded operation proceed.
pub fn confirm<C: Confirm + ?Sized>(gate: &C, preview: &Preview, prompt: &str) -> bool {
    gate.render(preview);
    let accepted = gate.ask(prompt);
    if accepted {
        tracing::info!(title = %preview.title, "confirmed");
    } else {
        tracing::info!(title = %preview.title, "declined");
    }
    accepted
}

/// Parse a typed yes/no answer. Anything but an explicit yes is a no.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
