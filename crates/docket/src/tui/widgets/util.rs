use std::borrow::Cow;

use docket_core::Task;
use unicode_segmentation::UnicodeSegmentation;

pub(super) fn truncate_with_ellipsis(input: &str, max_graphemes: usize) -> Cow<'_, str> {
    const ELLIPSIS: &str = "…";

    if max_graphemes == 0 {
        return Cow::Owned(String::new());
    }

    let mut graphemes = input.graphemes(true);
    if graphemes.clone().nth(max_graphemes).is_none() {
        return Cow::Borrowed(input);
    }

    let mut truncated: String = graphemes.by_ref().take(max_graphemes - 1).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

/// Leading check box for a row.
pub(super) const fn completion_marker(task: &Task) -> &'static str {
    if task.completed { "[x] " } else { "[ ] " }
}

pub(super) const fn importance_marker(task: &Task) -> &'static str {
    if task.important { " ★" } else { "" }
}
