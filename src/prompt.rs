//! Prompt preparation for hosts.

/// Sent when the user submits nothing.
pub const DEFAULT_PROMPT: &str = "Where can I get help with senior housing assistance?";

/// Trim user input and fall back to [`DEFAULT_PROMPT`] when nothing is left.
pub fn resolve_prompt(input: &str) -> &str {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        DEFAULT_PROMPT
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_input() {
        assert_eq!(resolve_prompt("  where is the clinic?\n"), "where is the clinic?");
    }

    #[test]
    fn blank_input_uses_default() {
        assert_eq!(resolve_prompt(""), DEFAULT_PROMPT);
        assert_eq!(resolve_prompt(" \t\n"), DEFAULT_PROMPT);
    }
}
