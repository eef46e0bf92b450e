const PROMPT_SYSTEM: &str = include_str!("prompt_templates/system.txt");

pub struct SystemPrompt;

impl SystemPrompt {
    /// The persona sent as the `system` field of every request. Mentions the
    /// `<insert-code>` and `<create-file path="...">` directives.
    pub fn persona() -> &'static str {
        PROMPT_SYSTEM.trim()
    }
}
