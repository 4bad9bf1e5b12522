use crate::llm::prompts;

pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// The change log is interpolated verbatim: no truncation, no chunking.
pub fn pr_description_prompt(change_log: &str) -> PromptPair {
    let user = format!(
        "{instruction}\n\n{change_log}",
        instruction = prompts::PR_DESCRIPTION_INSTRUCTION,
        change_log = change_log
    );

    PromptPair {
        system: prompts::SYSTEM_PERSONA.to_owned(),
        user,
    }
}
