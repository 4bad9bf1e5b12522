pub const SYSTEM_PERSONA: &str =
    "You are a professional assistant skilled in software development.";

pub const PR_DESCRIPTION_INSTRUCTION: &str =
    "Generate a detailed pull request description based on the following changes:";
