//! Prompt composition. The single place the tutoring behavior contract
//! lives, so both generation backends receive identical instructions.

/// The behavioral contract appended to every prompt. Generation must lead
/// the student to the answer without ever stating it, and must admit when
/// the retrieved context is not enough.
pub const TUTOR_INSTRUCTIONS: &str = "\
Your task is to act as an educational tutor. Do NOT give the direct answer. Instead,
use analogies, everyday examples, or guiding questions to stimulate the student's
reasoning and help them reach the answer on their own. Adapt your language to the
student's level, be encouraging and patient, and invite reflection. If the context
above does not give you enough clues to help, say so explicitly instead of making
something up.";

/// Deterministically assemble the full prompt from its four fixed sections.
/// Pure: identical inputs produce byte-identical output.
pub fn build_tutor_prompt(question: &str, context: &str, history_text: &str) -> String {
    format!(
        "# Context from the course material\n{context}\n\n\
         # Conversation history\n{history_text}\n\n\
         # Student question\n{question}\n\n\
         {TUTOR_INSTRUCTIONS}\n"
    )
}
