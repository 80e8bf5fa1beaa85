//! Fixed instruction and sampling parameters sent with every generation.

use shellbay_core::ProviderTurn;

/// Instruction sent as the first user turn of every request.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert full-stack web developer. Generate complete, production-ready React applications based on user requirements.

CRITICAL RULES:
1. Always output COMPLETE, WORKING code
2. Use React with TypeScript
3. Use Tailwind CSS for styling
4. Make it beautiful, modern, and responsive
5. Include all necessary imports
6. Generate a SINGLE FILE React component as a default export
7. Do NOT use external APIs unless explicitly requested
8. Add comments for complex logic
9. Make the UI stunning with gradients, shadows, and modern aesthetics

Output ONLY the code, no explanations before or after. Start with imports and end with the export.";

/// Sampling temperature.
pub const TEMPERATURE: f64 = 0.7;
/// Top-k sampling.
pub const TOP_K: u32 = 40;
/// Nucleus sampling.
pub const TOP_P: f64 = 0.95;
/// Output token cap.
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Full turn list for a request: instruction, history, then the new prompt.
#[must_use]
pub fn compose_turns(prompt: &str, history: &[ProviderTurn]) -> Vec<ProviderTurn> {
    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(ProviderTurn::user(SYSTEM_INSTRUCTION));
    turns.extend_from_slice(history);
    turns.push(ProviderTurn::user(prompt));
    turns
}
