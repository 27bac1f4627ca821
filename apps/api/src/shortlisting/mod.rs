// Two-phase shortlisting.
// Phase 1 is a pure keyword/experience ranking; Phase 2 asks the LLM about
// each survivor in turn. All LLM calls go through llm_client.

pub mod phase1;
pub mod phase2;
pub mod pipeline;
pub mod prompts;
