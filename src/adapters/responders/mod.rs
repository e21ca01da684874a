//! Responder adapters.
//!
//! - `PersonaResponder` - scripted persona answers driven by the run RNG
//! - `ModelResponder` - live model answers on topic questions

mod model_responder;
mod persona_responder;

pub use model_responder::ModelResponder;
pub use persona_responder::PersonaResponder;
