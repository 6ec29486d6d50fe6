// WizCare - well-being chat assistant
// Library exports

// Core modules
pub mod crisis; // Lexicon, classifier, escalation, alert presentation
pub mod emotion;
pub mod engine;
pub mod errors;
pub mod session;

// Surfaces
pub mod cli;
pub mod client; // HTTP client for the reply backend
pub mod config;
pub mod metrics;
pub mod server; // HTTP API for chat front-ends
