//! Single-writer calculator session and its event stream.

/// Event payloads and observers.
pub mod events;
/// Session facade wiring engine, history, caretaker and persistence.
pub mod session;
