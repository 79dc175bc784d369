//! Call record and transcript store shared with the call-handling layer.

mod types;

pub use types::{CallLanguage, CallRecord, Message, Persona, PlayContext, Style};
