pub mod ai;
pub mod document;

pub use ai::{available_providers, AiParser, AiProvider, AiSettings, ProviderInfo};
pub use document::{DocumentParser, FormatAnalysis, SectionKind};
