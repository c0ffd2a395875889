//! Glava - shared HTML translation pipeline for web novel source plugins.
//!
//! De-duplicates the chunking/translation subsystem that was previously
//! copy-pasted into every site plugin of a novel-reading app:
//! - Splitting scraped HTML into structurally tagged text units
//!   ([`segment::segment`]) or size-bounded chunks ([`segment::make_chunks`])
//! - Translating them through a remote service, batched or one chunk at a
//!   time ([`translate::Translator`])
//! - Reassembling line-aligned translated output into HTML
//!   ([`rebuild::rebuild`])
//! - Resolving scraped URLs against a site base ([`utils::make_absolute`])
//!
//! Translation calls never fail: remote errors are rendered into the
//! returned text so chapter retrieval is unaffected by translation
//! outages.

pub mod config;
pub mod console;
pub mod error;
pub mod rebuild;
pub mod segment;
pub mod translate;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, EndpointConfig, TranslationConfig};
pub use error::{ConfigError, TranslationFailure};
pub use rebuild::{rebuild, zip_with_default};
pub use segment::{TextUnit, UnitTag, make_chunks, segment};
pub use translate::{SEPARATOR, Translator};
pub use utils::make_absolute;
