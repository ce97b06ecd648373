//! Contact Miner - contact extraction from staff directory pages
//!
//! Extracts person records (name, title, e-mail, remainder) from HTML
//! directory pages whose markup says nothing about what is a person and what
//! is contact information. Everything is inferred from DOM structure, text
//! and a caller-supplied [`Lexicon`](domain::Lexicon).
//!
//! ```no_run
//! use std::sync::Arc;
//! use contact_miner::application::ContactExtractionService;
//! use contact_miner::domain::{Lexicon, parse_word_list};
//! use contact_miner::infrastructure::ExtractionConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let lexicon = Lexicon::builder()
//!     .first_names(parse_word_list(&std::fs::read_to_string("first_names.txt")?))
//!     .last_names(parse_word_list(&std::fs::read_to_string("last_names.txt")?))
//!     .build()?;
//! let service = ContactExtractionService::new(Arc::new(lexicon), ExtractionConfig::default())?;
//! let report = service.extract_from_html(&std::fs::read_to_string("staff.html")?, "utf-8")?;
//! println!("{}", report.to_json()?);
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the entry points for easier access
pub use application::{ContactExtractionService, ExtractionReport};
pub use domain::{Lexicon, Record};
pub use infrastructure::{ExtractionConfig, ExtractionError, ExtractionResult};
