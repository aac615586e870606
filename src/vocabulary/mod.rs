//! Saved words and their review schedule
//!
//! [`scheduler`] holds the pure SM-2 rules; [`VocabularyService`] loads an
//! item through a [`VocabularyRepository`], grades it and writes it back.
//!
//! # Example
//!
//! ```ignore
//! use xenolexia::vocabulary::{InMemoryVocabulary, VocabularyService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = VocabularyService::new(InMemoryVocabulary::new());
//!     for item in service.due_for_review(20).await? {
//!         service.record_review(&item.id, 4).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod file;
pub mod memory;
pub mod repository;
pub mod scheduler;
pub mod service;

pub use file::JsonFileVocabulary;
pub use memory::InMemoryVocabulary;
pub use repository::VocabularyRepository;
pub use scheduler::{Quality, due_queue, grade_review, is_due, next_review_at};
pub use service::{VocabularyService, VocabularyStats};
