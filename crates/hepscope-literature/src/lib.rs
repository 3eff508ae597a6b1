//! hepscope-literature: Paper metadata and documents.
//! Covers:
//! - INSPIRE literature search and lookup
//! - Conversion of INSPIRE records to `Paper`
//! - Author / collaboration formatting and INSPIRE links
//! - Citation resolution (RAG citation map → formatted citations)
//! - Single-flight PDF download cache

pub mod sources;
pub mod authors;
pub mod models;
pub mod pdf_cache;
pub mod resolver;

pub use models::{Citation, FormattedCitation, Paper};
pub use pdf_cache::{HttpPdfFetcher, PdfBlob, PdfCache, PdfFetcher};
pub use resolver::CitationResolver;
