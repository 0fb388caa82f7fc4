pub mod analyzer;
pub mod db;
pub mod memory;

pub use analyzer::StubDocumentAnalyzer;
pub use db::DbAdapter;
pub use memory::InMemoryDb;
