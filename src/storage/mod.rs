mod documents;

pub use documents::{SnapshotStore, document_name};
