pub mod error;
pub mod global;
pub mod hash;
pub mod list;
pub mod local;
pub mod merge;
pub mod persist;
pub mod posting;
pub mod table;
pub mod tokenizer;

pub use error::{IndexError, Result};
pub use global::{GlobalTable, TermEntry};
pub use list::TailList;
pub use local::LocalTable;
pub use merge::{transfer, TransferStats, LOW_FREQ_THRESHOLD};
pub use posting::{Posting, PostingList};
pub use table::Usage;

/// Document identifier as written to the postings file. `-1` marks an unset posting.
pub type DocId = i32;
