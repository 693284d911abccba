use crate::global::GlobalTable;
use crate::local::LocalTable;
use crate::DocId;
use serde::Serialize;

/// Terms counted this many times or fewer in a document stay out of the index.
pub const LOW_FREQ_THRESHOLD: i32 = 3;

/// Outcome of moving one document's counts into the global table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransferStats {
    pub transferred: usize,
    pub below_threshold: usize,
    /// Postings lost because the global table was full.
    pub dropped: usize,
}

/// Move every term of `local` counted above [`LOW_FREQ_THRESHOLD`] into `global`,
/// tagged with `doc_id`.
///
/// The stored frequency is `count / local.len()`, the count divided by the number of
/// distinct terms in the document rather than its token count. Weights already written
/// by earlier builds use that denominator.
pub fn transfer(local: &LocalTable, doc_id: DocId, global: &mut GlobalTable) -> TransferStats {
    let mut stats = TransferStats::default();
    let distinct = local.len();
    if distinct == 0 {
        return stats;
    }
    for (term, count) in local.iter() {
        if count <= LOW_FREQ_THRESHOLD {
            stats.below_threshold += 1;
            continue;
        }
        let normalized = (count as f64 / distinct as f64) as f32;
        match global.insert(term, doc_id, normalized) {
            Ok(()) => stats.transferred += 1,
            Err(_) => stats.dropped += 1,
        }
    }
    tracing::debug!(
        doc_id,
        distinct,
        transferred = stats.transferred,
        below_threshold = stats.below_threshold,
        dropped = stats.dropped,
        "document transferred"
    );
    stats
}
