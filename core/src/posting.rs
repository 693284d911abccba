use crate::list::TailList;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

pub const POST_DOC_WIDTH: usize = 4;
pub const POST_WEIGHT_WIDTH: usize = 10;
pub const POST_WEIGHT_PRECISION: usize = 3;

/// One document's occurrence of a term: the document id and its normalized term
/// frequency. Ordered by document id, then frequency.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Posting {
    doc_id: DocId,
    rtf: f32,
}

pub type PostingList = TailList<Posting>;

impl Default for Posting {
    /// An unset posting, marked with -1 sentinels.
    fn default() -> Self {
        Self { doc_id: -1, rtf: -1.0 }
    }
}

impl Posting {
    pub fn new(doc_id: DocId, rtf: f32) -> Self {
        Self { doc_id, rtf }
    }

    pub fn doc_id(&self) -> DocId {
        self.doc_id
    }

    pub fn rtf(&self) -> f32 {
        self.rtf
    }

    pub fn is_set(&self) -> bool {
        self.doc_id >= 0
    }

    /// Write one fixed-width postings row, with the frequency multiplied by `scale` when given.
    pub fn write_to<W: Write>(&self, out: &mut W, scale: Option<f32>) -> io::Result<()> {
        let value = scale.map_or(self.rtf, |s| self.rtf * s);
        writeln!(
            out,
            "{:>dw$} {:>ww$.p$}",
            self.doc_id,
            value,
            dw = POST_DOC_WIDTH,
            ww = POST_WEIGHT_WIDTH,
            p = POST_WEIGHT_PRECISION
        )
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>dw$} {:>ww$.p$}",
            self.doc_id,
            self.rtf,
            dw = POST_DOC_WIDTH,
            ww = POST_WEIGHT_WIDTH,
            p = POST_WEIGHT_PRECISION
        )
    }
}
