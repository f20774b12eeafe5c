//! Ordering tracker used to validate tagged fragments during reassembly.
//!
//! `FragmentSeries` keeps only the declared total, the next expected index
//! and a completion flag, so it costs nothing to embed in the reassembler.

use super::{FragmentError, FragmentIndex, FragmentStatus, FrameHeader};

/// Track the expected ordering of tagged fragments for one payload.
#[derive(Clone, Debug)]
pub struct FragmentSeries {
    count: u32,
    next_index: FragmentIndex,
    complete: bool,
}

impl FragmentSeries {
    /// Create a series expecting `count` fragments, starting at index zero.
    #[must_use]
    pub const fn new(count: u32) -> Self {
        Self {
            count,
            next_index: FragmentIndex::zero(),
            complete: false,
        }
    }

    /// Return whether the series has consumed the final fragment.
    #[must_use]
    pub const fn is_complete(&self) -> bool { self.complete }

    /// Accept a fragment header and advance the expected index.
    ///
    /// # Examples
    ///
    /// ```
    /// use qrtransit::fragment::{FragmentIndex, FragmentSeries, FragmentStatus, FrameHeader};
    /// let mut series = FragmentSeries::new(2);
    /// let first = FrameHeader::for_body(FragmentIndex::zero(), 2, "ab");
    /// let last = FrameHeader::for_body(FragmentIndex::new(1), 2, "c");
    /// assert_eq!(series.accept(first), Ok(FragmentStatus::Incomplete));
    /// assert_eq!(series.accept(last), Ok(FragmentStatus::Complete));
    /// assert!(series.is_complete());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::CountMismatch`] when the header declares a
    /// different total, [`FragmentError::IndexMismatch`] when the header is
    /// not the next expected index, and [`FragmentError::SeriesComplete`]
    /// when the series already consumed its final fragment.
    pub fn accept(&mut self, header: FrameHeader) -> Result<FragmentStatus, FragmentError> {
        if self.complete {
            return Err(FragmentError::SeriesComplete);
        }

        if header.count() != self.count {
            return Err(FragmentError::CountMismatch {
                expected: self.count,
                found: header.count(),
            });
        }

        if header.index() != self.next_index {
            return Err(FragmentError::IndexMismatch {
                expected: self.next_index,
                found: header.index(),
            });
        }

        if header.is_last_fragment() {
            self.complete = true;
            return Ok(FragmentStatus::Complete);
        }

        // `index < count` holds for decoded headers, so this cannot overflow.
        if let Some(next) = header.index().checked_increment() {
            self.next_index = next;
        }
        Ok(FragmentStatus::Incomplete)
    }
}
