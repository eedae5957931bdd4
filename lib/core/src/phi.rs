//! PHI heuristics for raw attribute values.
//!
//! Imaging metadata routinely leaks person names (DICOM PN components joined
//! by `^`) and long numeric identifiers (accession numbers, patient IDs,
//! dates used as IDs). Anything matching either pattern is rejected before it
//! can reach the index. The filter is deliberately conservative: legitimate
//! clinical vocabulary containing a long digit run is rejected too, and that
//! trade-off is accepted.

/// Returns true when the text must be treated as PHI and dropped.
///
/// Rules, any match rejects:
/// 1. contains a caret (`^`), the DICOM person-name component separator;
/// 2. contains a contiguous run of 6 or more decimal digits.
#[must_use]
pub fn is_phi(text: &str) -> bool {
    if text.contains('^') {
        return true;
    }

    let mut run = 0usize;
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            run += 1;
            if run >= 6 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
