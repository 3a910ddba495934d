use crate::common::errors::RevisionError;
use crate::series::observation::Observation;
use crate::series::series::Series;

/// Point-wise original-minus-corrected audit series.
///
/// A positive value means the point was revised downward; the latest entry
/// equals the pass's `last_point_delta` for that series.
pub fn diff_series(original: &Series, corrected: &Series) -> Result<Series, RevisionError> {
    if original.key != corrected.key {
        return Err(RevisionError::ShapeMismatch(format!(
            "keys differ: {} vs {}",
            original.key, corrected.key
        )));
    }
    if original.len() != corrected.len() {
        return Err(RevisionError::ShapeMismatch(format!(
            "lengths differ for {}: {} vs {}",
            original.key,
            original.len(),
            corrected.len()
        )));
    }

    let mut lst = Vec::with_capacity(original.len());
    for (o, c) in original.lst.iter().zip(corrected.lst.iter()) {
        if o.date != c.date {
            return Err(RevisionError::ShapeMismatch(format!(
                "dates differ for {}: {} vs {}",
                original.key, o.date, c.date
            )));
        }
        lst.push(Observation::new(o.date, o.value - c.value));
    }
    Ok(Series {
        key: original.key.clone(),
        lst,
    })
}
