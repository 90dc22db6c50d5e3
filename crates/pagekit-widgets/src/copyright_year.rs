#![forbid(unsafe_code)]

//! Footer copyright year.

use pagekit_core::{Dom, NodeId, PageError};

pub const YEAR_SELECTOR: &str = "#currentYear";

/// Write `year` into `#currentYear`.
pub fn stamp_current_year(dom: &mut dyn Dom, year: i32) -> Result<NodeId, PageError> {
    let node = dom
        .query(YEAR_SELECTOR)
        .ok_or_else(|| PageError::missing("copyright-year", YEAR_SELECTOR))?;
    dom.set_text(node, &year.to_string());
    Ok(node)
}
