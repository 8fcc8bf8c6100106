//! `data-index` bookkeeping for the personnel rows
//!
//! Each row's input carries the index of its entry in the form's personnel
//! list. Removing a row shifts the entries after it, so the attributes are
//! rewritten to match positions again.

pub const INDEX_ATTRIBUTE: &str = "data-index";

/// Entry index stored on a row, if the attribute is present and numeric
pub fn parse_index(attribute: Option<&str>) -> Option<usize> {
    attribute?.trim().parse().ok()
}

/// `(position, new attribute)` for every row whose index no longer matches
/// its position
pub fn reindex<S: AsRef<str>>(current: &[Option<S>]) -> Vec<(usize, String)> {
    let mut updates = Vec::new();
    for (position, attribute) in current.iter().enumerate() {
        let index = parse_index(attribute.as_ref().map(|a| AsRef::<str>::as_ref(a)));
        if index != Some(position) {
            updates.push((position, position.to_string()));
        }
    }
    updates
}
