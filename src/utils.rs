use crate::tags::{RESOURCE, RESOURCE_COLLECTION, RESOURCE_MODEL, RESOURCE_STATE};

/// Calculate Levenshtein distance between two strings
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, c1) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, c2) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = (above + 1)
                .min(row[j] + 1)
                .min(diagonal + usize::from(c1 != c2));
            diagonal = above;
        }
    }

    row[b.len()]
}

/// The resource annotation a near-miss name was most likely meant to be.
///
/// Exact matches return `None`; so do names more than two edits away.
pub fn suggest_annotation(name: &str) -> Option<&'static str> {
    const ANNOTATIONS: &[&str] = &[RESOURCE, RESOURCE_COLLECTION, RESOURCE_MODEL, RESOURCE_STATE];

    let lower = name.to_lowercase();
    if ANNOTATIONS.contains(&lower.as_str()) {
        return None;
    }

    ANNOTATIONS
        .iter()
        .map(|&annotation| (levenshtein_distance(&lower, annotation), annotation))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, annotation)| annotation)
}
