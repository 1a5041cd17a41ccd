use crate::parser::RESOURCE_ANNOTATIONS;

/// Calculate Levenshtein distance between two strings
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let mut matrix = vec![vec![0; b.len() + 1]; a.len() + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for (i, c1) in a.iter().enumerate() {
        for (j, c2) in b.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            matrix[i + 1][j + 1] = (matrix[i][j + 1] + 1)
                .min(matrix[i + 1][j] + 1)
                .min(matrix[i][j] + cost);
        }
    }

    matrix[a.len()][b.len()]
}

/// Find the resource annotation an unknown name was most likely meant to be
pub fn find_closest_annotation(input: &str) -> Option<&'static str> {
    let input_lower = input.to_lowercase();
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for &annotation in RESOURCE_ANNOTATIONS {
        let distance = levenshtein_distance(&input_lower, annotation);
        // Only suggest if distance is small (≤ 2 characters different)
        if distance < best_distance && distance <= 2 {
            best_distance = distance;
            best_match = Some(annotation);
        }
    }

    best_match
}
