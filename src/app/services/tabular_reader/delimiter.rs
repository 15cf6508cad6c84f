//! Delimiter sniffing for uploaded files

use crate::constants::{DELIMITER_CANDIDATES, DELIMITER_SAMPLE_LINES};

/// Pick the most plausible delimiter from the first lines of `text`
///
/// Candidates are scored by how often they appear per line, penalized by how
/// much that count varies between lines. Quoted sections are ignored so a
/// comma inside `"Doe, Jane"` does not count. Falls back to comma.
pub fn sniff_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(DELIMITER_SAMPLE_LINES)
        .collect();

    if sample.is_empty() {
        return b',';
    }

    let mut best_delimiter = b',';
    let mut best_score = 0.0f64;

    for &candidate in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| count_unquoted(line, candidate))
            .collect();

        let avg = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        if avg == 0.0 {
            continue;
        }

        let variance = counts
            .iter()
            .map(|&count| (count as f64 - avg).powi(2))
            .sum::<f64>()
            / counts.len() as f64;

        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best_delimiter = candidate;
        }
    }

    best_delimiter
}

fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}
