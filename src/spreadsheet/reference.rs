//! Conversions between A1-style cell references and 0-based indexes.

/// Converts column letters (e.g. "A", "AB") to a 0-based column index.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .map(|letter| (letter - b'A') as usize + 1)
        .reduce(|index, digit| index * 26 + digit)
        .map(|column| column - 1)
}

/// Converts a 1-based row number string to a 0-based row index.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Parses a cell reference such as "C12" into 0-based (row, col).
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let col = col_to_index(letters)?;
    let row = row_to_index(digits)?;
    Some((row, col))
}

/// Converts 0-based (row, col) into an A1-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut column = col + 1;
    let mut letters = Vec::<u8>::new();
    while column > 0 {
        column -= 1;
        letters.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    letters.reverse();
    format!("{}{}", String::from_utf8_lossy(&letters), row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_references() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("C12"), Some((11, 2)));
        assert_eq!(reference_to_index("AA3"), Some((2, 26)));
        assert_eq!(reference_to_index("$B$2"), None);
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("A"), None);
    }

    #[test]
    fn format_references() {
        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(11, 2), "C12");
        assert_eq!(index_to_reference(0, 25), "Z1");
        assert_eq!(index_to_reference(0, 26), "AA1");
        assert_eq!(index_to_reference(4, 701), "ZZ5");
        assert_eq!(index_to_reference(4, 702), "AAA5");
    }
}
