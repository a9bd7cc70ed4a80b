use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid index '{0}' in selection. Expected a non-negative integer.")]
    InvalidIndex(String),

    #[error("Invalid range '{0}' in selection. Expected 'start-end' with start <= end.")]
    InvalidRange(String),

    #[error("Selection contains no indices.")]
    Empty,
}

/// Parses a comma-separated selection of indices and inclusive ranges.
///
/// `1,3-5` yields `[1, 3, 4, 5]`; order and repetitions are preserved so the
/// caller controls the column layout of whatever it selects into.
pub fn parse_selection(text: &str) -> Result<Vec<usize>, SelectionError> {
    let mut indices = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some((start, end)) => {
                let start: usize = start
                    .trim()
                    .parse()
                    .map_err(|_| SelectionError::InvalidRange(part.to_string()))?;
                let end: usize = end
                    .trim()
                    .parse()
                    .map_err(|_| SelectionError::InvalidRange(part.to_string()))?;
                if start > end {
                    return Err(SelectionError::InvalidRange(part.to_string()));
                }
                indices.extend(start..=end);
            }
            None => {
                let index: usize = part
                    .parse()
                    .map_err(|_| SelectionError::InvalidIndex(part.to_string()))?;
                indices.push(index);
            }
        }
    }
    if indices.is_empty() {
        return Err(SelectionError::Empty);
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_indices_and_ranges_mix() {
        assert_eq!(parse_selection("2").unwrap(), vec![2]);
        assert_eq!(parse_selection("1,3-5").unwrap(), vec![1, 3, 4, 5]);
        assert_eq!(parse_selection("4-4,0").unwrap(), vec![4, 0]);
    }

    #[test]
    fn whitespace_and_dangling_commas_are_tolerated() {
        assert_eq!(parse_selection(" 1 , 2 - 3 ,").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn order_and_repetitions_are_preserved() {
        assert_eq!(parse_selection("3,1,3").unwrap(), vec![3, 1, 3]);
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert_eq!(
            parse_selection("5-3"),
            Err(SelectionError::InvalidRange("5-3".to_string()))
        );
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert_eq!(
            parse_selection("1,two"),
            Err(SelectionError::InvalidIndex("two".to_string()))
        );
        assert_eq!(
            parse_selection("1,a-b"),
            Err(SelectionError::InvalidRange("a-b".to_string()))
        );
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert_eq!(parse_selection(""), Err(SelectionError::Empty));
        assert_eq!(parse_selection(" , "), Err(SelectionError::Empty));
    }
}
