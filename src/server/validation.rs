use crate::server::response::ApiError;

/// Parses a comma-separated id list from a query parameter. Empty segments
/// are dropped; a malformed segment rejects the whole parameter.
pub fn parse_id_list(param: &str, raw: &str) -> Result<Vec<i64>, ApiError> {
    let mut ids = Vec::new();
    for segment in raw.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let id: i64 = segment
            .parse()
            .map_err(|_| ApiError::bad_request(format!("invalid id in '{param}': {segment}")))?;
        ids.push(id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("subject", "1,2, 3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("subject", "").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_id_list("subject", "4,,5").unwrap(), vec![4, 5]);
        assert!(parse_id_list("subject", "1,x").is_err());
    }
}
