//! Utility functions for the Ergo MCP server

use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::mcp::protocol::{error_codes, Response};

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<T, Response> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}'", key),
        )
    })
}

/// Like [`get_required_arg`], but absent or `null` yields `Ok(None)`.
pub fn get_optional_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<Option<T>, Response> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => from_value(value.clone()).map(Some).map_err(|_| {
            Response::error(
                req_id.clone(),
                error_codes::INVALID_PARAMS,
                format!("Invalid argument: '{}'", key),
            )
        }),
    }
}

/// Box, transaction and token ids are 32-byte hex strings.
pub fn is_hex_id(value: &str) -> bool {
    value.len() == 64 && hex::decode(value).is_ok()
}

/// Cheap shape check for base58 Ergo addresses; the explorer does the real validation.
pub fn is_plausible_address(value: &str) -> bool {
    (30..=120).contains(&value.len())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_args() {
        let args = json!({"limit": 5, "format": null, "bad": "x"});
        let id = json!(1);
        assert_eq!(get_optional_arg::<i64>(&args, "limit", &id).unwrap(), Some(5));
        assert_eq!(get_optional_arg::<String>(&args, "format", &id).unwrap(), None);
        assert_eq!(get_optional_arg::<String>(&args, "missing", &id).unwrap(), None);
        assert!(get_optional_arg::<i64>(&args, "bad", &id).is_err());
        assert!(get_required_arg::<String>(&args, "missing", &id).is_err());
    }

    #[test]
    fn test_id_and_address_checks() {
        assert!(is_hex_id(&"ab".repeat(32)));
        assert!(!is_hex_id("abc"));
        assert!(!is_hex_id(&"zz".repeat(32)));
        assert!(is_plausible_address(
            "9fRAWhdxEsTcdb8PhGNrZfwqa65zfkuYHAMmkQLcic1gdLSV5vA"
        ));
        assert!(!is_plausible_address("0xdeadbeef"));
    }
}
