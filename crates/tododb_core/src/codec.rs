//! Stored record format.
//!
//! A todo is stored as a CBOR map with the text keys `id`, `title` and
//! `completed`.

use crate::model::Todo;

/// Encodes `todo` as a stored record.
///
/// # Errors
///
/// Returns the encoder's message if serialization fails.
pub fn encode_todo(todo: &Todo) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    ciborium::into_writer(todo, &mut buf).map_err(|e| e.to_string())?;
    Ok(buf)
}

/// Decodes a stored record.
///
/// # Errors
///
/// Returns the decoder's message if `bytes` is not a todo record.
pub fn decode_todo(bytes: &[u8]) -> Result<Todo, String> {
    ciborium::from_reader(bytes).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_a_three_entry_map() {
        let bytes = encode_todo(&Todo::new("1", "Buy milk")).unwrap();

        // CBOR major type 5 (map) with three entries.
        assert_eq!(bytes[0], 0xA3);
        let value: ciborium::Value = ciborium::from_reader(&bytes[..]).unwrap();
        let map = value.as_map().unwrap();
        let keys: Vec<_> = map.iter().map(|(k, _)| k.as_text().unwrap()).collect();
        assert_eq!(keys, ["id", "title", "completed"]);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let todo = Todo::new("1", "Buy milk").with_completed(true);
        assert_eq!(decode_todo(&encode_todo(&todo).unwrap()).unwrap(), todo);
    }

    #[test]
    fn missing_completed_defaults_to_false() {
        let mut bytes = Vec::new();
        ciborium::into_writer(
            &ciborium::Value::Map(vec![
                ("id".into(), "9".into()),
                ("title".into(), "Old record".into()),
            ]),
            &mut bytes,
        )
        .unwrap();

        assert_eq!(decode_todo(&bytes).unwrap(), Todo::new("9", "Old record"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_todo(b"not cbor at all").is_err());
        assert!(decode_todo(&[]).is_err());
    }
}
