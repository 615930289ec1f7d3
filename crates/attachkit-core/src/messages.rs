//! Message helpers for the delete confirmation flow.

/// Ids to delete when the user confirms: the whole album when the message belongs to
/// one, otherwise the single message.
pub fn collect_message_ids(message_id: i64, album: Option<&[i64]>) -> Vec<i64> {
    match album {
        Some(ids) if !ids.is_empty() => ids.to_vec(),
        _ => vec![message_id],
    }
}
