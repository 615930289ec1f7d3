//! Output normalization for the send pipeline

use attachkit_core::Attachment;

/// Derive the records handed to the send pipeline.
///
/// With `send_compressed`, attachments that carry a compressed copy are sent from that
/// copy (`payload_ref` is swapped; `payload` keeps the original bytes, so senders must
/// resolve `payload_ref`). Otherwise every attachment except audio tracks and voice
/// notes goes out as a plain file, and spoiler hints are dropped.
///
/// The input slice is never modified. The returned records may point `payload_ref` at the
/// compressed copy, so release handles through the records `build` returned, not these.
pub fn prepare_attachments_to_send(
    attachments: &[Attachment],
    send_compressed: bool,
) -> Vec<Attachment> {
    attachments
        .iter()
        .map(|attachment| {
            if send_compressed {
                return match &attachment.compressed_ref {
                    Some(compressed) => attachment.clone().with_payload_ref(compressed.clone()),
                    None => attachment.clone(),
                };
            }

            let mut prepared = if attachment.is_audio_or_voice() {
                let mut prepared = attachment.clone();
                prepared.should_send_as_file = false;
                prepared
            } else {
                attachment.clone().with_send_as_file()
            };
            prepared.should_send_as_spoiler = None;
            prepared
        })
        .collect()
}
