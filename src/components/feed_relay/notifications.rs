use super::models::{
    Identity, InlineAttachment, MessageTemplate, NotificationPayload, SendRequest,
    INVITE_CONTENT_TYPE,
};

/// Build the send request carrying one encoded invitation.
///
/// The base64 content is placed into the attachment verbatim.
pub fn build_message(
    attachment_base64: &str,
    recipient: &Identity,
    sender: &Identity,
    template: &MessageTemplate,
) -> SendRequest {
    SendRequest::single(NotificationPayload {
        from: sender.clone(),
        to: vec![recipient.clone()],
        subject: template.subject.clone(),
        text_part: template.text_for(recipient),
        inlined_attachments: vec![InlineAttachment {
            content_type: INVITE_CONTENT_TYPE.to_string(),
            filename: template.filename.clone(),
            content_id: template.content_id.clone(),
            base64_content: attachment_base64.to_string(),
        }],
    })
}
