use crate::provider::MailMessage;

/// Render search results as chat prose. The empty-result string is
/// matched verbatim by downstream consumers, keep it stable.
pub fn format_messages(messages: &[MailMessage]) -> String {
    if messages.is_empty() {
        return "No emails found matching your criteria.".to_string();
    }

    let mut out = format!("📧 Found {} email(s):\n\n", messages.len());
    for (index, msg) in messages.iter().enumerate() {
        out.push_str(&format!("**Email {}:**\n", index + 1));
        out.push_str(&format!(
            "From: {} <{}>\n",
            msg.sender_name, msg.sender_address
        ));
        out.push_str(&format!("Subject: {}\n", msg.subject));
        out.push_str(&format!(
            "Received: {}\n",
            msg.received_at.format("%b %d, %Y %H:%M")
        ));
        let preview: String = msg.body_preview.chars().take(150).collect();
        let ellipsis = if msg.body_preview.chars().count() > 150 {
            "..."
        } else {
            ""
        };
        out.push_str(&format!("Preview: {preview}{ellipsis}\n"));
        if msg.has_attachments {
            out.push_str("📎 Has attachments\n");
        }
        out.push_str("\n---\n\n");
    }
    out
}
