//! SMS message templates.

/// Sent when all assets for a job are ready to download.
pub fn generation_complete(download_url: &str) -> String {
    format!(
        "Your custom sleep story is ready! \u{1F319} Download your audio, artwork, and story at: {download_url}"
    )
}

/// Sent when generation fails after all retries.
pub fn generation_failed(support_phone: &str) -> String {
    format!(
        "We encountered an issue generating your sleep story. Please contact our support at {support_phone} for assistance and a refund."
    )
}

/// Sent right after a successful payment, before generation starts.
pub fn payment_confirmation() -> String {
    "Thank you for your purchase! We're now creating your custom sleep story. \
     This typically takes about 3 minutes. We'll text you when it's ready! \u{1F3A8}"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_message_embeds_download_url() {
        let message = generation_complete("https://example.com/download/tok");
        assert!(message.contains("https://example.com/download/tok"));
        assert!(message.contains("ready"));
    }

    #[test]
    fn failure_message_embeds_support_contact() {
        let message = generation_failed("+15551234567");
        assert!(message.contains("+15551234567"));
        assert!(message.contains("refund"));
    }
}
