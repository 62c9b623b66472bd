use uuid::Uuid;

/// Builds the URL encoded into an attendee's QR code.
///
/// The scanning client decodes the QR payload, extracts the `token` query
/// parameter, and posts it to the check-in endpoint for the event it is
/// scanning. Scan tokens are UUID strings, so no percent-encoding is needed.
pub fn scan_url(base_url: &str, event_id: Uuid, scan_token: &str) -> String {
    format!(
        "{}/events/{}/checkin?token={}",
        base_url.trim_end_matches('/'),
        event_id,
        scan_token
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_url_shape() {
        let event_id = Uuid::new_v4();
        let url = scan_url("https://tickets.example.com/", event_id, "tok-123");
        assert_eq!(
            url,
            format!("https://tickets.example.com/events/{}/checkin?token=tok-123", event_id)
        );
    }
}
