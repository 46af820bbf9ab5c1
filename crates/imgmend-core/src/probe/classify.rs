//! Classify HTTP status and curl errors into fetch outcomes.

use super::fetch::FetchOutcome;

/// Whether an HTTP status means the body can be inspected.
pub fn is_success_status(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Classify a finished response by status. `None` means "go on and inspect the body".
pub fn classify_http_status(code: u32) -> Option<FetchOutcome> {
    if is_success_status(code) {
        None
    } else {
        Some(FetchOutcome::TransportError)
    }
}

/// Classify a curl error. Only curl's own deadline counts as a timeout.
pub fn classify_curl_error(e: &curl::Error) -> FetchOutcome {
    if e.is_operation_timedout() {
        FetchOutcome::TimedOut
    } else {
        FetchOutcome::TransportError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_2xx_is_inspected() {
        assert_eq!(classify_http_status(200), None);
        assert_eq!(classify_http_status(206), None);
    }

    #[test]
    fn http_errors_are_transport_failures() {
        for code in [301, 403, 404, 429, 500, 503] {
            assert_eq!(classify_http_status(code), Some(FetchOutcome::TransportError));
        }
    }

    #[test]
    fn curl_timeout_is_timeout() {
        // CURLE_OPERATION_TIMEDOUT
        assert_eq!(classify_curl_error(&curl::Error::new(28)), FetchOutcome::TimedOut);
    }

    #[test]
    fn curl_connection_failures_are_transport() {
        // CURLE_COULDNT_RESOLVE_HOST, CURLE_COULDNT_CONNECT, CURLE_RECV_ERROR
        for code in [6, 7, 56] {
            assert_eq!(
                classify_curl_error(&curl::Error::new(code)),
                FetchOutcome::TransportError
            );
        }
    }
}
