use actix_web::http::header::HeaderMap;

/// Derives the client key used for quota tracking and the studio IP
/// allow-list: first entry of `X-Forwarded-For`, then `X-Real-IP`, then a
/// sentinel. Behind the usual proxies the peer address is the proxy itself,
/// so only forwarded headers are consulted.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            if let Some(first) = s.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(s) = real_ip.to_str() {
            let s = s.trim();
            if !s.is_empty() {
                return s.to_string();
            }
        }
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn prefers_first_forwarded_entry() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "1.2.3.4, 10.0.0.1"))
            .insert_header(("x-real-ip", "9.9.9.9"))
            .to_http_request();
        assert_eq!(client_ip(req.headers()), "1.2.3.4");
    }

    #[test]
    fn falls_back_to_real_ip_header() {
        let req = TestRequest::default()
            .insert_header(("x-real-ip", "9.9.9.9"))
            .to_http_request();
        assert_eq!(client_ip(req.headers()), "9.9.9.9");
    }

    #[test]
    fn unknown_when_no_headers_present() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(client_ip(req.headers()), "unknown");
    }
}
