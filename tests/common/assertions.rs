//! Custom assertion macros for response envelopes
//!
//! Every HTTP response is the same JSON envelope, so most API tests only
//! need to check `status`, `code` and then look at `data`.

/// Assert a successful envelope and return its `data`
#[macro_export]
macro_rules! assert_envelope_ok {
    ($body:expr) => {{
        let body: &serde_json::Value = &$body;
        assert_eq!(body["status"], true, "Expected success envelope, got {}", body);
        assert_eq!(body["code"], 200, "Expected code 200, got {}", body);
        assert_eq!(body["version"], securechat::shared::API_VERSION);
        body["data"].clone()
    }};
}

/// Assert a failed envelope with the given semantic code
#[macro_export]
macro_rules! assert_envelope_err {
    ($body:expr, $code:expr) => {{
        let body: &serde_json::Value = &$body;
        assert_eq!(body["status"], false, "Expected error envelope, got {}", body);
        assert_eq!(body["code"], $code, "Unexpected code in {}", body);
        assert!(body["data"].is_null());
    }};
}
