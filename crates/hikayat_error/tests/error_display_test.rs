use hikayat_error::{
    GeminiError, GeminiErrorKind, HikayatError, HikayatErrorKind, RetryableError, StoryError,
    StoryErrorKind,
};

#[test]
fn gemini_errors_convert_into_umbrella_error() {
    let err: HikayatError = GeminiError::new(GeminiErrorKind::NoImageData(
        "gemini-3-pro-image-preview".to_string(),
    ))
    .into();

    assert!(matches!(err.kind(), HikayatErrorKind::Gemini(_)));
    assert!(err.to_string().contains("No image data"));
    assert!(!err.is_retryable());
}

#[test]
fn location_points_at_constructor_call_site() {
    let err = StoryError::new(StoryErrorKind::EmptyStory);
    assert!(err.file.ends_with("error_display_test.rs"));
    assert!(err.line > 0);
}

#[test]
fn transient_http_statuses_are_retryable() {
    for status_code in [408, 429, 500, 502, 503, 504] {
        let err = GeminiError::new(GeminiErrorKind::HttpError {
            status_code,
            message: "transient".to_string(),
        });
        assert!(err.is_retryable(), "{status_code} should be retryable");
    }

    for status_code in [400, 401, 403, 404] {
        let err = GeminiError::new(GeminiErrorKind::HttpError {
            status_code,
            message: "permanent".to_string(),
        });
        assert!(!err.is_retryable(), "{status_code} should not be retryable");
    }
}

#[test]
fn rate_limit_errors_back_off_longer() {
    let kind = GeminiErrorKind::HttpError {
        status_code: 429,
        message: "quota".to_string(),
    };
    assert_eq!(kind.retry_strategy_params(), (5000, 3, 40));
}

#[test]
fn umbrella_error_reports_retryable_provider_cause() {
    let err: HikayatError = GeminiError::new(GeminiErrorKind::HttpError {
        status_code: 503,
        message: "overloaded".to_string(),
    })
    .into();
    assert!(err.is_retryable());
}
