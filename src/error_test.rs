use super::*;

#[test]
fn rejected_display_includes_status_and_message() {
    let err = ApiError::Rejected { status: 409, code: Some("CONFLICT".into()), message: "username taken".into() };
    assert_eq!(err.to_string(), "request rejected (409): username taken");
}

#[test]
fn network_display() {
    let err = ApiError::Network("connection refused".into());
    assert_eq!(err.to_string(), "network error: connection refused");
}

#[test]
fn error_codes_are_distinct() {
    let codes = [
        ApiError::Network(String::new()).error_code(),
        ApiError::InvalidRequest(String::new()).error_code(),
        ApiError::AuthExpired.error_code(),
        ApiError::Rejected { status: 400, code: None, message: String::new() }.error_code(),
        ApiError::MissingData.error_code(),
        ApiError::Decode(String::new()).error_code(),
        ApiError::MissingRefreshToken.error_code(),
    ];
    let unique: std::collections::HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), codes.len());
}

#[test]
fn status_only_for_server_failures() {
    assert_eq!(ApiError::AuthExpired.status(), Some(401));
    assert_eq!(ApiError::Rejected { status: 422, code: None, message: String::new() }.status(), Some(422));
    assert_eq!(ApiError::Network("x".into()).status(), None);
    assert_eq!(ApiError::MissingData.status(), None);
}

#[test]
fn validation_errors_convert() {
    let mut errors = ValidationErrors::default();
    errors.add("email", "invalid email address");
    let err: ApiError = errors.into();
    assert_eq!(err.error_code(), "E_VALIDATION");
}
