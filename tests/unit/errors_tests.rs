/*!
 * Tests for error types and conversions
 */

use readtogether::errors::{AppError, ProviderError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 400,
        message: "Invalid file format.".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("400"));
    assert!(display.contains("Invalid file format."));
}

#[test]
fn test_providerError_fromStatus_shouldClassifyAuthAndRateLimits() {
    assert!(matches!(
        ProviderError::from_status(401, "bad key"),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(403, "forbidden"),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow down"),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(500, "boom"),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_appError_fromProviderError_shouldWrapCorrectly() {
    let error: AppError = ProviderError::ConnectionError("Host unreachable".to_string()).into();
    assert!(matches!(error, AppError::Provider(_)));
    assert!(error.to_string().contains("Host unreachable"));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing passage");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::File(_)));
}

#[test]
fn test_appError_fromAnyhow_shouldBeUnknown() {
    let error: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(error, AppError::Unknown(ref m) if m == "something odd"));
}

#[test]
fn test_appError_fromRusqlite_shouldBeDatabaseError() {
    let error: AppError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(error, AppError::Database(_)));
}
