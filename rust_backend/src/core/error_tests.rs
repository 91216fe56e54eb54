#[cfg(test)]
mod tests {
    use crate::core::domain::TenantId;
    use crate::core::error::EngineError;
    use crate::time::{parse_local_date, TimezoneRegistry};

    #[test]
    fn test_codes_are_stable() {
        let cases = [
            (EngineError::invalid_timezone("Mars/Olympus"), "INVALID_TIMEZONE"),
            (
                EngineError::UnknownTenant {
                    tenant_id: TenantId(7),
                    record_id: 1,
                },
                "UNKNOWN_TENANT",
            ),
            (EngineError::EmptyTenantSet, "EMPTY_TENANT_SET"),
            (EngineError::invalid_date("19/08/2024", "bad"), "INVALID_DATE_FORMAT"),
            (EngineError::invalid_instant("yesterday", "bad"), "INVALID_INSTANT_FORMAT"),
            (EngineError::invalid_record(3, "negative amount"), "INVALID_RECORD"),
            (EngineError::invalid_policy("overlap"), "INVALID_POLICY"),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code);
            assert!(err.is_caller_error());
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_code_of_real_failures() {
        let registry = TimezoneRegistry::new();
        assert_eq!(
            registry.resolve("Nowhere/Special").unwrap_err().code(),
            "INVALID_TIMEZONE"
        );
        assert_eq!(
            parse_local_date("2024-13-40").unwrap_err().code(),
            "INVALID_DATE_FORMAT"
        );
    }
}
