//! Tests for kernel and port errors

use core_kernel::{CoreError, PortError, SystemRole};

#[test]
fn test_unknown_role_names_the_normalized_input() {
    let err = "Chief Vibes Officer".parse::<SystemRole>().unwrap_err();
    assert_eq!(err, CoreError::UnknownRole("chief_vibes_officer".to_string()));
    assert_eq!(err.to_string(), "Unknown role: chief_vibes_officer");
}

#[test]
fn test_role_aliases() {
    assert_eq!("admin".parse::<SystemRole>().unwrap(), SystemRole::SystemAdmin);
    assert_eq!("employee".parse::<SystemRole>().unwrap(), SystemRole::DepartmentEmployee);
}

#[test]
fn test_port_error_constructors() {
    assert!(matches!(PortError::conflict("dup"), PortError::Conflict { .. }));
    assert!(PortError::unavailable("llm").is_transient());
    assert!(!PortError::internal("boom").is_transient());
    assert!(PortError::connection("refused").to_string().contains("refused"));
}

#[test]
fn test_rate_limit_message_carries_retry_hint() {
    let err = PortError::RateLimited { retry_after_secs: 42 };
    assert_eq!(err.to_string(), "Rate limited: retry after 42s");
}

#[test]
fn test_validation_error_has_no_field_by_default() {
    match PortError::validation("Amount is required") {
        PortError::Validation { message, field } => {
            assert_eq!(message, "Amount is required");
            assert!(field.is_none());
        }
        other => panic!("unexpected {:?}", other),
    }
}
