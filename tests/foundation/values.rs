//! Integration tests for cell values and column types

use chrono::{TimeZone, Utc};
use junction_foundation::{RowId, Type, Value};
use proptest::prelude::*;

// =============================================================================
// Type Acceptance
// =============================================================================

#[test]
fn optional_text_accepts_names_and_nil() {
    let fullname = Type::option(Type::Text);

    assert!(fullname.accepts(&Value::from("John Doe").value_type()));
    assert!(fullname.accepts(&Value::Nil.value_type()));
    assert!(!fullname.accepts(&Value::Bool(true).value_type()));
}

#[test]
fn bool_column_rejects_everything_else() {
    for value in [
        Value::Nil,
        Value::Timestamp(Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap()),
        Value::from("true"),
        Value::Ref(RowId::new(1)),
    ] {
        assert!(!Type::Bool.accepts(&value.value_type()), "{value:?}");
    }
}

// =============================================================================
// Conversions and Display
// =============================================================================

#[test]
fn timestamps_render_as_rfc3339() {
    let t = Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap();
    let value = Value::from(t);

    assert_eq!(value.to_string(), "2024-01-20T12:00:00Z");
    assert_eq!(value.as_timestamp(), Some(t));
}

#[test]
fn row_refs_display_bare_id() {
    let value = Value::from(RowId::new(12));
    assert_eq!(value.to_string(), "12");
    assert_eq!(format!("{value:?}"), "RowId(12)");
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn bool_values_roundtrip_through_accessor(b in any::<bool>()) {
        prop_assert_eq!(Value::from(b).as_bool(), Some(b));
    }

    #[test]
    fn text_values_keep_their_content(s in ".*") {
        let value = Value::from(s.as_str());
        prop_assert_eq!(value.as_str(), Some(s.as_str()));
        prop_assert_eq!(value.to_string(), s);
    }

    #[test]
    fn row_id_order_matches_raw_order(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        prop_assert_eq!(RowId::new(a) < RowId::new(b), a < b);
    }
}
