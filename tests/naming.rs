use anyhow::Result;
use ironbind::naming::{normalize, resolve};
use ironbind::schema::{build_schema, match_schema};
use ironbind::testing::*;
use ironbind::*;
use std::sync::Arc;

#[allow(non_snake_case)]
#[derive(Clone, Debug, Default, PartialEq)]
struct Plain {
    first_name: String,
    AccountNo: i64,
    balance: f64,
}

bind_record! {
    Plain { first_name: String, AccountNo: i64, balance: f64 }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct WithIgnored {
    id: i32,
    cache: String,
    hidden: Option<u8>,
    shown: bool,
}

bind_record! {
    WithIgnored {
        id: i32,
        #[ignore]
        cache: String,
        #[ignore]
        hidden: Option<u8>,
        #[ignore_when(false)]
        shown: bool,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct EmptyRename {
    id: i32,
    note: Option<String>,
}

bind_record! {
    EmptyRename {
        id: i32,
        #[rename("")]
        note: Option<String>,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct AbsentRename {
    id: i32,
}

bind_record! {
    AbsentRename {
        #[rename_opt(None)]
        id: i32,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct IgnoredEmptyRename {
    id: i32,
    scratch: String,
}

bind_record! {
    IgnoredEmptyRename {
        id: i32,
        #[ignore]
        #[rename("")]
        scratch: String,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Casing {
    order_id: i64,
    ship_to: String,
}

bind_record! {
    #[ignore_casing]
    Casing {
        #[ignore_casing_with(ironbind::Separators::HYPHEN)]
        order_id: i64,
        ship_to: String,
    }
}

#[test]
fn plain_type_keeps_property_names_in_order() -> Result<()> {
    let schema = build_schema::<Plain>()?;
    assert_field_names(&schema, &["first_name", "AccountNo", "balance"]);
    Ok(())
}

#[test]
fn ignored_properties_never_appear() -> Result<()> {
    let schema = build_schema::<WithIgnored>()?;
    assert_field_names(&schema, &["id", "shown"]);

    let foreign = Arc::new(arrow::datatypes::Schema::new(vec![
        arrow::datatypes::Field::new("id", arrow::datatypes::DataType::Int32, false),
        arrow::datatypes::Field::new("cache", arrow::datatypes::DataType::Utf8, false),
        arrow::datatypes::Field::new("shown", arrow::datatypes::DataType::Boolean, false),
    ]));
    for policy in [NullableBinding::Exempt, NullableBinding::BindIfPresent] {
        let matched = match_schema::<WithIgnored>(&foreign, policy)?;
        let properties: Vec<_> = matched.field_map().into_values().collect();
        assert!(!properties.contains(&"cache"));
        assert!(!properties.contains(&"hidden"));
        assert_eq!(matched.len(), 2);
    }
    Ok(())
}

#[test]
fn empty_rename_fails_even_when_nullable() -> Result<()> {
    let err = build_schema::<EmptyRename>().unwrap_err();
    assert!(matches!(err, MapperError::MissingName { ref property } if property == "note"));

    let schema = Arc::new(build_schema::<Plain>()?);
    for policy in [NullableBinding::Exempt, NullableBinding::BindIfPresent] {
        let err = match_schema::<EmptyRename>(&schema, policy).unwrap_err();
        assert!(matches!(err, MapperError::MissingName { .. }), "{err}");
    }
    Ok(())
}

#[test]
fn absent_rename_fails() {
    let err = build_schema::<AbsentRename>().unwrap_err();
    assert!(matches!(err, MapperError::MissingName { ref property } if property == "id"));
}

#[test]
fn ignore_wins_over_malformed_rename() -> Result<()> {
    let schema = build_schema::<IgnoredEmptyRename>()?;
    assert_field_names(&schema, &["id"]);
    Ok(())
}

#[test]
fn property_casing_overrides_type_casing() -> Result<()> {
    let schema = build_schema::<Casing>()?;
    // order_id only strips hyphens; ship_to inherits the full type-level rule.
    assert_field_names(&schema, &["order_id", "shipto"]);
    Ok(())
}

#[test]
fn normalization_is_idempotent() {
    let names = ["Customer-ID", "ship to_Address", "already", "A_B-C D", ""];
    let sets = [
        Separators::ALL,
        Separators::NONE,
        Separators::HYPHEN,
        Separators::UNDERSCORE | Separators::SPACE,
    ];
    for name in names {
        for set in sets {
            let once = normalize(name, set);
            assert_eq!(normalize(&once, set), once, "{name:?} under {set:?}");
        }
    }
}

#[test]
fn resolve_applies_rename_then_casing() -> Result<()> {
    let owner = TypeAttributes::new().ignore_casing();
    let attributes = PropertyAttributes::new().rename("Full-Name");
    let resolved = resolve(&owner, "label", &attributes, "label")?;
    assert_eq!(resolved, ResolvedName::Column("fullname".to_string()));

    let ignored = resolve(&owner, "label", &PropertyAttributes::new().ignore(), "label")?;
    assert_eq!(ignored, ResolvedName::Ignored);
    Ok(())
}
