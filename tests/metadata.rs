use anyhow::Result;
use arrow::datatypes::{DataType, Field, Schema};
use ironbind::testing::*;
use ironbind::*;
use std::sync::Arc;
use std::thread;

#[test]
fn metadata_is_cached_per_type_and_schema() -> Result<()> {
    let registry = MetadataRegistry::new();
    assert!(registry.is_empty());

    let first = registry.get_or_create::<SampleTrade>(None, NullableBinding::Exempt)?;
    let second = registry.get_or_create::<SampleTrade>(None, NullableBinding::Exempt)?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);

    let _ = registry.get_or_create::<SampleTrade>(None, NullableBinding::BindIfPresent)?;
    let _ = registry.get_or_create::<SampleCustomer>(None, NullableBinding::Exempt)?;
    assert_eq!(registry.len(), 3);

    registry.clear();
    assert!(registry.is_empty());
    assert_eq!(first.field_names(), vec!["id", "symbol", "price", "quantity", "settled"]);
    Ok(())
}

#[test]
fn bound_schema_holds_only_bound_fields() -> Result<()> {
    let registry = MetadataRegistry::new();

    let exempt = registry.get_or_create::<SampleCustomer>(None, NullableBinding::Exempt)?;
    assert_eq!(exempt.schema().fields().len(), 3);
    assert_field_names(exempt.bound_schema(), &["customerid", "name"]);

    let bound = registry.get_or_create::<SampleCustomer>(None, NullableBinding::BindIfPresent)?;
    assert_field_names(bound.bound_schema(), &["customerid", "name", "email"]);
    assert_eq!(bound.binding("email").map(|b| b.property().name()), Some("email"));
    Ok(())
}

#[test]
fn failed_matches_are_not_cached() {
    let registry = MetadataRegistry::new();
    let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));

    for _ in 0..2 {
        let err = registry
            .get_or_create::<SampleTrade>(Some(&schema), NullableBinding::Exempt)
            .unwrap_err();
        assert!(matches!(err, MapperError::SchemaIncompatible { .. }));
    }
    assert!(registry.is_empty());
}

#[test]
fn concurrent_first_use_sees_equivalent_metadata() -> Result<()> {
    let registry = MetadataRegistry::new();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                scope.spawn(|| registry.get_or_create::<SampleTrade>(None, NullableBinding::Exempt))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .collect()
    });

    let all = results.into_iter().collect::<ironbind::Result<Vec<_>>>()?;
    let expected = all[0].field_names();
    for metadata in &all {
        assert_eq!(metadata.field_names(), expected);
        assert_eq!(metadata.bound_schema(), all[0].bound_schema());
    }
    assert_eq!(registry.len(), 1);

    // Everyone after the race gets the retained entry.
    let later = registry.get_or_create::<SampleTrade>(None, NullableBinding::Exempt)?;
    assert!(all.iter().any(|m| Arc::ptr_eq(m, &later)));
    Ok(())
}

#[test]
fn mappers_can_share_a_registry() -> Result<()> {
    let registry = Arc::new(MetadataRegistry::new());
    let a = Mapper::with_registry(MapperConfig::new(), Arc::clone(&registry));
    let b = Mapper::with_registry(MapperConfig::new().with_batch_size(10), Arc::clone(&registry));

    let from_a = a.metadata::<SampleReading>(None)?;
    let from_b = b.metadata::<SampleReading>(None)?;
    assert!(Arc::ptr_eq(&from_a, &from_b));
    assert_eq!(registry.len(), 1);
    Ok(())
}

#[test]
fn nullability_is_part_of_the_key() -> Result<()> {
    let registry = MetadataRegistry::new();
    let schema = |nullable| {
        Arc::new(Schema::new(vec![
            Field::new("sensor", DataType::Utf8, false),
            Field::new("value", DataType::Float64, nullable),
            Field::new("payload", DataType::Binary, false),
        ]))
    };
    let strict = schema(false);
    let relaxed = schema(true);

    let a = registry.get_or_create::<SampleReading>(Some(&strict), NullableBinding::BindIfPresent)?;
    let b = registry.get_or_create::<SampleReading>(Some(&relaxed), NullableBinding::BindIfPresent)?;
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 2);
    assert_eq!(a.binding("value").map(|f| f.field().is_nullable()), Some(false));
    assert_eq!(b.binding("value").map(|f| f.field().is_nullable()), Some(true));
    Ok(())
}
