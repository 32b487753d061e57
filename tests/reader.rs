use anyhow::Result;
use arrow::array::{ArrayRef, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use ironbind::testing::*;
use ironbind::*;
use std::sync::Arc;

fn store_with(rows: Vec<SampleTrade>, batch_size: usize) -> Result<MemoryStore> {
    let mut store = MemoryStore::for_record::<SampleTrade>()?;
    Mapper::new(MapperConfig::new().with_batch_size(batch_size)).write_rows(
        rows,
        &mut store,
        &CancellationToken::new(),
    )?;
    Ok(store)
}

#[test]
fn round_trip_preserves_rows_and_groups() -> Result<()> {
    let rows = sample_trades(11);
    let mut store = store_with(rows.clone(), 4)?;

    let batches = Mapper::default()
        .read_batches::<SampleTrade, _>(&mut store, &CancellationToken::new())?
        .collect::<ironbind::Result<Vec<_>>>()?;
    assert_batches(&batches, &[4, 4, 3], &rows);
    Ok(())
}

#[test]
fn failure_at_row_group_stops_the_stream() -> Result<()> {
    let rows = sample_trades(10);
    let mut store = store_with(rows.clone(), 3)?.fail_reads_at(2);

    let mut batches = Mapper::default().read_batches::<SampleTrade, _>(&mut store, &CancellationToken::new())?;
    assert_rows_equal(&batches.next().expect("first")?, &rows[0..3]);
    assert_rows_equal(&batches.next().expect("second")?, &rows[3..6]);

    let err = batches.next().expect("failure").unwrap_err();
    assert_eq!(err.row_group(), Some(2));
    assert!(matches!(err, MapperError::RowGroupRead { index: 2, ref source } if matches!(**source, MapperError::Io(_))));
    assert!(!batches.is_active());
    assert!(batches.next().is_none());
    Ok(())
}

#[test]
fn cancellation_before_first_group_yields_nothing() -> Result<()> {
    let mut store = store_with(sample_trades(6), 2)?;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut batches = Mapper::default().read_batches::<SampleTrade, _>(&mut store, &cancel)?;
    assert!(matches!(batches.next(), Some(Err(MapperError::Cancelled))));
    assert!(batches.next().is_none());
    drop(batches);
    assert_eq!(store.column_reads(), 0);
    Ok(())
}

#[test]
fn cancellation_between_groups_keeps_earlier_batches() -> Result<()> {
    let mut store = store_with(sample_trades(6), 2)?;
    let cancel = CancellationToken::new();

    let mut batches = Mapper::default().read_batches::<SampleTrade, _>(&mut store, &cancel)?;
    let first = batches.next().expect("first batch")?;
    assert_eq!(first.len(), 2);

    cancel.cancel();
    assert!(matches!(batches.next(), Some(Err(MapperError::Cancelled))));
    assert!(batches.next().is_none());
    Ok(())
}

#[test]
fn incompatible_source_fails_before_reading() -> Result<()> {
    let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef],
    )?;
    let mut store = MemoryStore::from_batches(schema, vec![batch])?;

    let err = Mapper::default()
        .read_batches::<SampleTrade, _>(&mut store, &CancellationToken::new())
        .err()
        .expect("incompatible");
    assert!(matches!(err, MapperError::SchemaIncompatible { .. }));
    assert_eq!(store.column_reads(), 0);
    Ok(())
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Person {
    id: i32,
    label: String,
    nickname: Option<String>,
}

bind_record! {
    Person {
        id: i32,
        #[rename("name")]
        label: String,
        nickname: Option<String>,
    }
}

#[test]
fn foreign_store_binds_by_rename() -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("unused", DataType::Float32, true),
        Field::new("id", DataType::Int32, false),
        Field::new("nickname", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(StringArray::from(vec!["ada", "grace"])) as ArrayRef,
            Arc::new(arrow::array::Float32Array::from(vec![None, Some(1.0)])) as ArrayRef,
            Arc::new(Int32Array::from(vec![7, 8])) as ArrayRef,
            Arc::new(StringArray::from(vec![Some("a"), None])) as ArrayRef,
        ],
    )?;
    let mut store = MemoryStore::from_batches(schema, vec![batch])?;

    let exempt = Mapper::default().read_row_groups::<Person, _>(&mut store)?;
    assert_eq!(
        exempt.into_rows(),
        vec![
            Person { id: 7, label: "ada".into(), nickname: None },
            Person { id: 8, label: "grace".into(), nickname: None },
        ]
    );

    let bind = Mapper::new(MapperConfig::new().with_nullable(NullableBinding::BindIfPresent));
    let rows = bind.read_row_groups::<Person, _>(&mut store)?.into_rows();
    assert_eq!(rows[0].nickname.as_deref(), Some("a"));
    assert_eq!(rows[1].nickname, None);
    Ok(())
}

#[test]
fn null_in_required_property_is_a_conversion_error() -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, true),
        Field::new("name", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(Int32Array::from(vec![Some(1), None])) as ArrayRef,
            Arc::new(StringArray::from(vec!["x", "y"])) as ArrayRef,
        ],
    )?;
    let mut store = MemoryStore::from_batches(schema, vec![batch])?;

    let err = Mapper::default()
        .read_row_groups::<Person, _>(&mut store)
        .unwrap_err();
    match err {
        MapperError::RowGroupRead { index, source } => {
            assert_eq!(index, 0);
            assert!(matches!(*source, MapperError::Conversion { ref field, .. } if field == "id"));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn eager_read_exposes_row_groups() -> Result<()> {
    let rows = sample_trades(5);
    let mut store = store_with(rows.clone(), 2)?.with_metadata("origin", "memory");

    let groups = Mapper::default().read_row_groups::<SampleTrade, _>(&mut store)?;
    assert_eq!(groups.row_group_count(), 3);
    assert_eq!(groups.num_rows(), 5);
    assert_rows_equal(groups.row_group(2)?, &rows[4..]);
    assert_eq!(groups.key_value_metadata().get("origin").map(String::as_str), Some("memory"));

    let err = groups.row_group(3).unwrap_err();
    assert!(matches!(err, MapperError::RowGroupRange { index: 3, count: 3 }));
    assert_eq!(groups.iter().map(<[SampleTrade]>::len).collect::<Vec<_>>(), vec![2, 2, 1]);
    Ok(())
}

#[test]
fn empty_store_yields_no_batches() -> Result<()> {
    let mut store = MemoryStore::for_record::<SampleTrade>()?;
    let mut batches = Mapper::default().read_batches::<SampleTrade, _>(&mut store, &CancellationToken::new())?;
    assert_eq!(batches.row_group_count(), 0);
    assert!(batches.next().is_none());
    assert!(!batches.is_active());
    Ok(())
}
