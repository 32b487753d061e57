//! Pre-built record types and datasets for common testing scenarios.

use crate::bind_record;

/// A flat record with no nullable, renamed or ignored properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTrade {
    pub id: i64,
    pub symbol: String,
    pub price: f64,
    pub quantity: u32,
    pub settled: bool,
}

bind_record! {
    SampleTrade {
        id: i64,
        symbol: String,
        price: f64,
        quantity: u32,
        settled: bool,
    }
}

/// A record exercising every attribute: type-level casing, a rename, a
/// nullable property and an ignored property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleCustomer {
    pub customer_id: i32,
    pub label: String,
    pub email: Option<String>,
    pub session: u64,
}

bind_record! {
    #[ignore_casing]
    SampleCustomer {
        customer_id: i32,
        #[rename("name")]
        label: String,
        email: Option<String>,
        #[ignore]
        session: u64,
    }
}

/// A record with nullable and binary properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleReading {
    pub sensor: String,
    pub value: Option<f64>,
    pub flags: Option<i16>,
    pub payload: Vec<u8>,
}

bind_record! {
    SampleReading {
        sensor: String,
        value: Option<f64>,
        flags: Option<i16>,
        payload: Vec<u8>,
    }
}

/// Generate `count` deterministic trades.
///
/// # Example
///
/// ```
/// use ironbind::testing::sample_trades;
///
/// let trades = sample_trades(5);
/// assert_eq!(trades.len(), 5);
/// assert_eq!(trades[0].id, 0);
/// ```
#[must_use]
pub fn sample_trades(count: usize) -> Vec<SampleTrade> {
    const SYMBOLS: [&str; 4] = ["ACME", "GLOBEX", "INITECH", "UMBRELLA"];
    (0..count)
        .map(|i| SampleTrade {
            id: i as i64,
            symbol: SYMBOLS[i % SYMBOLS.len()].to_string(),
            price: 100.0 + (i % 17) as f64 * 0.25,
            quantity: (i as u32 % 9) * 10 + 1,
            settled: i % 3 == 0,
        })
        .collect()
}

/// A handful of customers, one of them without an email.
#[must_use]
pub fn sample_customers() -> Vec<SampleCustomer> {
    vec![
        SampleCustomer {
            customer_id: 1,
            label: "Ada".to_string(),
            email: Some("ada@example.com".to_string()),
            session: 0,
        },
        SampleCustomer {
            customer_id: 2,
            label: "Grace".to_string(),
            email: None,
            session: 0,
        },
        SampleCustomer {
            customer_id: 3,
            label: "Linus".to_string(),
            email: Some("linus@example.com".to_string()),
            session: 0,
        },
    ]
}

/// Readings with gaps in the nullable columns.
#[must_use]
pub fn sample_readings() -> Vec<SampleReading> {
    vec![
        SampleReading {
            sensor: "t-1".to_string(),
            value: Some(21.5),
            flags: Some(3),
            payload: vec![0x01, 0x02],
        },
        SampleReading {
            sensor: "t-2".to_string(),
            value: None,
            flags: Some(-1),
            payload: Vec::new(),
        },
        SampleReading {
            sensor: "t-3".to_string(),
            value: Some(-4.0),
            flags: None,
            payload: vec![0xff],
        },
    ]
}
