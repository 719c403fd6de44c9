use rowkey::{EncodedKey, KeyBuilder, KeyColumn, KeySchema, KeyType, KeyValue};

fn main() {
    // Example: turn an inclusive key interval into a half-open scan range.
    // Use case: scan all rows for host "web-01" between two timestamps.

    let schema = KeySchema::new(vec![
        KeyColumn::new("host", KeyType::String),
        KeyColumn::new("ts", KeyType::Int64),
    ]);

    let mut builder = KeyBuilder::new(&schema);
    builder.add_column_key(KeyValue::String("web-01"));
    builder.add_column_key(KeyValue::Int64(1_700_000_000));
    let lower = builder.build_encoded_key().unwrap();

    builder.reset();
    builder.add_column_key(KeyValue::String("web-01"));
    builder.add_column_key(KeyValue::Int64(1_700_086_400));
    let mut upper = builder.build_encoded_key().unwrap();

    println!("inclusive range: {}", EncodedKey::range_to_string(Some(&lower), Some(&upper)));

    // The successor of the upper bound makes the range half-open:
    // [lower, successor(upper)).
    upper.increment(&schema).unwrap();

    println!("half-open range: {}", EncodedKey::range_to_string(Some(&lower), Some(&upper)));
    println!();
    println!("lower key: {}", lower.stringify(&schema));
    println!("Every key in the scan satisfies lower <= key < successor(upper).");
}
