use bumpalo::Bump;
use rowkey::{EncodedKey, KeyBuilder, KeyColumn, KeySchema, KeyType, KeyValue};
use uuid::Uuid;

fn main() {
    // Example: build a composite key, ship its bytes somewhere, decode them back.

    let schema = KeySchema::new(vec![
        KeyColumn::new("tenant", KeyType::Uuid),
        KeyColumn::new("seq", KeyType::Int64),
    ]);

    let tenant = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();

    let mut builder = KeyBuilder::new(&schema);
    builder.add_column_key(KeyValue::Uuid(tenant));
    builder.add_column_key(KeyValue::Int64(42));
    let key = builder.build_encoded_key().unwrap();

    println!("encoded:  {}", key.to_hex_string());
    println!("rendered: {}", key.stringify(&schema));

    // Decoding needs an arena to host variable-width payloads; the decoded key
    // borrows from it.
    let arena = Bump::new();
    let decoded = EncodedKey::decode(&schema, &arena, key.as_bytes()).unwrap();

    println!("decoded:  {}", decoded.stringify(&schema));
    assert_eq!(decoded.values(), key.values());
}
