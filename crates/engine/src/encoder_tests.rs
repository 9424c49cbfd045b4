use super::*;

fn encode_with(registry: &EncoderRegistry, name: &str, record: &Record) -> Vec<u8> {
    let encoder = registry.resolve(name).expect("resolve");
    let mut out = Vec::new();
    encoder.encode(record, &mut out).expect("encode");
    out
}

#[test]
fn builtin_encoders_are_registered() {
    let registry = EncoderRegistry::with_builtin_encoders();
    assert_eq!(registry.names(), vec!["bincode", "json", "payload"]);

    for name in ["payload", "json", "bincode"] {
        assert!(registry.is_registered(name), "{name} should be registered");
        assert_eq!(registry.resolve(name).expect("resolve").name(), name);
    }
}

#[test]
fn new_registry_is_empty() {
    let registry = EncoderRegistry::new();
    assert!(registry.names().is_empty());
    assert!(matches!(
        registry.resolve("payload"),
        Err(ConfigError::UnknownEncoder(name)) if name == "payload"
    ));
}

#[test]
fn payload_encoder_appends_raw_bytes() {
    let registry = EncoderRegistry::default();
    let record = Record::new(vec![0u8, 159, 146, 150]);

    assert_eq!(encode_with(&registry, "payload", &record), record.payload);
}

#[test]
fn encoders_append_to_existing_output() {
    let mut out = b"prefix:".to_vec();
    PayloadEncoder
        .encode(&Record::new("body"), &mut out)
        .expect("encode");
    assert_eq!(out, b"prefix:body");
}

#[test]
fn json_encoder_writes_object() {
    let registry = EncoderRegistry::default();
    let record = Record::new("say \"hi\"").with_hop_count(3);

    let out = encode_with(&registry, "json", &record);
    let value: serde_json::Value = serde_json::from_slice(&out).expect("valid json");

    assert_eq!(value["hop_count"], 3);
    assert_eq!(value["payload"], "say \"hi\"");
    assert!(!out.contains(&b'\n'));
}

#[test]
fn json_encoder_rejects_invalid_utf8() {
    let record = Record::new(vec![0xff, 0xfe]);
    let mut out = Vec::new();

    let err = JsonEncoder.encode(&record, &mut out).unwrap_err();
    assert!(matches!(err, EncodeError::InvalidUtf8(_)), "{err}");
}

#[test]
fn bincode_encoder_output_decodes_to_record() {
    let registry = EncoderRegistry::default();
    let record = Record::new("binary\0payload").with_hop_count(2);

    let out = encode_with(&registry, "bincode", &record);
    let (decoded, read): (Record, usize) =
        bincode::serde::decode_from_slice(&out, config::standard()).expect("decode");

    assert_eq!(decoded, record);
    assert_eq!(read, out.len());
}

struct UpperEncoder;

impl Encoder for UpperEncoder {
    fn name(&self) -> &str {
        "upper"
    }

    fn encode(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.extend(record.payload.iter().map(u8::to_ascii_uppercase));
        Ok(())
    }
}

#[test]
fn custom_encoders_can_be_registered_and_replaced() {
    let mut registry = EncoderRegistry::new();
    registry.register("text", Box::new(|| Box::new(UpperEncoder) as Box<dyn Encoder>));
    assert_eq!(encode_with(&registry, "text", &Record::new("abc")), b"ABC");

    registry.register("text", Box::new(|| Box::new(PayloadEncoder) as Box<dyn Encoder>));
    assert_eq!(encode_with(&registry, "text", &Record::new("abc")), b"abc");
    assert_eq!(registry.names(), vec!["text"]);
}
