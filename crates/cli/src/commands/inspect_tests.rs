use super::*;

use std::io::Cursor;

use sluice_protocol::{PayloadEncoding, codec::write_message, compress_zlib};

fn frames(envelopes: &[Envelope]) -> Vec<u8> {
    let mut wire = Vec::new();
    for env in envelopes {
        write_message(&mut wire, env).expect("write");
    }
    wire
}

fn parse_lines(out: &[u8]) -> Vec<serde_json::Value> {
    std::str::from_utf8(out)
        .expect("utf-8 output")
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect()
}

#[test]
fn prints_one_json_line_per_envelope() {
    let raw = Envelope::new("app", 1, PayloadEncoding::Raw, b"a\nb\n".to_vec());
    let zipped = Envelope::new(
        "app",
        0,
        PayloadEncoding::Zlib,
        compress_zlib(b"c\n", Vec::new()).expect("compress"),
    );

    let mut out = Vec::new();
    let count = inspect(Cursor::new(frames(&[raw.clone(), zipped])), &mut out, false)
        .expect("inspect");

    assert_eq!(count, 2);
    let rows = parse_lines(&out);
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["id"], raw.id.to_string());
    assert_eq!(rows[0]["tag"], "app");
    assert_eq!(rows[0]["hop_count"], 1);
    assert_eq!(rows[0]["encoding"], "raw");
    assert_eq!(rows[0]["payload"], "a\nb\n");

    assert_eq!(rows[1]["encoding"], "zlib");
    assert_eq!(rows[1]["payload"], "c\n");
}

#[test]
fn raw_flag_skips_decompression() {
    let compressed = compress_zlib(b"hidden", Vec::new()).expect("compress");
    let env = Envelope::new("app", 0, PayloadEncoding::Zlib, compressed.clone());

    let line = render(&env, true).expect("render");
    let row: serde_json::Value = serde_json::from_str(&line).expect("json");

    assert_eq!(row["bytes"], compressed.len());
    assert_ne!(row["payload"], "hidden");
}

#[test]
fn empty_input_prints_nothing() {
    let mut out = Vec::new();
    assert_eq!(inspect(Cursor::new(Vec::new()), &mut out, false).expect("inspect"), 0);
    assert!(out.is_empty());
}

#[test]
fn truncated_stream_reports_which_envelope() {
    let env = Envelope::new("app", 0, PayloadEncoding::Raw, b"x\n".to_vec());
    let mut wire = frames(&[env.clone(), env]);
    wire.truncate(wire.len() - 2);

    let mut out = Vec::new();
    let err = inspect(Cursor::new(wire), &mut out, false).unwrap_err();

    assert!(format!("{err:#}").contains("envelope #2"), "{err:#}");
    assert_eq!(parse_lines(&out).len(), 1);
}

#[test]
fn corrupt_zlib_payload_is_an_error() {
    let env = Envelope::new("app", 0, PayloadEncoding::Zlib, b"not zlib".to_vec());
    assert!(render(&env, false).is_err());
}
