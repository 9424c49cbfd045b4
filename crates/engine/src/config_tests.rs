use super::*;

fn valid() -> BatcherConfig {
    BatcherConfig {
        encoder: "payload".into(),
        ..BatcherConfig::default()
    }
}

#[test]
fn defaults_match_documented_values() {
    let cfg = BatcherConfig::default();

    assert_eq!(cfg.flush_interval(), Duration::from_millis(1000));
    assert_eq!(cfg.flush_bytes, 10);
    assert_eq!(cfg.tag, "filtered");
    assert_eq!(cfg.encoder, "");
    assert_eq!(cfg.delimiter, "\n");
    assert_eq!(cfg.framing, Framing::Delimited);
    assert_eq!(cfg.batch_capacity, 10_000);
    assert_eq!(cfg.max_hops, 4);
}

#[test]
fn validate_reports_first_problem() {
    let cases: Vec<(&str, BatcherConfig, Option<&str>)> = vec![
        ("valid", valid(), None),
        (
            "empty tag",
            BatcherConfig {
                tag: String::new(),
                ..valid()
            },
            Some("tag"),
        ),
        (
            "empty encoder",
            BatcherConfig::default(),
            Some("encoder"),
        ),
        (
            "zero bytes",
            BatcherConfig {
                flush_bytes: 0,
                ..valid()
            },
            Some("flush_bytes"),
        ),
        (
            "zero interval",
            BatcherConfig {
                flush_interval_ms: 0,
                ..valid()
            },
            Some("flush_interval_ms"),
        ),
    ];

    for (label, cfg, expected) in cases {
        match (cfg.validate(), expected) {
            (Ok(()), None) => {}
            (Err(e), Some(needle)) => {
                assert!(e.to_string().contains(needle), "{label}: got {e}")
            }
            (got, want) => panic!("{label}: got {got:?}, expected error containing {want:?}"),
        }
    }
}

#[test]
fn validate_variants() {
    assert!(matches!(
        BatcherConfig {
            tag: String::new(),
            ..valid()
        }
        .validate(),
        Err(ConfigError::EmptyTag)
    ));
    assert!(matches!(
        BatcherConfig::default().validate(),
        Err(ConfigError::EmptyEncoder)
    ));
}

#[test]
fn json_overrides_only_given_fields() {
    let cfg = BatcherConfig::from_json_str(
        r#"{"encoder": "json", "flush_bytes": 4096, "framing": "delimited+compressed"}"#,
    )
    .expect("parse");

    assert_eq!(cfg.encoder, "json");
    assert_eq!(cfg.flush_bytes, 4096);
    assert_eq!(cfg.framing, Framing::DelimitedCompressed);
    assert_eq!(cfg.tag, DEFAULT_TAG);
    assert_eq!(cfg.flush_interval_ms, DEFAULT_FLUSH_INTERVAL_MS);
}

#[test]
fn json_rejects_unknown_fields() {
    assert!(BatcherConfig::from_json_str(r#"{"flush_byte": 1}"#).is_err());
}

#[test]
fn framing_parse_cases() {
    let cases: &[(&str, Option<Framing>)] = &[
        ("delimited", Some(Framing::Delimited)),
        ("Compressed", Some(Framing::Compressed)),
        (" delimited+compressed ", Some(Framing::DelimitedCompressed)),
        ("compressed+delimited", Some(Framing::DelimitedCompressed)),
        ("zlib", None),
        ("", None),
    ];

    for (input, expected) in cases {
        let got = input.parse::<Framing>().ok();
        assert_eq!(got, *expected, "parsing {input:?}");
    }
}

#[test]
fn framing_display_parses_back() {
    for framing in [
        Framing::Delimited,
        Framing::Compressed,
        Framing::DelimitedCompressed,
    ] {
        assert_eq!(framing.to_string().parse::<Framing>().ok(), Some(framing));
    }
}

#[test]
fn record_delimiter_follows_framing() {
    let cases: &[(Framing, &[u8])] = &[
        (Framing::Delimited, b"\r\n"),
        (Framing::Compressed, b""),
        (Framing::DelimitedCompressed, b"\r\n"),
    ];

    for (framing, expected) in cases {
        let cfg = BatcherConfig {
            delimiter: "\r\n".into(),
            framing: *framing,
            ..valid()
        };
        assert_eq!(cfg.record_delimiter(), *expected, "framing {framing}");
    }
}
