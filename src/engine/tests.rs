use crate::config::DissectConfig;
use crate::engine::{DissectMetrics, Pattern};
use crate::record::{Event, Record, Value};
use crate::{Dissector, mapping};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn int(s: &str) -> Value {
    Value::Int(s.parse().unwrap())
}

fn float(s: &str) -> Value {
    Value::Float(s.parse().unwrap())
}

#[test]
fn dissect_examples_matching() {
    // Array of (pattern, input, expected key/values in commit order)
    let cases: Vec<(&str, &str, Vec<(&str, &str)>)> = vec![
        ("%{a} %{b->} %{c}", "foo bar   baz", vec![("a", "foo"), ("b", "bar"), ("c", "baz")]),
        ("%{a} %{b} %{+b} %{z}", "foo bar baz quux", vec![("a", "foo"), ("b", "bar baz"), ("z", "quux")]),
        ("%{a} %{b} %{+a}", "foo bar baz quux", vec![("a", "foo baz quux"), ("b", "bar")]),
        ("%{+a} %{b}", "foo bar", vec![("b", "bar"), ("a", "foo")]),
        ("[%{a}] %{b} %{c}", "[foo bar] baz quux", vec![("a", "foo bar"), ("b", "baz"), ("c", "quux")]),
        ("%{+a/2} %{+a/4} %{+a/1} %{+a/3}", "bar quux foo baz", vec![("a", "foo bar baz quux")]),
        ("%{a} %{b} %{c}", "00000043 ViewReceiver  I", vec![("a", "00000043"), ("b", "ViewReceiver"), ("c", "I")]),
        ("%{?ic}=%{&ic}% %{msg}", "cpu=95.43% java.lang", vec![("msg", "java.lang"), ("cpu", "95.43")]),
        ("{%{a}}{%{b}}%{rest}", "{foo}{bar}", vec![("a", "foo"), ("b", "bar"), ("rest", "")]),
    ];

    for (pattern, input, expected) in cases {
        let out = Pattern::compile(pattern).unwrap().dissect(input).unwrap();
        let got: Vec<(&str, &str)> = out.iter().collect();
        assert_eq!(got, expected, "pattern `{pattern}` on `{input}`");
    }
}

#[test]
fn round_trips_normal_fields_with_unique_delimiters() {
    let delimiters = ["<", "|", " :: ", "=>", "\t"];
    let values = ["alpha", "", "gamma delta", "42", "ε-ζ"];

    let mut pattern = String::new();
    let mut input = String::new();
    for (i, (delim, value)) in delimiters.iter().zip(values.iter()).enumerate() {
        pattern.push_str(&format!("%{{f{i}}}{delim}"));
        input.push_str(value);
        input.push_str(delim);
    }
    pattern.push_str("%{last}");
    input.push_str("tail end");

    let options =
        crate::engine::CompileOptions { repeated_delimiters: crate::engine::RepeatedDelimiters::Preserve };
    let out = Pattern::compile_with(&pattern, options).unwrap().dissect(&input).unwrap();

    for (i, value) in values.iter().enumerate() {
        assert_eq!(out.get(&format!("f{i}")), Some(*value));
    }
    assert_eq!(out.get("last"), Some("tail end"));
}

#[test]
fn complex_firewall_line() {
    let src = "42 2016-05-25T14:47:23Z host.name.com RT_FLOW - RT_FLOW_SESSION_DENY: session denied 2.2.2.20/60000->1.1.1.10/8090 None 6(0) DEFAULT-DENY ZONE-UNTRUST ZONE-DMZ UNKNOWN UNKNOWN N/A(N/A) ge-0/0/0.0";
    let pattern = "%{} %{syslog_timestamp} %{hostname} %{rt}: %{reason} %{+reason} %{src_ip}/%{src_port}->%{dst_ip}/%{dst_port} %{polrt} %{+polrt} %{+polrt} %{from_zone} %{to_zone} %{rest}";

    let out = Pattern::compile(pattern).unwrap().dissect(src).unwrap();

    assert_eq!(out.len(), 12);
    assert_eq!(out.get("syslog_timestamp"), Some("2016-05-25T14:47:23Z"));
    assert_eq!(out.get("hostname"), Some("host.name.com"));
    assert_eq!(out.get("rt"), Some("RT_FLOW - RT_FLOW_SESSION_DENY"));
    assert_eq!(out.get("reason"), Some("session denied"));
    assert_eq!(out.get("src_ip"), Some("2.2.2.20"));
    assert_eq!(out.get("src_port"), Some("60000"));
    assert_eq!(out.get("dst_ip"), Some("1.1.1.10"));
    assert_eq!(out.get("dst_port"), Some("8090"));
    assert_eq!(out.get("polrt"), Some("None 6(0) DEFAULT-DENY"));
    assert_eq!(out.get("from_zone"), Some("ZONE-UNTRUST"));
    assert_eq!(out.get("to_zone"), Some("ZONE-DMZ"));
    assert_eq!(out.get("rest"), Some("UNKNOWN UNKNOWN N/A(N/A) ge-0/0/0.0"));
}

#[test]
fn basic_dissection_with_datatype_conversion() {
    let config = DissectConfig::new()
        .with_mapping("message", "[%{occurred_at}] %{code} %{service} %{?ic}=%{&ic}% %{svc_message}")
        .with_conversion("cpu", "float")
        .with_conversion("code", "int");
    let dissector = Dissector::new(&config).unwrap();
    let mut event = Event::with_fields([(
        "message",
        "[25/05/16 09:10:38:425 BST] 00000001 SystemOut cpu=95.43% java.lang:type=MemoryPool,name=class storage",
    )]);

    dissector.dissect(&mut event, &crate::engine::NoopMetrics);

    assert_eq!(event.text("occurred_at"), Some("25/05/16 09:10:38:425 BST"));
    assert_eq!(event.get("code"), Some(&int("1")));
    assert_eq!(event.text("service"), Some("SystemOut"));
    assert_eq!(event.get("cpu"), Some(&float("95.43")));
    assert_eq!(event.text("svc_message"), Some("java.lang:type=MemoryPool,name=class storage"));
    assert!(event.tags().is_empty());
}

#[test]
fn multibyte_delimiters_with_conversion() {
    let config = DissectConfig::new()
        .with_mapping("message", "[%{occurred_at}]྿྿྿%{code}྿%{service}྿྿྿྿%{?ic}=%{&ic}%྿྿%{svc_message}")
        .with_conversion("cpu", "float")
        .with_conversion("code", "int");
    let dissector = Dissector::new(&config).unwrap();
    let mut event = Event::with_fields([(
        "message",
        "[25/05/16 09:10:38:425 BST]྿྿྿00000001྿SystemOut྿྿྿྿cpu=95.43%྿྿java.lang:type=MemoryPool,name=class storage",
    )]);

    dissector.dissect(&mut event, &crate::engine::NoopMetrics);

    assert_eq!(event.get("code"), Some(&int("1")));
    assert_eq!(event.text("service"), Some("SystemOut"));
    assert_eq!(event.get("cpu"), Some(&float("95.43")));
    assert_eq!(event.text("svc_message"), Some("java.lang:type=MemoryPool,name=class storage"));
}

#[test]
fn failing_conversions_only_tag() {
    let config = DissectConfig::new()
        .with_mapping("message", "[%{occurred_at}] %{code} %{service} %{?ic}=%{&ic}% %{svc_message}")
        .with_conversion("ccu", "float")
        .with_conversion("other", "int");
    let dissector = Dissector::new(&config).unwrap();
    let mut event = Event::with_fields([
        ("message", Value::from("[25/05/16 09:10:38:425 BST] 00000001 SystemOut cpu=95.43% java.lang")),
        ("other", Value::Map(BTreeMap::new())),
    ]);
    let metrics = DissectMetrics::new();

    dissector.dissect(&mut event, &metrics);

    assert_eq!(event.text("code"), Some("00000001"));
    assert_eq!(event.tags(), &["_dataconversionnullvalue_ccu_float", "_dataconversionuncoercible_other_int"]);
    assert_eq!((metrics.matches(), metrics.failures()), (1, 0));
}

#[test]
fn conversion_without_mapping_handles_large_numbers() {
    let dissector = Dissector::new(&DissectConfig::new().with_conversion("big_number", "int")).unwrap();
    let mut event = Event::with_fields([("big_number", "4394740425750718628")]);
    dissector.dissect(&mut event, &crate::engine::NoopMetrics);
    assert_eq!(event.get("big_number"), Some(&int("4394740425750718628")));

    let dissector = Dissector::new(&DissectConfig::new().with_conversion("big_number", "float")).unwrap();
    let mut event = Event::with_fields([("big_number", "4394740425750718628.345324")]);
    dissector.dissect(&mut event, &crate::engine::NoopMetrics);
    assert_eq!(event.get("big_number"), Some(&float("4394740425750718628.345324")));
}

#[test]
fn skip_and_append_syslog_line() {
    let config = DissectConfig::new()
        .with_mapping("message", "%{timestamp} %{+timestamp} %{+timestamp} %{logsource} %{} %{program}[%{pid}]: %{msg}");
    let dissector = Dissector::new(&config).unwrap();
    let mut event = Event::with_fields([(
        "message",
        "Mar 16 00:01:25 evita skip-this postfix/smtpd[1713]: connect from camomile.cloud9.net[168.100.1.3]",
    )]);

    dissector.dissect(&mut event, &crate::engine::NoopMetrics);

    assert!(event.tags().is_empty());
    assert_eq!(event.text("logsource"), Some("evita"));
    assert_eq!(event.text("timestamp"), Some("Mar 16 00:01:25"));
    assert_eq!(event.text("msg"), Some("connect from camomile.cloud9.net[168.100.1.3]"));
    assert_eq!(event.text("program"), Some("postfix/smtpd"));
    assert_eq!(event.text("pid"), Some("1713"));
    assert_eq!(event.len(), 6);
}

#[test]
fn csv_with_missing_fields_needs_preserved_repeats() {
    let pattern = r#"[%{occurred_at}] %{code} %{service} values: "%{v1}","%{v2}","%{v3}"%{rest}"#;
    let input = r#"[25/05/16 09:10:38:425 BST] 00000001 SystemOut values: "f1","","f3""#;

    let preserve = DissectConfig::new()
        .with_mapping("message", pattern)
        .with_repeated_delimiters(crate::engine::RepeatedDelimiters::Preserve);
    let mut event = Event::with_fields([("message", input)]);
    Dissector::new(&preserve).unwrap().dissect(&mut event, &crate::engine::NoopMetrics);

    assert_eq!(event.text("v1"), Some("f1"));
    assert_eq!(event.text("v2"), Some(""));
    assert_eq!(event.text("v3"), Some("f3"));
    assert_eq!(event.text("rest"), Some(""));
    assert!(event.tags().is_empty());

    // Collapsing swallows the empty column and the next delimiter can no longer be found.
    let collapse = DissectConfig::new().with_mapping("message", pattern);
    let mut event = Event::with_fields([("message", input)]);
    Dissector::new(&collapse).unwrap().dissect(&mut event, &crate::engine::NoopMetrics);
    assert_eq!(event.tags(), &["_dissectfailure"]);
    assert_eq!(event.get("v1"), None);
}

#[test]
fn chained_entries_read_earlier_output() {
    let config = DissectConfig { mapping: mapping! { "message" => "%{ts} %{kv}", "kv" => "%{?k}=%{&k}" }, ..Default::default() };
    let dissector = Dissector::new(&config).unwrap();
    let mut event = Event::with_fields([("message", "12:00 user=alice")]);

    let summary = dissector.dissect(&mut event, &crate::engine::NoopMetrics);

    assert_eq!(summary.matches, 2);
    assert_eq!(event.text("ts"), Some("12:00"));
    assert_eq!(event.text("user"), Some("alice"));
}

#[test]
fn batch_records_are_independent() {
    let dissector = Dissector::new(&DissectConfig::new().with_mapping("message", "%{a} %{b}")).unwrap();
    let metrics = DissectMetrics::new();
    let mut records = vec![
        Event::with_fields([("message", "1 2")]),
        Event::with_fields([("message", "")]),
        Event::new(),
        Event::with_fields([("message", "3 4")]),
    ];

    let summary = dissector.dissect_batch(&mut records, &metrics);

    assert_eq!((summary.matches, summary.failures), (2, 2));
    assert_eq!((metrics.matches(), metrics.failures()), (2, 2));
    assert_eq!(records[0].text("b"), Some("2"));
    assert_eq!(records[1].tags(), &["_dissectfailure"]);
    assert_eq!(records[2].tags(), &["_dissectfailure"]);
    assert_eq!(records[3].text("a"), Some("3"));
    assert!(records[3].tags().is_empty());
}

#[test]
fn compiled_state_is_shared_across_threads() {
    let dissector = Dissector::new(&DissectConfig::new().with_mapping("message", "%{+a/2} %{+a/1} %{b}")).unwrap();
    let metrics = DissectMetrics::new();

    let results: Vec<Event> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dissector = &dissector;
                let metrics = &metrics;
                s.spawn(move || {
                    let mut event = Event::with_fields([("message", format!("x{i} y{i} z{i}"))]);
                    dissector.dissect(&mut event, metrics);
                    event
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, event) in results.iter().enumerate() {
        assert_eq!(event.text("a"), Some(format!("y{i} x{i}").as_str()));
    }
    assert_eq!(metrics.matches(), 8);
}

#[test]
fn record_trait_is_usable_through_a_custom_host() {
    #[derive(Debug, Default)]
    struct Host {
        fields: Vec<(String, Value)>,
        tags: Vec<String>,
    }

    impl Record for Host {
        fn get(&self, field: &str) -> Option<&Value> {
            self.fields.iter().rev().find(|(k, _)| k == field).map(|(_, v)| v)
        }

        fn set(&mut self, field: &str, value: Value) {
            self.fields.push((field.to_string(), value));
        }

        fn tag(&mut self, tag: &str) {
            self.tags.push(tag.to_string());
        }
    }

    let dissector = Dissector::new(&DissectConfig::new().with_mapping("line", "%{a}|%{b}")).unwrap();
    let mut host = Host::default();
    host.set("line", Value::from("x|y"));

    dissector.dissect(&mut host, &crate::engine::NoopMetrics);

    assert_eq!(host.get("a"), Some(&Value::from("x")));
    assert_eq!(host.get("b"), Some(&Value::from("y")));
    assert!(host.tags.is_empty());
}
