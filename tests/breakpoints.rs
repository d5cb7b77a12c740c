use libreshockwave::player::debug::{
    deserialize_breakpoints, serialize_breakpoints, Breakpoint, BreakpointManager,
};

fn sample_set() -> Vec<Breakpoint> {
    vec![
        Breakpoint {
            script_id: 12,
            handler_name: "mouseUp".to_string(),
            offset: 0,
            enabled: true,
        },
        Breakpoint {
            script_id: 12,
            handler_name: "exitFrame".to_string(),
            offset: 8,
            enabled: false,
        },
        Breakpoint {
            script_id: 34,
            handler_name: String::new(),
            offset: 4,
            enabled: true,
        },
    ]
}

#[test]
fn serializer_round_trips() {
    let set = sample_set();
    let stored = serialize_breakpoints(&set);
    assert_eq!(deserialize_breakpoints(&stored), set);
}

#[test]
fn current_format_carries_a_version() {
    let stored = serialize_breakpoints(&sample_set());
    let value: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert!(value["version"].as_u64().is_some());
    assert_eq!(value["breakpoints"][0]["scriptId"], 12);
    assert_eq!(value["breakpoints"][0]["handlerName"], "mouseUp");
}

#[test]
fn legacy_string_format_parses_with_empty_handler_names() {
    let parsed = deserialize_breakpoints("12:0,8,16;34:4;");
    assert_eq!(parsed.len(), 4);
    assert!(parsed.iter().all(|bp| bp.handler_name.is_empty()));
    assert!(parsed.iter().all(|bp| bp.enabled));
    assert_eq!(parsed[0].script_id, 12);
    assert_eq!(parsed[0].offset, 0);
    assert_eq!(parsed[2].offset, 16);
    assert_eq!(parsed[3].script_id, 34);
    assert_eq!(parsed[3].offset, 4);
}

#[test]
fn v2_json_without_handler_names_parses() {
    let stored = r#"{"version":2,"breakpoints":[{"scriptId":7,"offset":12}]}"#;
    let parsed = deserialize_breakpoints(stored);
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].script_id, 7);
    assert_eq!(parsed[0].offset, 12);
    assert_eq!(parsed[0].handler_name, "");
    assert!(parsed[0].enabled);
}

#[test]
fn garbage_input_yields_no_breakpoints() {
    assert!(deserialize_breakpoints("").is_empty());
    assert!(deserialize_breakpoints("{not json").is_empty());
    assert!(deserialize_breakpoints("nonsense").is_empty());
}

#[test]
fn manager_toggles_breakpoints() {
    let mut manager = BreakpointManager::new();
    manager.toggle_breakpoint(3, "enterFrame".to_string(), 10);
    assert!(manager.has_breakpoint(3, "enterFrame", 10));
    manager.toggle_breakpoint(3, "enterFrame".to_string(), 10);
    assert!(!manager.has_breakpoint(3, "enterFrame", 10));
}
