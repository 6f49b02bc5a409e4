use querylens::editor::{
    KeyEvent, QueryEditor, RequestId, Selection, SelectionRange, TextChange, Transaction,
    TriggerOutcome, TriggerState,
};
use querylens::{DetectorConfig, ExecutePayload, Language, QueryLensError};
use std::cell::RefCell;
use std::rc::Rc;

const SCRIPT: &str = "const client = new Client()\nawait client.user.findMany({ take: 5 })\n";

fn editor() -> QueryEditor {
    QueryEditor::new(SCRIPT, Language::TypeScript, DetectorConfig::default()).unwrap()
}

fn inside_find_many() -> usize {
    SCRIPT.find("findMany").unwrap()
}

fn recorder(editor: &mut QueryEditor) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    editor.on_execute(move |text| sink.borrow_mut().push(text.to_string()));
    seen
}

// ============================================================================
// DOCUMENT CHANGES
// ============================================================================

#[test]
fn test_initial_detection() {
    let editor = editor();
    assert_eq!(editor.registry().len(), 1);
    assert_eq!(editor.cursor(), 0);
    assert!(editor.query_at_cursor().is_none());
}

#[test]
fn test_appending_a_call_rebuilds() {
    let mut editor = editor();
    let changed = editor
        .apply(Transaction::changes(vec![TextChange::insert(
            SCRIPT.len(),
            "await client.$disconnect()\n",
        )]))
        .unwrap();

    assert!(changed);
    let labels: Vec<String> = editor.registry().iter().map(|q| q.label()).collect();
    assert_eq!(labels, vec!["user.findMany", "$disconnect"]);
}

#[test]
fn test_insert_before_shifts_ranges() {
    let mut editor = editor();
    let before = editor.registry().iter().next().unwrap().clone();
    editor
        .apply(Transaction::changes(vec![TextChange::insert(0, "// seed\n")]))
        .unwrap();

    let after = editor.registry().iter().next().unwrap();
    assert_eq!(after.from, before.from + 8);
    assert_eq!(after.to, before.to + 8);
    assert_eq!(after.line_start, before.line_start + 1);
    assert_eq!(&editor.source()[after.range()], before.text);
}

#[test]
fn test_editing_inside_a_query_updates_arguments() {
    let mut editor = editor();
    let five = SCRIPT.find('5').unwrap();
    editor
        .apply(Transaction::changes(vec![TextChange::new(five, five + 1, "25")]))
        .unwrap();

    let query = editor.registry().iter().next().unwrap();
    assert_eq!(query.raw_argument_text.as_deref(), Some("{ take: 25 }"));
    assert_eq!(query.parsed_arguments, Some(serde_json::json!({ "take": 25 })));
}

#[test]
fn test_removing_the_construction_clears_registry() {
    let mut editor = editor();
    let line_end = SCRIPT.find('\n').unwrap() + 1;
    editor
        .apply(Transaction::changes(vec![TextChange::delete(0, line_end)]))
        .unwrap();

    assert!(editor.registry().is_empty());
    assert!(editor.registry().binding().is_none());
}

#[test]
fn test_typing_the_construction_enables_detection() {
    let body = "await client.user.findMany()\n";
    let mut editor = QueryEditor::new(body, Language::TypeScript, DetectorConfig::default()).unwrap();
    assert!(editor.registry().is_empty());

    editor
        .apply(Transaction::changes(vec![TextChange::insert(0, "const client = new Client()\n")]))
        .unwrap();
    assert_eq!(editor.registry().len(), 1);
}

#[test]
fn test_multiple_changes_use_original_offsets() {
    let mut editor = editor();
    let changes = vec![
        TextChange::insert(SCRIPT.len(), "await client.$connect()\n"),
        TextChange::insert(0, "// a\n"),
    ];
    editor.apply(Transaction::changes(changes)).unwrap();

    assert!(editor.source().starts_with("// a\nconst client"));
    assert!(editor.source().ends_with("await client.$connect()\n"));
    assert_eq!(editor.registry().len(), 2);
}

#[test]
fn test_selection_only_transaction_keeps_registry() {
    let mut editor = editor();
    let before = editor.registry().clone();
    let changed = editor
        .apply(Transaction::select(Selection::cursor(inside_find_many())))
        .unwrap();

    assert!(!changed);
    assert_eq!(editor.registry(), &before);
    assert_eq!(editor.query_at_cursor().unwrap().operation, "findMany");
}

#[test]
fn test_noop_replacement_is_not_a_change() {
    let mut editor = editor();
    let changed = editor
        .apply(Transaction::changes(vec![TextChange::new(0, 5, "const")]))
        .unwrap();
    assert!(!changed);
}

#[test]
fn test_selection_maps_through_changes() {
    let mut editor = editor();
    let pos = inside_find_many();
    editor.apply(Transaction::select(Selection::cursor(pos))).unwrap();
    editor
        .apply(Transaction::changes(vec![TextChange::insert(0, "\n\n")]))
        .unwrap();

    assert_eq!(editor.cursor(), pos + 2);
    assert_eq!(editor.query_at_cursor().unwrap().operation, "findMany");
}

#[test]
fn test_invalid_changes_leave_editor_untouched() {
    let mut editor = editor();
    let err = editor
        .apply(Transaction::changes(vec![TextChange::insert(SCRIPT.len() + 1, "x")]))
        .unwrap_err();
    assert!(matches!(err, QueryLensError::InvalidEdit(_)));

    let overlapping = vec![TextChange::new(0, 10, ""), TextChange::new(5, 12, "")];
    assert!(editor.apply(Transaction::changes(overlapping)).is_err());

    let out_of_range_selection = Transaction::select(Selection::cursor(SCRIPT.len() + 3));
    assert!(editor.apply(out_of_range_selection).is_err());

    assert_eq!(editor.source(), SCRIPT);
    assert_eq!(editor.registry().len(), 1);
}

#[test]
fn test_invalid_run_key_is_rejected() {
    let config = DetectorConfig {
        run_key: "Hyper-Enter".to_string(),
        ..DetectorConfig::default()
    };
    let result = QueryEditor::new(SCRIPT, Language::TypeScript, config);
    assert!(matches!(result, Err(QueryLensError::InvalidKeyBinding(_))));
}

// ============================================================================
// CURSOR AND EXECUTION
// ============================================================================

#[test]
fn test_run_key_dispatches_query_under_cursor() {
    let mut editor = editor();
    let seen = recorder(&mut editor);
    editor
        .apply(Transaction::select(Selection::cursor(inside_find_many())))
        .unwrap();

    let outcome = editor.handle_key(&KeyEvent::ctrl("Enter"));
    match &outcome {
        TriggerOutcome::Dispatched { request_id, query } => {
            assert_eq!(*request_id, RequestId(1));
            assert_eq!(query.operation, "findMany");
        }
        other => panic!("expected dispatch, got {:?}", other),
    }
    assert!(outcome.is_handled());
    assert_eq!(*seen.borrow(), vec!["client.user.findMany({ take: 5 })".to_string()]);
    assert_eq!(editor.trigger_state(), TriggerState::Idle);

    let second = editor.handle_key(&KeyEvent::meta("Enter"));
    assert!(matches!(second, TriggerOutcome::Dispatched { request_id: RequestId(2), .. }));
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn test_run_key_outside_queries_is_consumed() {
    let mut editor = editor();
    let seen = recorder(&mut editor);

    let outcome = editor.handle_key(&KeyEvent::ctrl("Enter"));
    assert_eq!(outcome, TriggerOutcome::NoOp);
    assert!(outcome.is_handled());
    assert!(seen.borrow().is_empty());
    assert_eq!(editor.trigger_state(), TriggerState::Idle);
}

#[test]
fn test_other_keys_are_ignored() {
    let mut editor = editor();
    let seen = recorder(&mut editor);
    editor
        .apply(Transaction::select(Selection::cursor(inside_find_many())))
        .unwrap();

    let outcome = editor.handle_key(&KeyEvent::plain("Enter"));
    assert_eq!(outcome, TriggerOutcome::Ignored);
    assert!(!outcome.is_handled());
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_callbacks_run_in_registration_order() {
    let mut editor = editor();
    let log = Rc::new(RefCell::new(Vec::new()));
    for name in ["first", "second", "third"] {
        let sink = Rc::clone(&log);
        editor.on_execute(move |_| sink.borrow_mut().push(name));
    }
    editor
        .apply(Transaction::select(Selection::cursor(inside_find_many())))
        .unwrap();
    editor.handle_key(&KeyEvent::ctrl("Enter"));

    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_argument_payload() {
    let config = DetectorConfig {
        payload: ExecutePayload::Argument,
        ..DetectorConfig::default()
    };
    let source = format!("{}await client.$connect()\n", SCRIPT);
    let mut editor = QueryEditor::new(&source, Language::TypeScript, config).unwrap();
    let seen = recorder(&mut editor);

    editor
        .apply(Transaction::select(Selection::cursor(inside_find_many())))
        .unwrap();
    editor.handle_key(&KeyEvent::ctrl("Enter"));

    let connect = source.find("$connect").unwrap();
    editor.apply(Transaction::select(Selection::cursor(connect))).unwrap();
    editor.handle_key(&KeyEvent::ctrl("Enter"));

    assert_eq!(
        *seen.borrow(),
        vec!["{ take: 5 }".to_string(), "client.$connect()".to_string()]
    );
}

#[test]
fn test_last_selection_range_decides() {
    let mut editor = editor();
    let pos = inside_find_many();

    let last_inside = Selection::new(vec![SelectionRange::cursor(0), SelectionRange::cursor(pos)]);
    editor.apply(Transaction::select(last_inside)).unwrap();
    assert!(editor.query_at_cursor().is_some());

    let last_outside = Selection::new(vec![SelectionRange::cursor(pos), SelectionRange::cursor(0)]);
    editor.apply(Transaction::select(last_outside)).unwrap();
    assert!(editor.query_at_cursor().is_none());
}

#[test]
fn test_selection_head_decides() {
    let mut editor = editor();
    let pos = inside_find_many();

    editor.apply(Transaction::select(Selection::single(pos, 0))).unwrap();
    assert!(editor.query_at_cursor().is_none());

    editor.apply(Transaction::select(Selection::single(0, pos))).unwrap();
    assert!(editor.query_at_cursor().is_some());
}
