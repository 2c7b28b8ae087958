use nbdiff_diff::{
    flatten_text_diff, op_add_range, op_patch, op_remove_range, patch, raw_to_pos, Diff, DiffEntry,
    DiffRangeRaw,
};
use nbdiff_util::{accumulate_lengths, split_lines};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Apply a character-keyed diff to `text` with the usual cursor walk.
fn apply_char_diff(text: &str, diff: &[DiffEntry]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut take = 0;
    for entry in diff {
        let index = entry.key().as_index().expect("character ops are index keyed");
        if index > take {
            out.extend(&chars[take..index]);
        }
        match entry {
            DiffEntry::AddRange { valuelist, .. } => {
                out.push_str(&valuelist.joined_text().expect("text insertion"));
            }
            DiffEntry::RemoveRange { .. } => {}
            other => panic!("unexpected op in flattened diff: {}", other.op_name()),
        }
        take = take.max(index + entry.op_length());
    }
    if take < chars.len() {
        out.extend(&chars[take..]);
    }
    out
}

#[derive(Debug, Clone, Copy)]
enum LineEdit {
    Keep,
    Remove,
    Patch,
}

fn line_edit() -> impl Strategy<Value = LineEdit> {
    prop_oneof![
        Just(LineEdit::Keep),
        Just(LineEdit::Remove),
        Just(LineEdit::Patch),
    ]
}

fn text_strategy() -> impl Strategy<Value = String> {
    (prop::collection::vec("[a-cé]{0,3}\n", 0..6), "[a-c]{0,3}")
        .prop_map(|(lines, tail)| lines.concat() + &tail)
}

/// A valid line diff for `text`: one optional insertion and one edit per line.
fn text_and_line_diff() -> impl Strategy<Value = (String, Diff)> {
    text_strategy().prop_flat_map(|text| {
        let n = split_lines(&text).len();
        (
            Just(text),
            prop::collection::vec((any::<bool>(), line_edit()), n),
        )
            .prop_map(|(text, edits)| {
                let lines = split_lines(&text);
                let mut diff = Vec::new();
                for (i, (insert, edit)) in edits.into_iter().enumerate() {
                    if insert {
                        diff.push(op_add_range(i, vec![json!("N\n")]));
                    }
                    match edit {
                        LineEdit::Keep => {}
                        LineEdit::Remove => diff.push(op_remove_range(i, 1)),
                        LineEdit::Patch => {
                            let len = lines[i].chars().count();
                            let mut nested = Vec::new();
                            if len > 0 {
                                nested.push(op_remove_range(0, 1));
                            }
                            nested.push(op_add_range(len, "!"));
                            diff.push(op_patch(i, nested));
                        }
                    }
                }
                (text, diff)
            })
    })
}

proptest! {
    #[test]
    fn flattened_diff_patches_like_line_diff((text, diff) in text_and_line_diff()) {
        let by_lines = patch(&Value::String(text.clone()), &diff).unwrap();
        let flat = flatten_text_diff(&text, &diff).unwrap();
        prop_assert_eq!(by_lines.as_str().unwrap(), apply_char_diff(&text, &flat));
    }

    #[test]
    fn flattened_keys_are_sorted((text, diff) in text_and_line_diff()) {
        let flat = flatten_text_diff(&text, &diff).unwrap();
        let keys: Vec<usize> = flat.iter().filter_map(|e| e.key().as_index()).collect();
        prop_assert_eq!(keys.len(), flat.len());
        prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn positions_map_back_to_offsets(text in text_strategy(), a in 0usize..40, b in 0usize..40) {
        let len = text.chars().count();
        let (from, to) = (a.min(b).min(len), a.max(b).min(len));
        let ranges = vec![DiffRangeRaw::new(from, to - from, None)];
        let pos = &raw_to_pos(&ranges, &text)[0];

        let mut starts = vec![0];
        starts.extend(accumulate_lengths(&split_lines(&text)));
        prop_assert_eq!(starts[pos.from.line] + pos.from.ch, from);
        prop_assert_eq!(starts[pos.to.line] + pos.to.ch, to);
        prop_assert!(pos.from <= pos.to || from == to);
    }
}

#[test]
fn wire_diff_flattens_and_patches() {
    let diff: Diff = serde_json::from_value(json!([
        {"op": "patch", "key": 0, "diff": [
            {"op": "removerange", "key": 4, "length": 3},
            {"op": "addrange", "key": 4, "valuelist": "main"}
        ]},
        {"op": "addrange", "key": 2, "valuelist": ["    pass\n"], "source": "remote"}
    ]))
    .unwrap();
    let text = "def foo():\n    return 1\n";

    let flat = flatten_text_diff(text, &diff).unwrap();
    assert_eq!(
        flat,
        vec![
            op_remove_range(4, 3),
            op_add_range(4, "main"),
            op_add_range(24, "    pass\n").with_source(Some(json!("remote"))),
        ]
    );
    assert_eq!(
        patch(&json!(text), &diff).unwrap(),
        json!("def main():\n    return 1\n    pass\n")
    );
    assert_eq!(apply_char_diff(text, &flat), "def main():\n    return 1\n    pass\n");
}

#[test]
fn flattened_entries_serialize_in_wire_format() {
    let flat = flatten_text_diff("a\nb\n", &[op_remove_range(1, 1)]).unwrap();
    assert_eq!(
        serde_json::to_value(&flat).unwrap(),
        json!([{"op": "removerange", "key": 2, "length": 2}])
    );
}
