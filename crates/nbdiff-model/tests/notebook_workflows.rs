use nbdiff_diff::{
    op_add, op_add_range, op_patch, op_remove_range, op_replace, Diff, DiffEntry, DiffError,
};
use nbdiff_model::{
    create_immutable_model, make_output_models, CellDiffModel, DiffModel, ModelError,
    NotebookDiffModel, Renderable,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn code(source: &str, outputs: Value) -> Value {
    json!({
        "cell_type": "code",
        "execution_count": 1,
        "metadata": {},
        "outputs": outputs,
        "source": source,
    })
}

fn markdown(source: &str) -> Value {
    json!({"cell_type": "markdown", "metadata": {}, "source": source})
}

fn stream(text: &str) -> Value {
    json!({"output_type": "stream", "name": "stdout", "text": text})
}

fn notebook(cells: Vec<Value>) -> Value {
    json!({
        "cells": cells,
        "metadata": {
            "kernelspec": {"name": "python3", "display_name": "Python 3"},
            "language_info": {"name": "python", "mimetype": "text/x-python"},
        },
        "nbformat": 4,
        "nbformat_minor": 2,
    })
}

fn state(cell: &CellDiffModel) -> &'static str {
    if cell.added() {
        "added"
    } else if cell.deleted() {
        "deleted"
    } else if cell.unchanged() {
        "unchanged"
    } else {
        "patched"
    }
}

fn chunk_states(model: &NotebookDiffModel) -> Vec<Vec<&'static str>> {
    model
        .chunked_cells()
        .iter()
        .map(|chunk| chunk.iter().map(state).collect())
        .collect()
}

#[test]
fn removed_middle_cell() {
    init_tracing();
    let nb = notebook(vec![markdown("a"), markdown("b"), markdown("c")]);
    let diff = vec![op_patch("cells", vec![op_remove_range(1, 1)])];
    let model = NotebookDiffModel::new(&nb, &diff).unwrap();
    assert_eq!(
        chunk_states(&model),
        vec![vec!["unchanged"], vec!["deleted"], vec!["unchanged"]]
    );
}

#[test]
fn patched_middle_cell() {
    init_tracing();
    let nb = notebook(vec![
        code("x = 1\n", json!([])),
        code("print(x)\n", json!([stream("1\n")])),
        markdown("done"),
    ]);
    let diff = vec![op_patch(
        "cells",
        vec![op_patch(
            1,
            vec![
                op_replace("execution_count", json!(2)),
                op_patch(
                    "outputs",
                    vec![op_patch(0, vec![op_patch("text", vec![op_remove_range(0, 1)])])],
                ),
                op_patch(
                    "source",
                    vec![op_patch(0, vec![op_add_range(7, ", x")])],
                ),
            ],
        )],
    )];
    let model = NotebookDiffModel::new(&nb, &diff).unwrap();
    assert_eq!(
        chunk_states(&model),
        vec![vec!["unchanged"], vec!["patched"], vec!["unchanged"]]
    );

    let cell = &model.cells[1];
    assert_eq!(cell.source.mimetype, "text/x-python");
    assert_eq!(cell.source.remote.as_deref(), Some("print(x, x)\n"));
    let ranges = cell.source.line_ranges();
    assert_eq!(ranges.additions.len(), 1);
    assert_eq!(ranges.additions[0].from.ch, 7);

    let output = &cell.outputs.as_ref().unwrap()[0];
    assert!(output.patched());
    let path = output.has_mime_type("text/plain").unwrap();
    let text = output.stringify(Some(&path)).unwrap();
    assert_eq!(text.base.as_deref(), Some("1\n"));
    assert_eq!(text.remote.as_deref(), Some(""));
    assert_eq!(text.mimetype, "text/plain");

    assert_eq!(cell.execution_count.as_ref().unwrap().remote, Some(json!(2)));
}

#[test]
fn output_list_remove_first() {
    let base = vec![stream("o0"), stream("o1")];
    let models = make_output_models(Some(&base), None, Some(&[op_remove_range(0, 1)])).unwrap();
    assert!(models[0].deleted());
    assert!(models[1].unchanged());
    assert_eq!(models[1].base(), Some(&base[1]));
}

#[test]
fn immutable_replace() {
    let entry = op_replace("execution_count", json!(9));
    let model = create_immutable_model(Some(json!(5)), Some(json!(5)), Some(&entry)).unwrap();
    assert_eq!(model.base, Some(json!(5)));
    assert_eq!(model.remote, Some(json!(9)));
    assert!(!model.unchanged());
}

#[test]
fn wire_diff_from_service() {
    let nb = notebook(vec![markdown("# Intro\n"), code("1 + 1", json!([]))]);
    let diff: Diff = serde_json::from_value(json!([
        {"op": "patch", "key": "cells", "diff": [
            {"op": "addrange", "key": 2, "valuelist": [
                {"cell_type": "raw", "metadata": {}, "source": "appendix"}
            ]}
        ]},
        {"op": "patch", "key": "metadata", "diff": [
            {"op": "remove", "key": "kernelspec"}
        ]}
    ]))
    .unwrap();
    let model = NotebookDiffModel::new(&nb, &diff).unwrap();
    assert_eq!(
        chunk_states(&model),
        vec![vec!["unchanged"], vec!["unchanged"], vec!["added"]]
    );
    assert_eq!(model.cells[2].source.mimetype, "text/plain");
    let meta = model.metadata.as_ref().unwrap();
    assert_eq!(meta.deletions.len(), 1);
    assert!(meta.additions.is_empty());
}

#[test]
fn overflowing_removerange_from_the_wire() {
    init_tracing();
    let too_long = |key: usize| -> Value {
        json!({"op": "removerange", "key": key, "length": u64::MAX})
    };
    let nb = notebook(vec![markdown("a"), code("x\n", json!([stream("o")]))]);

    let diff: Diff =
        serde_json::from_value(json!([{"op": "patch", "key": "cells", "diff": [too_long(1)]}]))
            .unwrap();
    assert!(matches!(
        NotebookDiffModel::new(&nb, &diff),
        Err(ModelError::Structural(DiffError::RemoveRangeTooLong { key: 1, .. }))
    ));

    let diff: Diff = serde_json::from_value(json!([{"op": "patch", "key": "cells", "diff": [
        {"op": "patch", "key": 1, "diff": [
            {"op": "patch", "key": "source", "diff": [too_long(0)]}
        ]}
    ]}]))
    .unwrap();
    assert!(matches!(
        NotebookDiffModel::new(&nb, &diff),
        Err(ModelError::Structural(DiffError::RemoveRangeTooLong { .. }))
    ));

    let outputs = vec![stream("o0")];
    let entry: DiffEntry = serde_json::from_value(too_long(0)).unwrap();
    assert!(matches!(
        make_output_models(Some(&outputs), None, Some(&[entry])),
        Err(ModelError::Structural(DiffError::RemoveRangeTooLong { .. }))
    ));
}

#[test]
fn removerange_past_end_from_the_wire() {
    let nb = notebook(vec![markdown("a")]);
    let diff: Diff = serde_json::from_value(json!([{"op": "patch", "key": "cells", "diff": [
        {"op": "removerange", "key": 1, "length": 1}
    ]}]))
    .unwrap();
    assert!(matches!(
        NotebookDiffModel::new(&nb, &diff),
        Err(ModelError::Structural(DiffError::RemoveRangeOutOfRange { key: 1, len: 1 }))
    ));
}

// ── Unchanged iff no operative entry ──────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct CellTouch {
    count: bool,
    metadata: bool,
    outputs: bool,
    source: bool,
}

impl CellTouch {
    fn any(self) -> bool {
        self.count || self.metadata || self.outputs || self.source
    }

    /// Cell diff in key order. May be empty, which changes nothing.
    fn diff(self) -> Vec<DiffEntry> {
        let mut diff = Vec::new();
        if self.count {
            diff.push(op_replace("execution_count", json!(2)));
        }
        if self.metadata {
            diff.push(op_patch("metadata", vec![op_add("tags", json!(["t"]))]));
        }
        if self.outputs {
            diff.push(op_patch(
                "outputs",
                vec![op_patch(
                    0,
                    vec![op_patch("text", vec![op_add_range(1, vec![json!("x\n")])])],
                )],
            ));
        }
        if self.source {
            diff.push(op_patch("source", vec![op_patch(0, vec![op_add_range(0, "#")])]));
        }
        diff
    }
}

fn cell_touch() -> impl Strategy<Value = Option<CellTouch>> {
    proptest::option::of((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(count, metadata, outputs, source)| CellTouch {
            count,
            metadata,
            outputs,
            source,
        },
    ))
}

proptest! {
    #[test]
    fn unchanged_iff_no_operative_entry(touches in prop::collection::vec(cell_touch(), 0..6)) {
        let base = notebook(
            (0..touches.len())
                .map(|i| code(&format!("x = {i}\n"), json!([stream("o\n")])))
                .collect(),
        );
        let cells_diff: Vec<DiffEntry> = touches
            .iter()
            .enumerate()
            .filter_map(|(i, touch)| touch.map(|t| op_patch(i, t.diff())))
            .collect();
        let diff = vec![op_patch("cells", cells_diff)];
        let model = NotebookDiffModel::new(&base, &diff).unwrap();
        prop_assert_eq!(model.cells.len(), touches.len());

        for (cell, touch) in model.cells.iter().zip(&touches) {
            let touch = touch.unwrap_or(CellTouch {
                count: false,
                metadata: false,
                outputs: false,
                source: false,
            });
            prop_assert_eq!(cell.unchanged(), !touch.any());
            prop_assert_eq!(cell.source.unchanged(), !touch.source);
            prop_assert_eq!(cell.metadata.unchanged(), !touch.metadata);
            let outputs = cell.outputs.as_ref().unwrap();
            prop_assert_eq!(outputs[0].unchanged(), !touch.outputs);
            prop_assert_eq!(
                cell.execution_count.as_ref().unwrap().unchanged(),
                !touch.count
            );
        }
        prop_assert!(model.metadata.is_none());
    }
}

// ── Chunk totalisation ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum CellEdit {
    Keep,
    Remove,
    Patch,
}

fn cell_edit() -> impl Strategy<Value = CellEdit> {
    prop_oneof![
        Just(CellEdit::Keep),
        Just(CellEdit::Remove),
        Just(CellEdit::Patch),
    ]
}

fn cells_diff(edits: &[(usize, CellEdit)], append: usize) -> Vec<DiffEntry> {
    let mut diff = Vec::new();
    for (i, &(inserted, edit)) in edits.iter().enumerate() {
        if inserted > 0 {
            diff.push(op_add_range(i, vec![markdown("new"); inserted]));
        }
        match edit {
            CellEdit::Keep => {}
            CellEdit::Remove => diff.push(op_remove_range(i, 1)),
            CellEdit::Patch => diff.push(op_patch(
                i,
                vec![op_patch("source", vec![op_add_range(1, vec![json!("!")])])],
            )),
        }
    }
    if append > 0 {
        diff.push(op_add_range(edits.len(), vec![markdown("tail"); append]));
    }
    diff
}

proptest! {
    #[test]
    fn chunks_partition_cells(
        edits in prop::collection::vec((0usize..3, cell_edit()), 0..8),
        append in 0usize..3,
    ) {
        let base = notebook((0..edits.len()).map(|i| markdown(&i.to_string())).collect());
        let diff = vec![op_patch("cells", cells_diff(&edits, append))];
        let model = NotebookDiffModel::new(&base, &diff).unwrap();

        let inserted: usize = edits.iter().map(|e| e.0).sum::<usize>() + append;
        prop_assert_eq!(model.cells.len(), edits.len() + inserted);

        let chunks = model.chunked_cells();
        prop_assert!(chunks.iter().all(|c| !c.is_empty()));
        let flat: Vec<*const CellDiffModel> = chunks
            .iter()
            .flat_map(|c| c.iter().map(|cell| cell as *const CellDiffModel))
            .collect();
        let cells: Vec<*const CellDiffModel> =
            model.cells.iter().map(|cell| cell as *const CellDiffModel).collect();
        prop_assert_eq!(flat, cells);

        for chunk in &chunks {
            let states: Vec<_> = chunk.iter().map(|c| state(c)).collect();
            if states.iter().any(|s| *s == "unchanged" || *s == "patched") {
                prop_assert_eq!(states.len(), 1);
            }
        }
    }
}
