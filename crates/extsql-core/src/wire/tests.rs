use super::{DecodeError, DecodeErrorKind, FilterDecoder, NodeTag, WireNode, WirePayload, decode};
use crate::{
    expr::{ExprNode, OperatorKind},
    types::DataType,
    value::Value,
};
use proptest::prelude::*;

// Emit one tree in the host's children-first order, returning its buffer slot.
fn emit(node: &ExprNode, out: &mut Vec<WireNode>) -> i32 {
    let wire = match node {
        ExprNode::ColumnRef { name } => WireNode::column(name.clone()),
        ExprNode::ConstValue { value } => WireNode::constant(value.clone()),
        ExprNode::Placeholder {
            declared_type,
            param_index,
        } => WireNode::placeholder(
            *declared_type,
            i64::try_from(*param_index).expect("test indices fit i64"),
        ),
        ExprNode::Predicate { op, children } => {
            let indices: Vec<i32> = children.iter().map(|child| emit(child, out)).collect();
            WireNode::operator(*op, indices)
        }
    };
    out.push(wire);

    i32::try_from(out.len() - 1).expect("test streams are small")
}

fn encode_filters(roots: &[ExprNode]) -> Vec<WireNode> {
    let mut stream = Vec::new();
    for root in roots {
        let mut buffer = Vec::new();
        emit(root, &mut buffer);
        stream.extend(buffer);
        stream.push(WireNode::end_of_filter());
    }

    stream
}

#[test]
fn single_equality_decodes_to_predicate_over_column_and_constant() {
    let stream = vec![
        WireNode::column("col"),
        WireNode::constant(10i64),
        WireNode::operator(OperatorKind::Equal, [0, 1]),
        WireNode::end_of_filter(),
    ];

    let filters = decode(&stream).expect("well-formed stream");
    assert_eq!(filters.len(), 1);
    assert_eq!(
        filters[0].root(),
        &ExprNode::equal(ExprNode::column("col"), ExprNode::constant(10i64))
    );
}

#[test]
fn multiple_filters_decode_in_stream_order_with_fresh_buffers() {
    let stream = vec![
        WireNode::column("a"),
        WireNode::constant(1i64),
        WireNode::operator(OperatorKind::Greater, [0, 1]),
        WireNode::end_of_filter(),
        // indices restart at zero for the second filter
        WireNode::column("b"),
        WireNode::null(),
        WireNode::operator(OperatorKind::Is, [0, 1]),
        WireNode::end_of_filter(),
    ];

    let filters = decode(&stream).expect("well-formed stream");
    assert_eq!(filters.len(), 2);
    assert_eq!(filters[0].operator(), OperatorKind::Greater);
    assert_eq!(
        filters[1].root(),
        &ExprNode::predicate(OperatorKind::Is, [ExprNode::column("b"), ExprNode::null()])
    );
}

#[test]
fn placeholder_carries_declared_type_and_index() {
    let stream = vec![
        WireNode::column("id"),
        WireNode::placeholder(DataType::Int64, 3),
        WireNode::operator(OperatorKind::Equal, [0, 1]),
        WireNode::end_of_filter(),
    ];

    let filters = decode(&stream).expect("well-formed stream");
    let ExprNode::Predicate { children, .. } = filters[0].root() else {
        panic!("root must be a predicate");
    };
    assert_eq!(
        children[1].as_ref(),
        &ExprNode::placeholder(DataType::Int64, 3)
    );
}

#[test]
fn empty_stream_decodes_to_no_filters() {
    assert_eq!(decode(&[]).expect("empty stream"), Vec::new());
}

#[test]
fn forward_reference_is_rejected() {
    let stream = vec![
        WireNode::column("a"),
        WireNode::operator(OperatorKind::Equal, [0, 1]),
    ];

    let err = decode(&stream).expect_err("index 1 is not decoded yet");
    assert_eq!(
        err,
        DecodeError::ChildIndexOutOfRange {
            position: 1,
            index: 1,
            len: 1
        }
    );
    assert_eq!(err.kind(), DecodeErrorKind::IndexOutOfRange);
}

#[test]
fn negative_child_index_is_rejected() {
    let stream = vec![
        WireNode::column("a"),
        WireNode::constant(1i64),
        WireNode::operator(OperatorKind::Equal, [0, -1]),
    ];

    let err = decode(&stream).expect_err("negative index");
    assert_eq!(err.kind(), DecodeErrorKind::IndexOutOfRange);
}

#[test]
fn unterminated_stream_is_rejected() {
    let stream = vec![
        WireNode::column("a"),
        WireNode::constant(1i64),
        WireNode::operator(OperatorKind::Equal, [0, 1]),
    ];

    let err = decode(&stream).expect_err("missing end-of-filter");
    assert_eq!(err, DecodeError::Unterminated { pending: 3 });
}

#[test]
fn end_of_filter_on_empty_buffer_is_rejected() {
    let err = decode(&[WireNode::end_of_filter()]).expect_err("empty filter");
    assert_eq!(err, DecodeError::EmptyFilter { position: 0 });
}

#[test]
fn end_of_filter_after_leaf_is_rejected() {
    let stream = vec![WireNode::column("a"), WireNode::end_of_filter()];

    let err = decode(&stream).expect_err("leaf root");
    assert_eq!(
        err,
        DecodeError::RootNotPredicate {
            position: 1,
            label: "column_ref"
        }
    );
}

#[test]
fn unknown_tag_is_a_hard_error() {
    let stream = vec![WireNode::new("cmp.regexp", WirePayload::Indices(vec![]))];

    let err = decode(&stream).expect_err("unknown tag");
    assert_eq!(err.kind(), DecodeErrorKind::UnknownTag);
}

#[test]
fn invalid_tag_decodes_to_invalid_predicate() {
    let stream = vec![
        WireNode::column("a"),
        WireNode::operator(OperatorKind::Invalid, [0]),
        WireNode::end_of_filter(),
    ];

    let filters = decode(&stream).expect("invalid is part of the vocabulary");
    assert_eq!(filters[0].operator(), OperatorKind::Invalid);
}

#[test]
fn arity_below_minimum_is_rejected() {
    let stream = vec![
        WireNode::column("a"),
        WireNode::constant(1i64),
        WireNode::operator(OperatorKind::Between, [0, 1]),
    ];

    let err = decode(&stream).expect_err("between needs three children");
    assert_eq!(
        err,
        DecodeError::ArityBelowMinimum {
            position: 2,
            op: OperatorKind::Between,
            expected: 3,
            found: 2
        }
    );
}

#[test]
fn column_ref_requires_text_payload() {
    let stream = vec![WireNode::new(
        "column_ref",
        WirePayload::Scalar(Value::Int(7)),
    )];

    let err = decode(&stream).expect_err("non-text column name");
    assert_eq!(
        err,
        DecodeError::ColumnNameNotText {
            position: 0,
            found: "Int"
        }
    );
}

#[test]
fn operator_requires_index_payload() {
    let stream = vec![WireNode::new(
        "cmp.eq",
        WirePayload::Scalar(Value::Int(7)),
    )];

    let err = decode(&stream).expect_err("scalar operator payload");
    assert_eq!(err.kind(), DecodeErrorKind::PayloadMismatch);
}

#[test]
fn negative_placeholder_index_is_rejected() {
    let stream = vec![WireNode::placeholder(DataType::Utf8, -2)];

    let err = decode(&stream).expect_err("negative placeholder");
    assert_eq!(
        err,
        DecodeError::NegativePlaceholderIndex {
            position: 0,
            index: -2
        }
    );
}

#[test]
fn null_tag_ignores_payload() {
    assert_eq!(NodeTag::parse("null"), Some(NodeTag::Null));

    let stream = vec![
        WireNode::column("a"),
        WireNode::new("null", WirePayload::Scalar(Value::Int(1))),
        WireNode::operator(OperatorKind::IsNot, [0, 1]),
        WireNode::end_of_filter(),
    ];
    let filters = decode(&stream).expect("null payload is ignored");
    let ExprNode::Predicate { children, .. } = filters[0].root() else {
        panic!("root must be a predicate");
    };
    assert_eq!(children[1].as_ref(), &ExprNode::null());
}

#[test]
fn incremental_decoder_yields_filters_at_sentinels() {
    let mut decoder = FilterDecoder::new();
    assert_eq!(decoder.push(&WireNode::column("a")), Ok(None));
    assert_eq!(decoder.push(&WireNode::constant(2i64)), Ok(None));
    assert_eq!(
        decoder.push(&WireNode::operator(OperatorKind::Less, [0, 1])),
        Ok(None)
    );

    let filter = decoder
        .push(&WireNode::end_of_filter())
        .expect("closes filter")
        .expect("filter yielded");
    assert_eq!(filter.operator(), OperatorKind::Less);
    assert_eq!(decoder.finish(), Ok(()));
}

#[test]
fn shared_children_are_allowed() {
    // the same decoded node may be referenced twice
    let stream = vec![
        WireNode::column("a"),
        WireNode::constant(1i64),
        WireNode::operator(OperatorKind::Equal, [0, 1]),
        WireNode::operator(OperatorKind::Or, [2, 2]),
        WireNode::end_of_filter(),
    ];

    let filters = decode(&stream).expect("shared reference");
    let ExprNode::Predicate { children, .. } = filters[0].root() else {
        panic!("root must be a predicate");
    };
    assert!(std::sync::Arc::ptr_eq(&children[0], &children[1]));
}

///
/// PROPERTIES
///

fn arb_leaf() -> impl Strategy<Value = ExprNode> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(ExprNode::column),
        any::<i64>().prop_map(ExprNode::constant),
        "[a-zA-Z' ]{0,8}".prop_map(ExprNode::constant),
        Just(ExprNode::null()),
        (0u64..16).prop_map(|index| ExprNode::placeholder(DataType::Int64, index)),
    ]
}

fn arb_comparison() -> impl Strategy<Value = ExprNode> {
    prop_oneof![
        (arb_leaf(), arb_leaf())
            .prop_map(|(a, b)| ExprNode::predicate(OperatorKind::Equal, [a, b])),
        (arb_leaf(), arb_leaf(), arb_leaf())
            .prop_map(|(a, b, c)| ExprNode::predicate(OperatorKind::Between, [a, b, c])),
        prop::collection::vec(arb_leaf(), 2..6)
            .prop_map(|items| ExprNode::predicate(OperatorKind::In, items)),
    ]
}

fn arb_filter_root() -> impl Strategy<Value = ExprNode> {
    arb_comparison().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(ExprNode::and),
            prop::collection::vec(inner.clone(), 2..4).prop_map(ExprNode::or),
            inner.prop_map(|child| ExprNode::predicate(OperatorKind::Not, [child])),
        ]
    })
}

proptest! {
    #[test]
    fn children_first_streams_decode_to_their_trees(
        roots in prop::collection::vec(arb_filter_root(), 0..4)
    ) {
        let stream = encode_filters(&roots);
        let filters = decode(&stream).expect("generated streams are well-formed");

        prop_assert_eq!(filters.len(), roots.len());
        for (filter, root) in filters.iter().zip(&roots) {
            prop_assert_eq!(filter.root(), root);
        }
    }

    #[test]
    fn truncated_streams_never_decode(
        root in arb_filter_root(),
        cut in 1usize..8
    ) {
        let mut stream = encode_filters(std::slice::from_ref(&root));
        let keep = stream.len().saturating_sub(cut).max(1);
        // the sentinel is always the last node, so any cut leaves a filter open
        stream.truncate(keep);

        prop_assert!(decode(&stream).is_err());
    }
}
