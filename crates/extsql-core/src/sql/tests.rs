use super::{
    CompileError, CompileErrorKind, DeclineReason, Dialect, LiteralError, Pushdown, QueryBuilder,
    QueryError, SqlCompiler, bind_placeholders, compile, has_top_level_or, render_literal,
};
use crate::{
    expr::{ExprNode, Filter, OperatorKind},
    obs::{metrics_report, metrics_reset_all},
    types::DataType,
    value::{Decimal, Value, ValueKind},
    wire::{WireNode, decode},
};
use chrono::NaiveDate;
use proptest::prelude::*;

fn filter(root: ExprNode) -> Filter {
    Filter::new(root).expect("test roots are predicates")
}

fn accepted(pushdown: &Pushdown) -> &str {
    pushdown
        .fragment()
        .map(|fragment| fragment.as_str())
        .unwrap_or_else(|| panic!("expected accepted filter, got {pushdown:?}"))
}

fn generic(root: ExprNode) -> Pushdown {
    compile(&filter(root), Dialect::GENERIC)
}

fn ints(values: &[i64]) -> impl Iterator<Item = ExprNode> + '_ {
    values.iter().map(|v| ExprNode::constant(*v))
}

// Standard SQL string-literal reading: strip the quotes, collapse `''`.
fn reparse_literal(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\'' && chars.next() != Some('\'') {
            return None;
        }
        out.push(ch);
    }

    Some(out)
}

//
// compile
//

#[test]
fn decoded_equality_compiles_to_bare_comparison() {
    let stream = vec![
        WireNode::column("col"),
        WireNode::constant(42i64),
        WireNode::operator(OperatorKind::Equal, [0, 1]),
        WireNode::end_of_filter(),
    ];
    let filters = decode(&stream).expect("well-formed stream");

    let pushdown = compile(&filters[0], Dialect::GENERIC);
    assert_eq!(accepted(&pushdown), "col=42");
    assert_eq!(pushdown.to_wire(), "col=42");
}

#[test]
fn comparison_spellings() {
    let cases = [
        (OperatorKind::Equal, "c=1"),
        (OperatorKind::NotEqual, "c<>1"),
        (OperatorKind::Less, "c<1"),
        (OperatorKind::LessEqual, "c<=1"),
        (OperatorKind::Greater, "c>1"),
        (OperatorKind::GreaterEqual, "c>=1"),
        (OperatorKind::Is, "c IS 1"),
        (OperatorKind::IsNot, "c IS NOT 1"),
        (OperatorKind::Like, "c LIKE 1"),
        (OperatorKind::NotLike, "c NOT LIKE 1"),
    ];

    for (op, expected) in cases {
        let pushdown = generic(ExprNode::predicate(
            op,
            [ExprNode::column("c"), ExprNode::constant(1i64)],
        ));
        assert_eq!(accepted(&pushdown), expected, "{op}");
    }
}

#[test]
fn is_null_renders_null_keyword() {
    let pushdown = generic(ExprNode::predicate(
        OperatorKind::IsNot,
        [ExprNode::column("c"), ExprNode::null()],
    ));

    assert_eq!(accepted(&pushdown), "c IS NOT NULL");
}

#[test]
fn text_constant_doubles_embedded_quotes() {
    let pushdown = generic(ExprNode::equal(
        ExprNode::column("name"),
        ExprNode::constant("O'Brien"),
    ));

    assert_eq!(accepted(&pushdown), "name='O''Brien'");
}

#[test]
fn in_and_not_in_list_their_tail() {
    let in_list = generic(ExprNode::predicate(
        OperatorKind::In,
        std::iter::once(ExprNode::column("col")).chain(ints(&[1, 2, 3])),
    ));
    let not_in_list = generic(ExprNode::predicate(
        OperatorKind::NotIn,
        std::iter::once(ExprNode::column("col")).chain(ints(&[1, 2, 3])),
    ));

    assert_eq!(accepted(&in_list), "col IN (1, 2, 3)");
    assert_eq!(accepted(&not_in_list), "col NOT IN (1, 2, 3)");
}

#[test]
fn logical_connectives_parenthesize_every_child() {
    let and = generic(ExprNode::and([ExprNode::column("a"), ExprNode::column("b")]));
    let or = generic(ExprNode::or([
        ExprNode::equal(ExprNode::column("a"), ExprNode::constant(1i64)),
        ExprNode::equal(ExprNode::column("b"), ExprNode::constant(2i64)),
        ExprNode::equal(ExprNode::column("c"), ExprNode::constant(3i64)),
    ]));
    let not = generic(ExprNode::predicate(
        OperatorKind::Not,
        [ExprNode::equal(
            ExprNode::column("a"),
            ExprNode::constant(1i64),
        )],
    ));

    assert_eq!(accepted(&and), "(a) AND (b)");
    assert_eq!(accepted(&or), "(a=1) OR (b=2) OR (c=3)");
    assert_eq!(accepted(&not), "NOT (a=1)");
}

#[test]
fn between_family_renders_bounds_in_order() {
    let between = generic(ExprNode::predicate(
        OperatorKind::Between,
        std::iter::once(ExprNode::column("x")).chain(ints(&[1, 9])),
    ));
    let not_between = generic(ExprNode::predicate(
        OperatorKind::NotBetween,
        std::iter::once(ExprNode::column("x")).chain(ints(&[1, 9])),
    ));

    assert_eq!(accepted(&between), "x BETWEEN 1 AND 9");
    assert_eq!(accepted(&not_between), "x NOT BETWEEN 1 AND 9");
}

#[test]
fn like_accepts_escape_operand() {
    let pushdown = generic(ExprNode::predicate(
        OperatorKind::Like,
        [
            ExprNode::column("s"),
            ExprNode::constant("50!%"),
            ExprNode::constant("!"),
        ],
    ));

    assert_eq!(accepted(&pushdown), "s LIKE '50!%' ESCAPE '!'");
}

#[test]
fn predicate_operands_are_parenthesized() {
    let greater = |name: &str, bound: i64| {
        ExprNode::predicate(
            OperatorKind::Greater,
            [ExprNode::column(name), ExprNode::constant(bound)],
        )
    };
    let equals = |name: &str, value: i64| {
        ExprNode::equal(ExprNode::column(name), ExprNode::constant(value))
    };

    let compared = generic(ExprNode::equal(greater("a", 1), greater("b", 2)));
    let or_operand = generic(ExprNode::equal(
        ExprNode::or([equals("a", 1), equals("b", 2)]),
        ExprNode::constant(true),
    ));
    let between = generic(ExprNode::predicate(
        OperatorKind::Between,
        [greater("a", 1), ExprNode::constant(false), ExprNode::constant(true)],
    ));
    let in_list = generic(ExprNode::predicate(
        OperatorKind::In,
        [greater("a", 1), ExprNode::constant(true), equals("b", 2)],
    ));

    assert_eq!(accepted(&compared), "(a>1)=(b>2)");
    assert_eq!(accepted(&or_operand), "((a=1) OR (b=2))=TRUE");
    assert_eq!(accepted(&between), "(a>1) BETWEEN FALSE AND TRUE");
    assert_eq!(accepted(&in_list), "(a>1) IN (TRUE, (b=2))");
}

#[test]
fn scalar_literals_use_plain_forms() {
    let cases = [
        (Value::Bool(true), "c=TRUE"),
        (Value::Uint(7), "c=7"),
        (Value::Int(-3), "c=-3"),
        (Value::Decimal(Decimal::new(12_345, 2)), "c=123.45"),
        (Value::Float64(1.5), "c=1.5"),
    ];

    for (value, expected) in cases {
        let pushdown = generic(ExprNode::equal(
            ExprNode::column("c"),
            ExprNode::constant(value),
        ));
        assert_eq!(accepted(&pushdown), expected);
    }
}

#[test]
fn invalid_operator_declines_without_affecting_siblings() {
    let filters = [
        filter(ExprNode::equal(
            ExprNode::column("a"),
            ExprNode::constant(1i64),
        )),
        filter(ExprNode::predicate(
            OperatorKind::Invalid,
            [ExprNode::column("a")],
        )),
        filter(ExprNode::equal(
            ExprNode::column("b"),
            ExprNode::constant(2i64),
        )),
    ];

    let results = SqlCompiler::new(Dialect::GENERIC).compile_all(&filters);
    let wire: Vec<String> = results.iter().map(Pushdown::to_wire).collect();

    assert_eq!(wire, ["a=1", "", "b=2"]);
    assert_eq!(
        results[1],
        Pushdown::Declined(DeclineReason::UnsupportedOperator(OperatorKind::Invalid))
    );
}

#[test]
fn nested_invalid_declines_whole_filter() {
    let pushdown = generic(ExprNode::and([
        ExprNode::equal(ExprNode::column("a"), ExprNode::constant(1i64)),
        ExprNode::predicate(OperatorKind::Invalid, [ExprNode::column("b")]),
    ]));

    assert_eq!(
        pushdown,
        Pushdown::Declined(DeclineReason::UnsupportedOperator(OperatorKind::Invalid))
    );
    assert_eq!(pushdown.to_wire(), "");
}

#[test]
fn wrong_child_counts_decline() {
    let too_many = generic(ExprNode::predicate(
        OperatorKind::Equal,
        [
            ExprNode::column("a"),
            ExprNode::constant(1i64),
            ExprNode::constant(2i64),
        ],
    ));
    let single_and = generic(ExprNode::and([ExprNode::column("a")]));
    let bare_in = generic(ExprNode::predicate(
        OperatorKind::In,
        [ExprNode::column("a")],
    ));

    assert_eq!(
        too_many,
        Pushdown::Declined(DeclineReason::Arity {
            op: OperatorKind::Equal,
            found: 3
        })
    );
    assert!(matches!(
        single_and,
        Pushdown::Declined(DeclineReason::Arity { found: 1, .. })
    ));
    assert!(matches!(
        bare_in,
        Pushdown::Declined(DeclineReason::Arity { found: 1, .. })
    ));
}

#[test]
fn calendar_and_non_finite_constants_fail_closed() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date");

    let dated = generic(ExprNode::equal(
        ExprNode::column("d"),
        ExprNode::constant(Value::Date(date)),
    ));
    let nan = generic(ExprNode::equal(
        ExprNode::column("f"),
        ExprNode::constant(f64::NAN),
    ));

    assert_eq!(
        dated,
        Pushdown::Declined(DeclineReason::Literal(LiteralError::Unsupported {
            kind: ValueKind::Date
        }))
    );
    assert_eq!(
        nan,
        Pushdown::Declined(DeclineReason::Literal(LiteralError::NonFinite))
    );
}

#[test]
fn placeholders_render_markers_unless_type_has_no_literal() {
    let text = generic(ExprNode::equal(
        ExprNode::column("a"),
        ExprNode::placeholder(DataType::Utf8, 3),
    ));
    let stamp = generic(ExprNode::equal(
        ExprNode::column("a"),
        ExprNode::placeholder(DataType::Timestamp, 0),
    ));

    assert_eq!(accepted(&text), "a={3}");
    assert_eq!(
        stamp,
        Pushdown::Declined(DeclineReason::PlaceholderType {
            declared_type: DataType::Timestamp,
            param_index: 0
        })
    );
}

#[test]
fn mysql_quotes_identifiers_and_escapes_backslashes() {
    let pushdown = compile(
        &filter(ExprNode::equal(
            ExprNode::column("we`ird"),
            ExprNode::constant(r"C:\tmp"),
        )),
        Dialect::MYSQL,
    );

    assert_eq!(accepted(&pushdown), r"`we``ird`='C:\\tmp'");
}

#[test]
fn unquoted_dialect_declines_non_bare_identifiers() {
    let pushdown = generic(ExprNode::equal(
        ExprNode::column("a b"),
        ExprNode::constant(1i64),
    ));

    assert_eq!(
        pushdown,
        Pushdown::Declined(DeclineReason::Identifier {
            name: "a b".to_string()
        })
    );
}

#[test]
fn compile_records_outcomes() {
    metrics_reset_all();

    let _ = generic(ExprNode::equal(
        ExprNode::column("a"),
        ExprNode::constant(1i64),
    ));
    let _ = generic(ExprNode::predicate(
        OperatorKind::Invalid,
        [ExprNode::column("a")],
    ));

    let report = metrics_report();
    assert_eq!(report.ops.filters_offered, 2);
    assert_eq!(report.ops.filters_accepted, 1);
    assert_eq!(report.ops.filters_declined, 1);
}

//
// bind
//

#[test]
fn binding_substitutes_rendered_parameters() {
    let bound = bind_placeholders(
        "(a={0}) OR (b={1})",
        &[Value::from("x'y"), Value::Int(1_000_000)],
        Dialect::GENERIC,
    )
    .expect("bindable");

    assert_eq!(bound, "(a='x''y') OR (b=1000000)");
}

#[test]
fn binding_leaves_quoted_braces_alone() {
    let bound = bind_placeholders("a='{0}' AND b={0}", &[Value::Int(5)], Dialect::GENERIC)
        .expect("bindable");

    assert_eq!(bound, "a='{0}' AND b=5");
}

#[test]
fn binding_never_rescans_substituted_text() {
    let bound = bind_placeholders(
        "a={0} AND b={1}",
        &[Value::from("{1}"), Value::Int(2)],
        Dialect::GENERIC,
    )
    .expect("bindable");

    assert_eq!(bound, "a='{1}' AND b=2");
}

#[test]
fn binding_skips_quoted_identifiers() {
    let bound = bind_placeholders("`{0}`={0}", &[Value::Int(1)], Dialect::MYSQL).expect("bindable");

    assert_eq!(bound, "`{0}`=1");
}

#[test]
fn binding_errors() {
    let missing = bind_placeholders("a={2}", &[Value::Int(1)], Dialect::GENERIC)
        .expect_err("index past the end");
    let malformed =
        bind_placeholders("a={x}", &[], Dialect::GENERIC).expect_err("non-numeric marker");
    let unterminated =
        bind_placeholders("a='open", &[], Dialect::GENERIC).expect_err("open literal");
    let unrenderable = bind_placeholders("a={0}", &[Value::Binary(vec![1])], Dialect::GENERIC)
        .expect_err("binary parameter");

    assert_eq!(
        missing,
        CompileError::MissingParameter {
            index: 2,
            available: 1
        }
    );
    assert_eq!(malformed, CompileError::MalformedMarker { offset: 2 });
    assert_eq!(unterminated, CompileError::UnterminatedQuote { offset: 2 });
    assert_eq!(unrenderable.kind(), CompileErrorKind::UnrenderableParameter);
}

#[test]
fn top_level_or_detection_respects_parens_and_quotes() {
    assert!(has_top_level_or("(a=1) OR (b=2)", Dialect::GENERIC));
    assert!(!has_top_level_or("NOT ((a=1) OR (b=2))", Dialect::GENERIC));
    assert!(!has_top_level_or("c=' OR '", Dialect::GENERIC));
    assert!(!has_top_level_or("`x OR y`=1", Dialect::MYSQL));
}

//
// builder
//

#[test]
fn builds_projection_table_and_filter() {
    let sql = QueryBuilder::new(Dialect::GENERIC)
        .build("t", &["a", "b"], &["a>10"])
        .expect("valid");

    assert_eq!(sql, "SELECT a,b FROM t WHERE a>10");
}

#[test]
fn empty_projection_selects_constant() {
    let sql = QueryBuilder::new(Dialect::GENERIC)
        .build::<&str, &str>("t", &[], &[])
        .expect("valid");

    assert_eq!(sql, "SELECT 1 FROM t");
}

#[test]
fn mysql_builder_quotes_table_and_columns() {
    let sql = QueryBuilder::new(Dialect::MYSQL)
        .build("orders", &["id", "total"], &["`id`>1", "`total`<5"])
        .expect("valid");

    assert_eq!(
        sql,
        "SELECT `id`,`total` FROM `orders` WHERE `id`>1 AND `total`<5"
    );
}

#[test]
fn builder_groups_top_level_or_only_when_joining() {
    let builder = QueryBuilder::new(Dialect::GENERIC);

    let single = builder
        .build("t", &["a"], &["(a=1) OR (a=2)"])
        .expect("valid");
    let joined = builder
        .build("t", &["a"], &["(a=1) OR (a=2)", "b=3", "", "NOT ((c=1) OR (c=2))"])
        .expect("valid");

    assert_eq!(single, "SELECT a FROM t WHERE (a=1) OR (a=2)");
    assert_eq!(
        joined,
        "SELECT a FROM t WHERE ((a=1) OR (a=2)) AND b=3 AND NOT ((c=1) OR (c=2))"
    );
}

#[test]
fn builder_rejects_empty_table() {
    let err = QueryBuilder::new(Dialect::GENERIC)
        .build::<&str, &str>("", &[], &[])
        .expect_err("empty table");

    assert_eq!(err, QueryError::EmptyTable);
}

#[test]
fn build_bound_reports_failing_fragment_position() {
    let builder = QueryBuilder::new(Dialect::GENERIC);

    let sql = builder
        .build_bound("t", &["a"], &["a={0}", "b={1}"], &[Value::Int(1), Value::from("z")])
        .expect("bindable");
    let err = builder
        .build_bound("t", &["a"], &["a={0}", "b={1}"], &[Value::Int(1)])
        .expect_err("second marker unbound");

    assert_eq!(sql, "SELECT a FROM t WHERE a=1 AND b='z'");
    assert!(matches!(err, QueryError::Bind { position: 1, .. }));
}

proptest! {
    #[test]
    fn rendered_text_literals_reparse_to_original(text in any::<String>()) {
        let literal = render_literal(&Value::Text(text.clone()), Dialect::GENERIC)
            .expect("text always renders");

        prop_assert_eq!(reparse_literal(&literal), Some(text));
    }

    #[test]
    fn bound_text_parameters_reparse_to_original(text in any::<String>()) {
        let bound = bind_placeholders("{0}", &[Value::Text(text.clone())], Dialect::GENERIC)
            .expect("text always binds");

        prop_assert_eq!(reparse_literal(&bound), Some(text));
    }
}
