//! Expression lowering: operator dispatch, conditionals, accesses, calls,
//! and the assignment/increment statement-vs-value forms.

mod common;

use common::*;
use tslua::ast::types::{ConstValue, DeclKind, Symbol, Ty};
use tslua::ast::{BinaryOp, Expr, ExprKind, ObjectProp, PostfixOp, Stmt, TemplateSpan, UnaryOp};
use tslua::ErrorKind;

fn num(name: &str) -> Expr {
    Expr::ident(name).with_ty(Ty::number())
}

fn string_ident(name: &str) -> Expr {
    Expr::ident(name).with_ty(Ty::string())
}

fn local_r(init: Expr) -> Vec<Stmt> {
    vec![Stmt::local("r", init)]
}

fn postfix(operand: Expr, op: PostfixOp) -> Expr {
    Expr::new(
        ExprKind::PostfixUnary {
            op,
            operand: Box::new(operand),
        },
        Ty::number(),
    )
}

fn prefix(operand: Expr, op: UnaryOp) -> Expr {
    Expr::new(
        ExprKind::PrefixUnary {
            op,
            operand: Box::new(operand),
        },
        Ty::number(),
    )
}

#[test]
fn test_addition_dispatches_on_operand_types() {
    let out = transpile(local_r(Expr::binary(BinaryOp::Plus, num("a"), num("b"))));
    assert_eq!(body(&out), "local r = a + b;\n");

    let out = transpile(local_r(Expr::binary(
        BinaryOp::Plus,
        string_ident("a"),
        num("b"),
    )));
    assert_eq!(body(&out), "local r = (a) .. b;\n");

    let out = transpile(local_r(Expr::binary(
        BinaryOp::Plus,
        Expr::ident("a"),
        Expr::ident("b"),
    )));
    assert_eq!(body(&out), "local r = TS.add(a, b);\n");
}

#[test]
fn test_bitwise_or_zero_is_round() {
    let out = transpile(local_r(Expr::binary(BinaryOp::Bar, num("n"), Expr::num(0.0))));
    assert_eq!(body(&out), "local r = TS.round(n);\n");

    let out = transpile(local_r(Expr::binary(BinaryOp::Bar, num("n"), num("m"))));
    assert_eq!(body(&out), "local r = TS.bor(n, m);\n");
}

#[test]
fn test_bitwise_helpers() {
    let out = transpile(local_r(Expr::binary(BinaryOp::Amp, num("n"), num("m"))));
    assert_eq!(body(&out), "local r = TS.band(n, m);\n");
    let out = transpile(local_r(Expr::binary(BinaryOp::LtLt, num("n"), Expr::num(2.0))));
    assert_eq!(body(&out), "local r = TS.blsh(n, 2);\n");
}

#[test]
fn test_loose_equality_rejected() {
    let err = transpile_err(local_r(Expr::binary(BinaryOp::EqEq, num("a"), num("b"))));
    assert_eq!(err.kind, ErrorKind::LooseEquality);
    let err = transpile_err(local_r(Expr::binary(BinaryOp::NotEq, num("a"), num("b"))));
    assert_eq!(err.kind, ErrorKind::LooseEquality);
}

#[test]
fn test_strict_equality_maps_to_native() {
    let out = transpile(local_r(Expr::binary(BinaryOp::EqEqEq, num("a"), num("b"))));
    assert_eq!(body(&out), "local r = a == b;\n");
    let out = transpile(local_r(Expr::binary(BinaryOp::NotEqEq, num("a"), num("b"))));
    assert_eq!(body(&out), "local r = a ~= b;\n");
}

#[test]
fn test_logical_operators() {
    let out = transpile(local_r(Expr::binary(
        BinaryOp::AmpAmp,
        Expr::ident("a"),
        Expr::ident("b"),
    )));
    assert_eq!(body(&out), "local r = a and b;\n");
    let out = transpile(local_r(Expr::binary(
        BinaryOp::BarBar,
        Expr::ident("a"),
        Expr::ident("b"),
    )));
    assert_eq!(body(&out), "local r = a or b;\n");
}

#[test]
fn test_in_operator() {
    let out = transpile(local_r(Expr::binary(
        BinaryOp::In,
        Expr::ident("k"),
        Expr::ident("obj"),
    )));
    assert_eq!(body(&out), "local r = obj[k] ~= nil;\n");
}

#[test]
fn test_instanceof_engine_type() {
    let rhs = Expr::ident("Part")
        .with_ty(Ty::named_with_bases("Part", vec![Ty::named("Rbx_Instance")]));
    let out = transpile(local_r(Expr::binary(BinaryOp::InstanceOf, Expr::ident("x"), rhs)));
    assert_eq!(body(&out), "local r = TS.isA(x, \"Part\");\n");
}

#[test]
fn test_instanceof_tagged_value_type() {
    let rhs = Expr::ident("Vector3").with_ty(Ty::named("Vector3"));
    let out = transpile(local_r(Expr::binary(BinaryOp::InstanceOf, Expr::ident("x"), rhs)));
    assert_eq!(body(&out), "local r = (TS.typeof(x) == \"Vector3\");\n");
}

#[test]
fn test_instanceof_fallback_helper() {
    let rhs = Expr::ident("Foo").with_ty(Ty::named("Foo"));
    let out = transpile(local_r(Expr::binary(BinaryOp::InstanceOf, Expr::ident("x"), rhs)));
    assert_eq!(body(&out), "local r = TS.instanceof(x, Foo);\n");
}

#[test]
fn test_conditional_direct_form() {
    let e = Expr::new(
        ExprKind::Conditional {
            cond: Box::new(Expr::ident("a")),
            when_true: Box::new(num("b")),
            when_false: Box::new(num("c")),
        },
        Ty::number(),
    );
    let out = transpile(local_r(e));
    assert_eq!(body(&out), "local r = (a and b or c);\n");
}

#[test]
fn test_conditional_thunked_for_boolean_branch() {
    // The true branch admits false-like values, so the direct and/or form
    // would mis-select.
    let e = Expr::new(
        ExprKind::Conditional {
            cond: Box::new(Expr::ident("a")),
            when_true: Box::new(Expr::ident("b").with_ty(Ty::boolean())),
            when_false: Box::new(Expr::ident("c").with_ty(Ty::boolean())),
        },
        Ty::boolean(),
    );
    let out = transpile(local_r(e));
    assert_eq!(
        body(&out),
        "local r = (a and function() return b end or function() return c end)();\n"
    );
}

#[test]
fn test_conditional_thunked_for_nullable_branch() {
    let nullable = Ty::Union(vec![Ty::number(), Ty::Undefined]);
    let e = Expr::new(
        ExprKind::Conditional {
            cond: Box::new(Expr::ident("a")),
            when_true: Box::new(Expr::ident("b").with_ty(nullable.clone())),
            when_false: Box::new(Expr::ident("c")),
        },
        nullable,
    );
    let out = transpile(local_r(e));
    assert_eq!(
        body(&out),
        "local r = (a and function() return b end or function() return c end)();\n"
    );
}

#[test]
fn test_typeof_and_await() {
    let out = transpile(local_r(Expr::new(
        ExprKind::TypeOf(Box::new(Expr::ident("x"))),
        Ty::string(),
    )));
    assert_eq!(body(&out), "local r = TS.typeof(x);\n");

    let out = transpile(local_r(Expr::new(
        ExprKind::Await(Box::new(Expr::ident("p"))),
        Ty::Any,
    )));
    assert_eq!(body(&out), "local r = TS.await(p);\n");
}

#[test]
fn test_spread_argument_unpacks() {
    let call = Expr::call(
        Expr::ident("f"),
        vec![Expr::new(
            ExprKind::Spread(Box::new(Expr::ident("args"))),
            Ty::Any,
        )],
    );
    let out = transpile(vec![Stmt::expr(call)]);
    assert_eq!(body(&out), "f(unpack(args));\n");
}

#[test]
fn test_template_expression() {
    let e = Expr::new(
        ExprKind::Template {
            head: "a".to_string(),
            spans: vec![TemplateSpan {
                expr: Expr::ident("x"),
                literal: "b".to_string(),
            }],
        },
        Ty::string(),
    );
    let out = transpile(local_r(e));
    assert_eq!(body(&out), "local r = \"a\" .. tostring(x) .. \"b\";\n");
}

#[test]
fn test_template_elides_empty_fragments() {
    let e = Expr::new(
        ExprKind::Template {
            head: String::new(),
            spans: vec![TemplateSpan {
                expr: Expr::ident("x"),
                literal: String::new(),
            }],
        },
        Ty::string(),
    );
    let out = transpile(local_r(e));
    assert_eq!(body(&out), "local r = tostring(x);\n");
}

#[test]
fn test_array_literal_flat() {
    let out = transpile(local_r(Expr::array(vec![
        Expr::num(1.0),
        Expr::num(2.0),
        Expr::num(3.0),
    ])));
    assert_eq!(body(&out), "local r = { 1, 2, 3 };\n");

    let out = transpile(local_r(Expr::array(vec![])));
    assert_eq!(body(&out), "local r = {};\n");
}

#[test]
fn test_array_literal_spread_concatenates_groups() {
    let out = transpile(local_r(Expr::array(vec![
        Expr::num(1.0),
        Expr::num(2.0),
        Expr::new(ExprKind::Spread(Box::new(Expr::ident("a"))), Ty::Any),
        Expr::num(3.0),
    ])));
    assert_eq!(
        body(&out),
        "local r = TS.array_concat({ 1, 2 }, a, { 3 });\n"
    );
}

#[test]
fn test_object_literal_keys() {
    let e = Expr::new(
        ExprKind::Object(vec![
            ObjectProp::KeyValue {
                key: "x".to_string(),
                value: Expr::num(1.0),
            },
            ObjectProp::KeyValue {
                key: "two words".to_string(),
                value: Expr::num(2.0),
            },
            ObjectProp::KeyValue {
                key: "3".to_string(),
                value: Expr::str("c"),
            },
        ]),
        Ty::Any,
    );
    let out = transpile(local_r(e));
    assert_eq!(
        body(&out),
        "local r = { x = 1, [\"two words\"] = 2, [3] = \"c\" };\n"
    );
}

#[test]
fn test_object_literal_spread_merges() {
    let spread_first = Expr::new(
        ExprKind::Object(vec![
            ObjectProp::Spread(Expr::ident("a")),
            ObjectProp::KeyValue {
                key: "x".to_string(),
                value: Expr::num(1.0),
            },
        ]),
        Ty::Any,
    );
    let out = transpile(local_r(spread_first));
    assert_eq!(body(&out), "local r = TS.Object_assign({}, a, { x = 1 });\n");

    let group_first = Expr::new(
        ExprKind::Object(vec![
            ObjectProp::KeyValue {
                key: "x".to_string(),
                value: Expr::num(1.0),
            },
            ObjectProp::Spread(Expr::ident("a")),
        ]),
        Ty::Any,
    );
    let out = transpile(local_r(group_first));
    assert_eq!(body(&out), "local r = TS.Object_assign({ x = 1 }, a);\n");
}

#[test]
fn test_undefined_is_nil() {
    let call = Expr::call(Expr::ident("f"), vec![Expr::ident("undefined")]);
    let out = transpile(vec![Stmt::expr(call)]);
    assert_eq!(body(&out), "f(nil);\n");
}

#[test]
fn test_runtime_globals_are_prefixed() {
    let out = transpile(local_r(Expr::ident("Promise")));
    assert_eq!(body(&out), "local r = TS.Promise;\n");
}

#[test]
fn test_reserved_identifier_rejected() {
    let err = transpile_err(local_r(Expr::ident("end")));
    assert_eq!(err.kind, ErrorKind::ReservedKeyword);
}

#[test]
fn test_null_rejected() {
    let err = transpile_err(local_r(Expr::new(ExprKind::Null, Ty::Any)));
    assert_eq!(err.kind, ErrorKind::NullLiteral);
}

#[test]
fn test_numeric_literal_notations() {
    let out = transpile(local_r(Expr::num_text("0x10")));
    assert_eq!(body(&out), "local r = 16;\n");
    let out = transpile(local_r(Expr::num_text("1e10")));
    assert_eq!(body(&out), "local r = 1e10;\n");
    let out = transpile(local_r(Expr::num_text("1.5")));
    assert_eq!(body(&out), "local r = 1.5;\n");
}

// =========================================================================
// Assignment and increment forms
// =========================================================================

#[test]
fn test_postfix_increment_statement_form() {
    let out = transpile(vec![Stmt::expr(postfix(num("x"), PostfixOp::PlusPlus))]);
    assert_eq!(body(&out), "x = x + 1;\n");
}

#[test]
fn test_postfix_increment_value_form() {
    let out = transpile(local_r(Expr::new(
        ExprKind::PostfixUnary {
            op: PostfixOp::PlusPlus,
            operand: Box::new(num("x")),
        },
        Ty::number(),
    )));
    assert_eq!(
        body(&out),
        "local r = (function() local _0 = x; x = x + 1; return _0; end)();\n"
    );
}

#[test]
fn test_prefix_increment_value_form() {
    let out = transpile(local_r(prefix(num("x"), UnaryOp::PlusPlus)));
    assert_eq!(
        body(&out),
        "local r = (function() x = x + 1; return x; end)();\n"
    );
}

#[test]
fn test_compound_assignment_property_evaluates_receiver_once() {
    let lhs = Expr::prop(Expr::ident("obj"), "count").with_ty(Ty::number());
    let assign = Expr::binary(BinaryOp::PlusAssign, lhs, Expr::num(1.0));
    let out = transpile(vec![Stmt::expr(assign)]);
    assert_eq!(
        body(&out),
        "local _0 = obj;\n_0.count = _0.count + 1;\n"
    );
}

#[test]
fn test_compound_assignment_element_captures_index() {
    let lhs = Expr::index(
        Expr::ident("arr").with_ty(Ty::array_of(Ty::number())),
        num("i"),
    )
    .with_ty(Ty::number());
    let assign = Expr::binary(BinaryOp::StarAssign, lhs, Expr::num(2.0));
    let out = transpile(vec![Stmt::expr(assign)]);
    assert_eq!(
        body(&out),
        "local _0 = arr;\nlocal _1 = i + 1;\n_0[_1] = _0[_1] * 2;\n"
    );
}

#[test]
fn test_simple_assignment_statement_and_value_forms() {
    let assign = Expr::binary(BinaryOp::Assign, Expr::ident("x"), Expr::num(5.0));
    let out = transpile(vec![Stmt::expr(assign.clone())]);
    assert_eq!(body(&out), "x = 5;\n");

    let out = transpile(local_r(assign));
    assert_eq!(
        body(&out),
        "local r = (function() x = 5; return x; end)();\n"
    );
}

#[test]
fn test_string_compound_append_concatenates() {
    let assign = Expr::binary(BinaryOp::PlusAssign, string_ident("s"), Expr::str("a"));
    let out = transpile(vec![Stmt::expr(assign)]);
    assert_eq!(body(&out), "s = (s) .. \"a\";\n");
}

// =========================================================================
// Element and property access
// =========================================================================

#[test]
fn test_array_index_offset() {
    let arr = Expr::ident("arr").with_ty(Ty::array_of(Ty::number()));
    let out = transpile(local_r(Expr::index(arr.clone(), num("i"))));
    assert_eq!(body(&out), "local r = arr[i + 1];\n");

    let out = transpile(local_r(Expr::index(arr, Expr::num(0.0))));
    assert_eq!(body(&out), "local r = arr[1];\n");
}

#[test]
fn test_tuple_call_index_selects() {
    let call = Expr::call(Expr::ident("f"), vec![])
        .with_ty(Ty::Tuple(vec![Ty::number(), Ty::string()]));
    let out = transpile(local_r(Expr::index(call, Expr::num(0.0))));
    assert_eq!(body(&out), "local r = (select(1, f()));\n");
}

#[test]
fn test_array_literal_receiver_parenthesized() {
    let lit = Expr::array(vec![Expr::num(1.0), Expr::num(2.0)]);
    let out = transpile(local_r(Expr::index(lit, Expr::num(0.0))));
    assert_eq!(body(&out), "local r = ({ 1, 2 })[1];\n");
}

#[test]
fn test_plain_object_index_is_raw() {
    let out = transpile(local_r(Expr::index(Expr::ident("obj"), Expr::ident("k"))));
    assert_eq!(body(&out), "local r = obj[k];\n");
}

#[test]
fn test_length_uses_length_operator() {
    let out = transpile(local_r(Expr::prop(string_ident("s"), "length")));
    assert_eq!(body(&out), "local r = #s;\n");

    let arr = Expr::ident("arr").with_ty(Ty::array_of(Ty::number()));
    let out = transpile(local_r(Expr::prop(arr, "length")));
    assert_eq!(body(&out), "local r = #arr;\n");
}

#[test]
fn test_prototype_access_rejected() {
    let class_symbol = Symbol::new("Foo", DeclKind::Class);
    let recv = Expr::ident("Foo").with_symbol(class_symbol);
    let err = transpile_err(local_r(Expr::prop(recv, "prototype")));
    assert_eq!(err.kind, ErrorKind::PrototypeAccess);
}

#[test]
fn test_indexing_function_value_rejected() {
    let fn_symbol = Symbol::new("f", DeclKind::Function);
    let recv = Expr::ident("f").with_symbol(fn_symbol);
    let err = transpile_err(local_r(Expr::prop(recv, "name")));
    assert_eq!(err.kind, ErrorKind::IndexingFunctionValue);
}

#[test]
fn test_const_enum_member_inlines() {
    let number_member = Symbol::new(
        "Red",
        DeclKind::EnumMember(Some(ConstValue::Number(2.0))),
    );
    let access = Expr::prop(Expr::ident("Color"), "Red").with_symbol(number_member);
    let out = transpile(local_r(access));
    assert_eq!(body(&out), "local r = 2;\n");

    let string_member = Symbol::new(
        "Red",
        DeclKind::EnumMember(Some(ConstValue::String("red".to_string()))),
    );
    let access = Expr::prop(Expr::ident("Color"), "Red").with_symbol(string_member);
    let out = transpile(local_r(access));
    assert_eq!(body(&out), "local r = \"red\";\n");
}

// =========================================================================
// Method-call classification
// =========================================================================

#[test]
fn test_array_method_routes_to_runtime() {
    let recv = Expr::ident("a").with_ty(Ty::array_of(Ty::number()));
    let call = Expr::call(Expr::prop(recv, "push"), vec![Expr::ident("v")]);
    let out = transpile(vec![Stmt::expr(call)]);
    assert_eq!(body(&out), "TS.array_push(a, v);\n");
}

#[test]
fn test_string_macro_method_uses_stdlib() {
    let call = Expr::call(
        Expr::prop(string_ident("s"), "sub"),
        vec![Expr::num(1.0), Expr::num(2.0)],
    );
    let out = transpile(vec![Stmt::expr(call)]);
    assert_eq!(body(&out), "string.sub(s, 1, 2);\n");
}

#[test]
fn test_string_non_macro_method_routes_to_runtime() {
    let call = Expr::call(Expr::prop(string_ident("s"), "split"), vec![Expr::str(",")]);
    let out = transpile(vec![Stmt::expr(call)]);
    assert_eq!(body(&out), "TS.string_split(s, \",\");\n");
}

#[test]
fn test_promise_then_becomes_and_then() {
    let recv = Expr::ident("p").with_ty(Ty::named("Promise"));
    let call = Expr::call(Expr::prop(recv, "then"), vec![Expr::ident("cb")]);
    let out = transpile(vec![Stmt::expr(call)]);
    assert_eq!(body(&out), "p:andThen(cb);\n");
}

#[test]
fn test_symbol_for_becomes_get_for() {
    let call = Expr::call(
        Expr::prop(Expr::ident("Symbol"), "for"),
        vec![Expr::str("a")],
    );
    let out = transpile(vec![Stmt::expr(call)]);
    assert_eq!(body(&out), "TS.Symbol.getFor(\"a\");\n");
}

#[test]
fn test_map_and_set_methods_route_to_runtime() {
    let map = Expr::ident("m").with_ty(Ty::named("Map"));
    let call = Expr::call(Expr::prop(map, "get"), vec![Expr::ident("k")]);
    let out = transpile(vec![Stmt::expr(call)]);
    assert_eq!(body(&out), "TS.map_get(m, k);\n");

    let set = Expr::ident("s").with_ty(Ty::named("WeakSet"));
    let call = Expr::call(Expr::prop(set, "add"), vec![Expr::ident("v")]);
    let out = transpile(vec![Stmt::expr(call)]);
    assert_eq!(body(&out), "TS.set_add(s, v);\n");
}

#[test]
fn test_object_constructor_methods() {
    let call = Expr::call(
        Expr::prop(Expr::ident("Object"), "keys"),
        vec![Expr::ident("o")],
    );
    let out = transpile(vec![Stmt::expr(call)]);
    assert_eq!(body(&out), "TS.Object_keys(o);\n");
}

#[test]
fn test_math_macro_inlines_and_rejects_statement_position() {
    let v = Expr::ident("v").with_ty(Ty::named("Vector3"));
    let call = Expr::call(Expr::prop(v.clone(), "add"), vec![Expr::ident("w")]);
    let out = transpile(local_r(call.clone()));
    assert_eq!(body(&out), "local r = (v + w);\n");

    let err = transpile_err(vec![Stmt::expr(call)]);
    assert_eq!(err.kind, ErrorKind::MathMacroStatement);
}

#[test]
fn test_method_symbol_uses_colon_call() {
    let method = Symbol::new("run", DeclKind::Method);
    let callee = Expr::prop(Expr::ident("obj"), "run").with_symbol(method);
    let out = transpile(vec![Stmt::expr(Expr::call(callee, vec![Expr::num(1.0)]))]);
    assert_eq!(body(&out), "obj:run(1);\n");
}

#[test]
fn test_non_method_callee_uses_dot_call() {
    let callee = Expr::prop(Expr::ident("obj"), "run");
    let out = transpile(vec![Stmt::expr(Expr::call(callee, vec![Expr::num(1.0)]))]);
    assert_eq!(body(&out), "obj.run(1);\n");
}

#[test]
fn test_new_expressions() {
    let out = transpile(local_r(Expr::new(
        ExprKind::New {
            callee: Box::new(Expr::ident("Foo")),
            args: Some(vec![Expr::num(1.0)]),
        },
        Ty::named("Foo"),
    )));
    assert_eq!(body(&out), "local r = Foo.new(1);\n");

    let out = transpile(local_r(Expr::new(
        ExprKind::New {
            callee: Box::new(Expr::ident("Array")),
            args: Some(vec![]),
        },
        Ty::array_of(Ty::Any),
    )));
    assert_eq!(body(&out), "local r = {};\n");

    let out = transpile(local_r(Expr::new(
        ExprKind::New {
            callee: Box::new(Expr::ident("Map")),
            args: Some(vec![]),
        },
        Ty::named("Map"),
    )));
    assert_eq!(body(&out), "local r = TS.map_new();\n");
}

#[test]
fn test_new_without_parentheses_rejected() {
    let err = transpile_err(local_r(Expr::new(
        ExprKind::New {
            callee: Box::new(Expr::ident("Foo")),
            args: None,
        },
        Ty::named("Foo"),
    )));
    assert_eq!(err.kind, ErrorKind::NewWithoutParentheses);
}

#[test]
fn test_not_and_negate() {
    let out = transpile(local_r(Expr::new(
        ExprKind::PrefixUnary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::ident("a")),
        },
        Ty::boolean(),
    )));
    assert_eq!(body(&out), "local r = not a;\n");

    let inner = Expr::binary(BinaryOp::Plus, num("a"), num("b"));
    let out = transpile(local_r(Expr::new(
        ExprKind::PrefixUnary {
            op: UnaryOp::Minus,
            operand: Box::new(inner),
        },
        Ty::number(),
    )));
    assert_eq!(body(&out), "local r = -(a + b);\n");
}

#[test]
fn test_unsupported_prefix_operators_rejected() {
    let err = transpile_err(local_r(prefix(num("x"), UnaryOp::Tilde)));
    assert_eq!(err.kind, ErrorKind::BadPrefixOperator);
}
