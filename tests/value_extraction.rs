//! Tests for literal value extraction, driven through constant and
//! parameter-default declarations.

mod common;

use common::{constant, create_test_extractor, params_of};
use phpantom_types::{ArrayKey, ConstantLookup, Extractor, PhpValue};

fn value_of(php_expr: &str) -> Option<PhpValue> {
    let extractor = create_test_extractor();
    let src = format!("<?php\nconst SUBJECT = {php_expr};\n");
    let constants = extractor.extract_constants(&src);
    constant(&constants, "SUBJECT").value.clone()
}

fn str_value(s: &str) -> PhpValue {
    PhpValue::String(s.to_string())
}

#[test]
fn scalars() {
    assert_eq!(value_of("null"), Some(PhpValue::Null));
    assert_eq!(value_of("NULL"), Some(PhpValue::Null));
    assert_eq!(value_of("true"), Some(PhpValue::Bool(true)));
    assert_eq!(value_of("False"), Some(PhpValue::Bool(false)));
    assert_eq!(value_of("42"), Some(PhpValue::Int(42)));
    assert_eq!(value_of("0x1F"), Some(PhpValue::Int(31)));
    assert_eq!(value_of("0b101"), Some(PhpValue::Int(5)));
    assert_eq!(value_of("1_000_000"), Some(PhpValue::Int(1_000_000)));
    assert_eq!(value_of("3.14"), Some(PhpValue::Float(3.14)));
    assert_eq!(value_of("1e3"), Some(PhpValue::Float(1000.0)));
    assert_eq!(value_of("'single'"), Some(str_value("single")));
    assert_eq!(value_of("\"double\""), Some(str_value("double")));
}

#[test]
fn negation_and_plus() {
    assert_eq!(value_of("-5"), Some(PhpValue::Int(-5)));
    assert_eq!(value_of("-2.5"), Some(PhpValue::Float(-2.5)));
    assert_eq!(value_of("+7"), Some(PhpValue::Int(7)));
    assert_eq!(value_of("-(3)"), Some(PhpValue::Int(-3)));
}

#[test]
fn negating_a_string_is_not_evaluated() {
    assert_eq!(value_of("-'abc'"), None);
}

#[test]
fn concatenation() {
    assert_eq!(value_of("'a' . 'b' . 'c'"), Some(str_value("abc")));
    assert_eq!(value_of("'v' . 2"), Some(str_value("v2")));
    assert_eq!(value_of("'x' . 1.5"), Some(str_value("x1.5")));
    assert_eq!(value_of("'on:' . true"), Some(str_value("on:1")));
}

#[test]
fn arithmetic_and_bitwise() {
    assert_eq!(value_of("60 * 60 * 24"), Some(PhpValue::Int(86_400)));
    assert_eq!(value_of("10 - 3"), Some(PhpValue::Int(7)));
    assert_eq!(value_of("1 + 0.5"), Some(PhpValue::Float(1.5)));
    assert_eq!(value_of("10 / 4"), Some(PhpValue::Float(2.5)));
    assert_eq!(value_of("10 / 5"), Some(PhpValue::Int(2)));
    assert_eq!(value_of("1 / 0"), None);
    assert_eq!(value_of("1 | 4"), Some(PhpValue::Int(5)));
    assert_eq!(value_of("7 & 2"), Some(PhpValue::Int(2)));
}

#[test]
fn list_arrays_get_sequential_keys() {
    assert_eq!(
        value_of("[1, 'two', null]"),
        Some(PhpValue::Array(vec![
            (ArrayKey::Int(0), PhpValue::Int(1)),
            (ArrayKey::Int(1), str_value("two")),
            (ArrayKey::Int(2), PhpValue::Null),
        ]))
    );
    assert_eq!(value_of("array()"), Some(PhpValue::Array(vec![])));
}

#[test]
fn keyed_arrays_follow_php_key_rules() {
    assert_eq!(
        value_of("[5 => 'a', 'b', '7' => 'c', 'd', 'k' => 'e', '08' => 'f']"),
        Some(PhpValue::Array(vec![
            (ArrayKey::Int(5), str_value("a")),
            (ArrayKey::Int(6), str_value("b")),
            (ArrayKey::Int(7), str_value("c")),
            (ArrayKey::Int(8), str_value("d")),
            (ArrayKey::String("k".into()), str_value("e")),
            (ArrayKey::String("08".into()), str_value("f")),
        ]))
    );
}

#[test]
fn repeated_keys_overwrite_in_place() {
    assert_eq!(
        value_of("array('a' => 1, 'b' => 2, 'a' => 3)"),
        Some(PhpValue::Array(vec![
            (ArrayKey::String("a".into()), PhpValue::Int(3)),
            (ArrayKey::String("b".into()), PhpValue::Int(2)),
        ]))
    );
}

#[test]
fn nested_arrays_and_spread() {
    assert_eq!(
        value_of("['x' => [1], ...[2, 3]]"),
        Some(PhpValue::Array(vec![
            (
                ArrayKey::String("x".into()),
                PhpValue::Array(vec![(ArrayKey::Int(0), PhpValue::Int(1))])
            ),
            (ArrayKey::Int(0), PhpValue::Int(2)),
            (ArrayKey::Int(1), PhpValue::Int(3)),
        ]))
    );
}

#[test]
fn one_unevaluable_element_spoils_the_array() {
    assert_eq!(value_of("[1, time()]"), None);
}

#[test]
fn unevaluable_expressions_yield_no_value() {
    assert_eq!(value_of("time()"), None);
    assert_eq!(value_of("UNDEFINED_THING"), None);
    assert_eq!(value_of("$x"), None);
    assert_eq!(value_of("new Foo()"), None);
    assert_eq!(value_of("Missing::CONSTANT"), None);
}

#[test]
fn sentinel_is_distinct_from_null() {
    let extractor = create_test_extractor();
    let constants = extractor.extract_constants("<?php\nconst A = null;\nconst B = rand();\n");
    let a = constant(&constants, "A");
    let b = constant(&constants, "B");
    assert_eq!(a.value, Some(PhpValue::Null));
    assert_eq!(a.type_from_literal_value(), Some("null"));
    assert_eq!(b.value, None);
    assert_eq!(b.type_from_literal_value(), None);
}

#[test]
fn builtin_constants() {
    assert_eq!(value_of("PHP_EOL"), Some(str_value("\n")));
    assert_eq!(value_of("PHP_INT_MAX"), Some(PhpValue::Int(i64::MAX)));
    assert_eq!(value_of("\\PHP_INT_SIZE"), Some(PhpValue::Int(8)));
    assert_eq!(value_of("E_ALL"), Some(PhpValue::Int(32767)));
    assert_eq!(
        value_of("DIRECTORY_SEPARATOR . 'tmp'"),
        Some(str_value("/tmp"))
    );
}

#[test]
fn earlier_constants_are_visible() {
    let extractor = create_test_extractor();
    let src = r#"<?php
namespace App;

const BASE = '/srv';
const LOGS = BASE . '/logs';

class Paths
{
    const ROOT = '/';
    const CACHE = self::ROOT . 'cache';
    const ALL = [self::ROOT, self::CACHE, \App\LOGS];
}
"#;
    let constants = extractor.extract_constants(src);
    assert_eq!(
        constant(&constants, "\\App\\LOGS").value,
        Some(str_value("/srv/logs"))
    );
    assert_eq!(constant(&constants, "CACHE").value, Some(str_value("/cache")));
    assert_eq!(
        constant(&constants, "ALL").value,
        Some(PhpValue::Array(vec![
            (ArrayKey::Int(0), str_value("/")),
            (ArrayKey::Int(1), str_value("/cache")),
            (ArrayKey::Int(2), str_value("/srv/logs")),
        ]))
    );
}

#[test]
fn class_name_and_magic_constants() {
    let extractor = create_test_extractor();
    let src = r#"<?php
namespace App\Http;

use App\Models\User;

class Controller
{
    const MODEL = User::class;
    const SELF = self::class;
    const NAME = __CLASS__;
    const NS = __NAMESPACE__;
}
"#;
    let constants = extractor.extract_constants(src);
    assert_eq!(
        constant(&constants, "MODEL").value,
        Some(str_value("App\\Models\\User"))
    );
    assert_eq!(
        constant(&constants, "SELF").value,
        Some(str_value("App\\Http\\Controller"))
    );
    assert_eq!(
        constant(&constants, "NAME").value,
        Some(str_value("App\\Http\\Controller"))
    );
    assert_eq!(constant(&constants, "NS").value, Some(str_value("App\\Http")));
}

#[test]
fn parent_constants_resolve_within_the_file() {
    let extractor = create_test_extractor();
    let src = r#"<?php
class Base
{
    const PREFIX = 'base_';
}

class Child extends Base
{
    const KEY = parent::PREFIX . 'child';
}
"#;
    let constants = extractor.extract_constants(src);
    assert_eq!(
        constant(&constants, "KEY").value,
        Some(str_value("base_child"))
    );
}

struct Vendor;

impl ConstantLookup for Vendor {
    fn class_constant(&self, class: &str, name: &str) -> Option<PhpValue> {
        (class == "Vendor\\Http" && name == "TIMEOUT").then_some(PhpValue::Int(30))
    }

    fn global_constant(&self, name: &str) -> Option<PhpValue> {
        (name == "VENDOR_MODE").then(|| str_value("strict"))
    }
}

#[test]
fn external_lookup_resolves_foreign_constants() {
    let extractor = Extractor::default().with_constant_lookup(Vendor);
    let src = r#"<?php
use Vendor\Http;

function connect($timeout = Http::TIMEOUT * 2, $mode = VENDOR_MODE, $other = Http::OTHER) {}
"#;
    let params = params_of(&extractor, src, "connect");
    assert_eq!(params[0].default_value, Some(PhpValue::Int(60)));
    assert_eq!(params[1].default_value, Some(str_value("strict")));
    assert!(params[2].has_default);
    assert_eq!(params[2].default_value, None);
}

#[test]
fn overflowing_division_stays_local_to_its_constant() {
    let extractor = create_test_extractor();
    let src = "<?php\nconst A = 1;\nconst B = PHP_INT_MIN / -1;\nconst C = 'c';\n";
    let constants = extractor.extract_constants(src);
    let names: Vec<&str> = constants.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    assert_eq!(
        constant(&constants, "B").value,
        Some(PhpValue::Float(9_223_372_036_854_775_808.0))
    );
    assert_eq!(value_of("PHP_INT_MIN / 1"), Some(PhpValue::Int(i64::MIN)));
}

#[test]
fn oversized_integer_literals_respect_their_radix() {
    // 2^64 written in octal, legacy and explicit.
    assert_eq!(
        value_of("02000000000000000000000"),
        Some(PhpValue::Float(18_446_744_073_709_551_616.0))
    );
    assert_eq!(
        value_of("0o2000000000000000000000"),
        Some(PhpValue::Float(18_446_744_073_709_551_616.0))
    );
    assert_eq!(
        value_of("0x10000000000000000"),
        Some(PhpValue::Float(18_446_744_073_709_551_616.0))
    );
    assert_eq!(
        value_of("18446744073709551616"),
        Some(PhpValue::Float(18_446_744_073_709_551_616.0))
    );
}

#[test]
fn unary_plus_only_applies_to_numbers() {
    assert_eq!(value_of("+2.5"), Some(PhpValue::Float(2.5)));
    assert_eq!(value_of("+'abc'"), None);
}
