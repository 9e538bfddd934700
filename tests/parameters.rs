//! Tests for parameters built from source.

mod common;

use common::{create_extractor_with_known_types, create_test_extractor, parameter, params_of};
use phpantom_types::docblock::{StrictTypeError, StrictTypeValidator};
use phpantom_types::{Extractor, ExtractorConfig, PhpValue};

#[test]
fn union_doc_type_is_primary_and_strict() {
    let extractor = create_test_extractor();
    let src = r#"<?php
/**
 * @param int|string $x
 */
function f($x) {}
"#;
    let params = params_of(&extractor, src, "f");
    let x = &params[0];
    assert_eq!(x.name, "x");
    assert_eq!(x.types.type_from_doc_primary.as_deref(), Some("int|string"));
    assert_eq!(x.types.type_from_doc_strict.as_deref(), Some("int|string"));
    assert_eq!(x.get_type().as_deref(), Some("int|string"));
}

#[test]
fn declaration_fields() {
    let extractor = create_test_extractor();
    let src = "<?php\nfunction g(int $a, &$b, string ...$rest) {}\n";
    let params = params_of(&extractor, src, "g");
    assert_eq!(params.len(), 3);

    assert_eq!(params[0].name, "a");
    assert_eq!(params[0].get_type().as_deref(), Some("int"));
    assert!(!params[0].is_optional());

    assert_eq!(params[1].name, "b");
    assert!(params[1].is_passed_by_reference);
    assert_eq!(params[1].get_type(), None);

    assert_eq!(params[2].name, "rest");
    assert!(params[2].is_variadic);
    assert!(params[2].is_optional());
    assert_eq!(params[2].line, Some(2));
}

#[test]
fn default_value_does_not_leak_into_type() {
    let extractor = create_test_extractor();
    let src = "<?php\nfunction h(int|null $limit = null, $flag = false) {}\n";
    let params = params_of(&extractor, src, "h");

    let limit = &params[0];
    assert!(limit.has_default);
    assert_eq!(limit.default_value, Some(PhpValue::Null));
    assert_eq!(limit.type_from_literal_value(), Some("null"));
    assert_eq!(limit.get_type().as_deref(), Some("int|null"));

    let flag = &params[1];
    assert_eq!(flag.default_value, Some(PhpValue::Bool(false)));
    assert_eq!(flag.type_from_literal_value(), Some("bool"));
    assert_eq!(flag.get_type(), None);
}

#[test]
fn nullable_declaration_is_normalized() {
    let extractor = create_test_extractor();
    let params = params_of(&extractor, "<?php\nfunction n(?int $x) {}\n", "n");
    assert_eq!(params[0].types.raw_type_from_declaration.as_deref(), Some("?int"));
    assert_eq!(params[0].get_type().as_deref(), Some("null|int"));
}

#[test]
fn unevaluable_default_is_flagged_but_unset() {
    let extractor = create_test_extractor();
    let params = params_of(&extractor, "<?php\nfunction d($at = new DateTime()) {}\n", "d");
    assert!(params[0].has_default);
    assert_eq!(params[0].default_value, None);
    assert_eq!(params[0].type_from_literal_value(), None);
}

#[test]
fn declared_class_names_are_fully_qualified() {
    let extractor = create_test_extractor();
    let src = r#"<?php
namespace App\Http;

use App\Models\User;
use Psr\Log\LoggerInterface as Logger;

function handle(User $user, ?Logger $logger, Request $request, \DateTimeInterface $at, self|string $x) {}
"#;
    let params = params_of(&extractor, src, "App\\Http\\handle");
    let declared: Vec<_> = params
        .iter()
        .map(|p| p.types.raw_type_from_declaration.clone().unwrap_or_default())
        .collect();
    assert_eq!(
        declared,
        vec![
            "\\App\\Models\\User",
            "?\\Psr\\Log\\LoggerInterface",
            "\\App\\Http\\Request",
            "\\DateTimeInterface",
            "self|string",
        ]
    );
    assert_eq!(
        params[1].get_type().as_deref(),
        Some("null|\\Psr\\Log\\LoggerInterface")
    );
}

#[test]
fn strict_type_beats_declaration() {
    let extractor = create_test_extractor();
    let src = r#"<?php
/**
 * @param string $id
 * @psalm-param non-empty-string $id
 */
function find(string $id) {}
"#;
    let params = params_of(&extractor, src, "find");
    let id = &params[0];
    assert_eq!(id.types.raw_type_from_declaration.as_deref(), Some("string"));
    assert_eq!(id.types.type_from_doc_primary.as_deref(), Some("string"));
    assert_eq!(id.get_type().as_deref(), Some("non-empty-string"));
}

#[test]
fn phpstan_applies_when_psalm_names_another_parameter() {
    let extractor = create_test_extractor();
    let src = r#"<?php
/**
 * @psalm-param positive-int $count
 * @phpstan-param list<int> $ids
 */
function load(array $ids, int $count) {}
"#;
    let params = params_of(&extractor, src, "load");
    assert_eq!(params[0].get_type().as_deref(), Some("list<int>"));
    assert_eq!(params[1].get_type().as_deref(), Some("positive-int"));
}

#[test]
fn doc_tags_match_case_insensitively() {
    let extractor = create_test_extractor();
    let src = r#"<?php
/**
 * @param int $Foo The foo value
 */
function m($foo) {}
"#;
    let params = params_of(&extractor, src, "m");
    assert_eq!(params[0].types.type_from_doc_primary.as_deref(), Some("int"));
    assert_eq!(
        params[0].types.free_text_comment.as_deref(),
        Some("The foo value")
    );
}

#[test]
fn malformed_doc_comment_keeps_declaration() {
    let extractor = create_test_extractor();
    let src = r#"<?php
/**
 * @param array<int, string $items
 */
function broken(array $items) {}
"#;
    let params = params_of(&extractor, src, "broken");
    let items = &params[0];
    assert_eq!(items.parse_errors().len(), 1);
    assert!(items.parse_errors().messages().next().unwrap().starts_with("items: "));
    assert_eq!(items.types.type_from_doc_primary, None);
    assert_eq!(items.types.raw_type_from_declaration.as_deref(), Some("array"));
    assert_eq!(items.get_type().as_deref(), Some("array"));
}

#[test]
fn unbalanced_dialect_tag_spoils_the_whole_comment() {
    let extractor = create_test_extractor();
    let src = r#"<?php
/**
 * @param int $n
 * @phpstan-param int<0, $n
 */
function count_up(int $n) {}
"#;
    let params = params_of(&extractor, src, "count_up");
    let n = &params[0];
    assert_eq!(n.parse_errors().len(), 1);
    assert_eq!(n.types.type_from_doc_primary, None);
    assert_eq!(n.types.type_from_doc_strict, None);
    assert_eq!(n.get_type().as_deref(), Some("int"));
}

/// Rejects every expression.
struct RejectAll;

impl StrictTypeValidator for RejectAll {
    fn validate(&self, type_expr: &str) -> Result<String, StrictTypeError> {
        Err(StrictTypeError::Invalid {
            type_expr: type_expr.to_string(),
            message: "rejected".to_string(),
        })
    }
}

#[test]
fn strict_failure_falls_back_to_declaration() {
    let extractor = Extractor::default().with_validator(RejectAll);
    let src = r#"<?php
/**
 * @param positive-int $n
 * @psalm-param positive-int $n
 * @psalm-param positive-int $n
 */
function step(int $n) {}
"#;
    let params = params_of(&extractor, src, "step");
    let n = &params[0];
    assert_eq!(n.types.type_from_doc_strict, None);
    assert_eq!(n.types.type_from_doc_primary.as_deref(), Some("positive-int"));
    assert_eq!(n.get_type().as_deref(), Some("int"));
    assert_eq!(n.parse_errors().len(), 1);
}

#[test]
fn strict_dialects_can_be_disabled() {
    let extractor = Extractor::new(ExtractorConfig {
        strict_dialects: false,
        validate_primary_doc_type: false,
        ..ExtractorConfig::default()
    });
    let src = r#"<?php
/**
 * @param string $id
 * @psalm-param non-empty-string $id
 */
function find($id) {}
"#;
    let params = params_of(&extractor, src, "find");
    assert_eq!(params[0].types.type_from_doc_strict, None);
    assert_eq!(params[0].get_type().as_deref(), Some("string"));
}

#[test]
fn inherit_doc_is_detected() {
    let extractor = create_test_extractor();
    let src = r#"<?php
class Child extends Base
{
    /** {@inheritDoc} */
    public function run($job) {}

    /** @inheritdoc */
    public function stop($reason) {}

    /** Plain. */
    public function pause($seconds) {}
}
"#;
    let functions = extractor.extract_parameters(src);
    assert!(parameter(&functions, "Child::run", "job").is_inherit_doc);
    assert!(parameter(&functions, "Child::stop", "reason").is_inherit_doc);
    assert!(!parameter(&functions, "Child::pause", "seconds").is_inherit_doc);
}

#[test]
fn methods_closures_and_arrow_functions() {
    let extractor = create_test_extractor();
    let src = r#"<?php
namespace App;

interface Repo
{
    public function find(int $id);
}

class Service
{
    public function __construct(private Repo $repo) {}

    public function map(array $items)
    {
        return array_map(fn (int $item) => $item * 2, $items);
    }
}

/** @param string $name */
$greet = function ($name, $greeting = 'Hello') {
    return "$greeting $name";
};
"#;
    let functions = extractor.extract_parameters(src);
    let names: Vec<&str> = functions.iter().map(|f| f.function.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "App\\Repo::find",
            "App\\Service::__construct",
            "App\\Service::map",
            "{closure}",
            "{closure}",
        ]
    );

    let repo = parameter(&functions, "App\\Service::__construct", "repo");
    assert_eq!(repo.get_type().as_deref(), Some("\\App\\Repo"));

    let arrow = &functions[3].parameters[0];
    assert_eq!(arrow.name, "item");
    assert_eq!(arrow.get_type().as_deref(), Some("int"));

    let closure = &functions[4];
    assert_eq!(closure.parameters[0].get_type().as_deref(), Some("string"));
    assert_eq!(
        closure.parameters[1].default_value,
        Some(PhpValue::String("Hello".into()))
    );
}

#[test]
fn functions_guarded_by_if_are_found() {
    let extractor = create_test_extractor();
    let src = r#"<?php
if (!function_exists('helper')) {
    function helper(string $key) {}
}
"#;
    let functions = extractor.extract_parameters(src);
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].function, "helper");
}

#[test]
fn known_types_qualify_doc_types() {
    let extractor = create_extractor_with_known_types(&["Carbon\\Carbon"]);
    let src = r#"<?php
/** @param Carbon\Carbon|null $at */
function schedule($at) {}
"#;
    let params = params_of(&extractor, src, "schedule");
    assert_eq!(
        params[0].types.type_from_doc_primary.as_deref(),
        Some("\\Carbon\\Carbon|null")
    );
}

#[test]
fn parameter_names_are_never_empty() {
    let extractor = create_test_extractor();
    let sources = [
        "<?php\nfunction a($) {}\n",
        "<?php\nfunction b(int $, $c) {}\n",
        "<?php\nfunction c(int) {}\n",
        "<?php\nfunction d(... ) {}\n",
    ];
    let mut placeholders = Vec::new();
    for src in sources {
        for function in extractor.extract_parameters(src) {
            for param in &function.parameters {
                assert!(!param.name.is_empty(), "empty name in {src:?}");
                if param.name.starts_with("__invalid_parameter_") {
                    assert_eq!(param.get_type(), None);
                    assert_eq!(param.default_value, None);
                    assert_eq!(param.parse_errors().len(), 1);
                    assert!(
                        param
                            .parse_errors()
                            .messages()
                            .all(|m| m.ends_with("an expression is required at this position"))
                    );
                    placeholders.push(param.name.clone());
                }
            }
        }
    }
    assert!(
        !placeholders.is_empty(),
        "malformed parameters should produce placeholder names"
    );
    let mut unique = placeholders.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), placeholders.len());
}

#[test]
fn nameless_parameter_keeps_its_siblings() {
    let extractor = create_test_extractor();
    let functions = extractor.extract_parameters("<?php\nfunction b(int $, $c) {}\n");
    let b = functions
        .iter()
        .find(|f| f.function == "b")
        .expect("function b is extracted");
    assert!(
        b.parameters
            .iter()
            .any(|p| p.name.starts_with("__invalid_parameter_"))
    );
    assert!(b.parameters.iter().any(|p| p.name == "c"));
}

#[test]
fn group_imports_resolve_and_function_imports_do_not() {
    let extractor = create_test_extractor();
    let src = r#"<?php
namespace App;

use Vendor\{Http\Client, Log\Logger as Log, function Http\request};
use function Vendor\Util\Clock;

function send(Client $client, Log $log, Clock $clock) {}
"#;
    let params = params_of(&extractor, src, "App\\send");
    let declared: Vec<_> = params
        .iter()
        .map(|p| p.types.raw_type_from_declaration.clone().unwrap_or_default())
        .collect();
    assert_eq!(
        declared,
        vec!["\\Vendor\\Http\\Client", "\\Vendor\\Log\\Logger", "\\App\\Clock"]
    );
}
