// Helper macro to distinguish between patterns and expressions
#[macro_export]
macro_rules! assert_case {
    // Guard patterns - patterns with if conditions
    ($result:expr, { $pattern:pat if $guard:expr }) => {
        match $result {
            $pattern if $guard => {},
            other => panic!("Expected {} if {} but got {:?}", stringify!($pattern), stringify!($guard), other),
        }
    };

    ($result:expr, { Ok($($pattern:tt)*) }) => {
        match $result {
            Ok($($pattern)*) => {},
            other => panic!("Expected Ok({}) but got {:#?}", stringify!($($pattern)*), other),
        }
    };

    ($result:expr, { Err($($pattern:tt)*) }) => {
        match $result {
            Err($($pattern)*) => {},
            other => panic!("Expected Err({}) but got {:#?}", stringify!($($pattern)*), other),
        }
    };

    // Default case - treat as expression for equality comparison
    ($result:expr, { $expected:expr }) => {
        match $result {
            Ok(actual) => {
                pretty_assertions::assert_eq!($expected, actual, "Expected {:#?} but got {:#?}\n\n< expected / got >", $expected, actual);
            },
            other => panic!("Expected Ok(...) but got {:?}", other),
        }
    };
}

// Helper macro to generate test functions based on field names
#[macro_export]
macro_rules! handle_case {
    // Evaluates the decoded rule against `scope()` from the enclosing test file.
    ([$($attrs:meta)*] value, $expected:tt) => {
        $(#[$attrs])*
        #[test]
        fn validate_value() {
            let rule = gon::decode(input(), &gon::default_codex()).unwrap();
            let result = scope().compute(&rule);
            assert_case!(result, $expected);
        }
    };

    // Evaluation failure, compared through its display text.
    ([$($attrs:meta)*] eval_error, $expected:tt) => {
        $(#[$attrs])*
        #[test]
        fn validate_eval_error() {
            let rule = gon::decode(input(), &gon::default_codex()).unwrap();
            let err = match scope().compute(&rule) {
                Err(e) => e.to_string(),
                Ok(value) => panic!("Expected evaluation error, got {value:?}"),
            };
            let result: Result<&str, ()> = Ok(err.as_str());
            assert_case!(result, $expected);
        }
    };

    ([$($attrs:meta)*] compact, $expected:tt) => {
        $(#[$attrs])*
        #[test]
        fn validate_compact() {
            let rule = gon::decode(input(), &gon::default_codex()).unwrap();
            let encoded = gon::to_string(&rule, &gon::EncodeOptions::default().compact());
            let result = encoded.as_ref().map(|s| s.as_str());
            assert_case!(result, $expected);

            // The encoded text must decode back to the same tree.
            let again = gon::decode(encoded.as_ref().unwrap(), &gon::default_codex()).unwrap();
            pretty_assertions::assert_eq!(rule, again);
        }
    };

    ([$($attrs:meta)*] error, $expected:tt) => {
        $(#[$attrs])*
        #[test]
        fn validate_error() {
            // Normalize by stripping trailing whitespace from each line
            fn normalize(s: &str) -> String {
                s.lines()
                    .map(|line| line.trim_end())
                    .collect::<Vec<_>>()
                    .join("\n")
                    + "\n"
            }

            let err = match gon::decode(input(), &gon::default_codex()) {
                Err(e) => e,
                Ok(rule) => panic!("Expected decode error, got {rule:?}"),
            };
            let mut buf = Vec::new();
            let config = gon::RenderConfig {
                color: false,
                charset: gon::CharSet::Ascii,
                ..Default::default()
            };
            gon::render_error_to(&err, input(), &mut buf, &config).unwrap();
            let err_string = String::from_utf8_lossy(&buf).into_owned();
            let normalized = normalize(&err_string);

            let result: Result<&str, ()> = Ok(normalized.as_str());
            assert_case!(result, $expected);
        }
    };

    // Generic case for unknown field names
    ([$($attrs:meta)*] $field_name:ident, $expected:tt) => {
        compile_error!(concat!("Unknown test case field: ", stringify!($field_name)));
    };
}

// Helper macro to recursively parse assertion fields
#[macro_export]
macro_rules! parse_assertions {
    // Base case: no more fields to parse
    (@parse [$($test_functions:tt)*]) => {
        $($test_functions)*
    };

    (@parse [$($test_functions:tt)*] $(#[$attr:meta])* $field_name:ident: $field_value:tt, $($rest:tt)*) => {
        parse_assertions! {@parse [
            $($test_functions)*
            handle_case! {[$($attr)*] $field_name, $field_value}
        ] $($rest)*}
    };
}

// Main macro - name first, input second, then any order for assertions
#[macro_export]
macro_rules! test_case {
    (
        name: $name:ident,
        input: $input:expr,
        $($assertion_fields:tt)*
    ) => {
        mod $name {
            #![allow(unused_imports, dead_code)]

            use super::*;

            fn input() -> &'static str {
                $input
            }

            // Generate all test functions
            parse_assertions! {@parse [] $($assertion_fields)*}
        }
    };
}
