#![allow(dead_code)]
use std::path::Path;

use ministack::ast::Node;
use ministack::parser;
use test_support::bench_cases;

/// `(case name, source)` for every fixture tagged with `tag`.
pub fn workloads(tag: &str) -> Vec<(String, String)> {
    bench_cases(Path::new("tests/programs"), tag)
        .unwrap_or_else(|err| panic!("load bench cases: {err:#}"))
        .into_iter()
        .map(|case| {
            let source = case
                .read_source()
                .unwrap_or_else(|err| panic!("read {}: {err:#}", case.name));
            (case.name, source)
        })
        .collect()
}

pub fn load_program(label: &str, source: &str) -> Node {
    parser::parse(source).unwrap_or_else(|err| panic!("parse {label}: {err}"))
}
