//! Parser benchmarks using criterion.
//!
//! Run with: cargo bench --bench parser_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use iborb_idl::parser::Parser;

/// Definition-heavy input exercising every construct.
const KITCHEN_SINK: &str = r#"
module Bench {
    const long WIDTH = 4 * (8 + 2);
    const double RATIO = 1.5;

    enum Mode { IDLE, ACTIVE, CLOSED };

    typedef octet UUID[16];
    typedef sequence<string> Lines;

    struct Header {
        UUID id;
        unsigned long long stamp;
        string<64> origin;
    };

    union Body switch (Mode) {
        case IDLE: long heartbeat;
        case ACTIVE: Lines content;
        default: boolean flag;
    };

    exception Rejected {
        string reason;
        long code;
    };

    interface Sink {
        readonly attribute Mode mode;
        attribute string label;
        void push(in Header h, in Body b) raises (Rejected);
        long drain(out Lines collected);
    };
};
"#;

/// Constant-expression folding stress.
const CONST_HEAVY: &str = r#"
const long A = 1 << 10;
const long B = A | 0xFF & 0x3C ^ 3;
const long C = -(B * 3 % 7) + (A / 4);
const long D = ~C;
"#;

fn parse(source: &str) -> usize {
    let mut parser = Parser::new(source, "bench.idl");
    let unit = parser.parse();
    unit.definitions.len()
}

fn bench_parser(c: &mut Criterion) {
    c.bench_function("parse_kitchen_sink", |b| {
        b.iter(|| parse(black_box(KITCHEN_SINK)))
    });

    c.bench_function("parse_const_folding", |b| {
        b.iter(|| parse(black_box(CONST_HEAVY)))
    });

    let big = KITCHEN_SINK.repeat(32).replace("module Bench", "module Big");
    c.bench_function("parse_repeated_32x", |b| b.iter(|| parse(black_box(&big))));
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);
