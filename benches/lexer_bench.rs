//! Lexer benchmarks using criterion.
//!
//! Run with: cargo bench --bench lexer_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use iborb_idl::lexer::{Lexer, TokenKind};

/// A representative IDL interface for throughput measurement.
const ECHO_IDL: &str = r#"
module Example {
    const long MAX_CLIENTS = 64;

    enum Status { OK, DEGRADED, DOWN };

    struct Request {
        string payload;
        sequence<octet> attachment;
        unsigned long long timestamp;
    };

    exception ServiceDown {
        string reason;
    };

    interface Echo {
        readonly attribute Status health;
        string echo(in string msg) raises (ServiceDown);
        oneway void fire(in Request req);
    };
};
"#;

fn lex_to_eof(source: &str) -> usize {
    let mut lexer = Lexer::new(source, "bench.idl");
    let mut count = 0;
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            break;
        }
        count += 1;
    }
    count
}

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    group.throughput(Throughput::Bytes(ECHO_IDL.len() as u64));
    group.bench_function("echo_interface", |b| {
        b.iter(|| lex_to_eof(black_box(ECHO_IDL)))
    });

    let large: String = ECHO_IDL.repeat(64).replace("module Example", "module Big");
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("repeated_64x", |b| b.iter(|| lex_to_eof(black_box(&large))));

    group.finish();
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);
