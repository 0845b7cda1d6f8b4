use criterion::{Criterion, black_box, criterion_group, criterion_main};
use formscript::Context;

fn bench_loop(c: &mut Criterion) {
    let code = r#"
        var sum = 0;
        for (var i = 0; i < 10000; i = i + 1) {
            sum = sum + i;
        }
    "#;

    c.bench_function("loop 10k", |b| {
        b.iter(|| {
            let ctx = Context::new();
            ctx.eval_statements(code, "bench").unwrap();
            black_box(ctx.get("sum").unwrap())
        })
    });
}

fn bench_call_chain(c: &mut Criterion) {
    // Recursion stays well under the default call depth
    let code = r#"
        function fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        var result = fib(15);
    "#;

    c.bench_function("fib_rec 15", |b| {
        b.iter(|| {
            let ctx = Context::new();
            ctx.eval_statements(code, "bench").unwrap();
            black_box(ctx.get("result").unwrap())
        })
    });
}

fn bench_string_build(c: &mut Criterion) {
    let code = r#"
        var s = '';
        var i = 0;
        while (i < 500) {
            s += 'item ' + i + ';';
            i++;
        }
        var parts = s.split(';');
    "#;

    c.bench_function("string_build 500", |b| {
        b.iter(|| {
            let ctx = Context::new();
            ctx.eval_statements(code, "bench").unwrap();
            black_box(ctx.get("parts").unwrap())
        })
    });
}

fn bench_expression(c: &mut Criterion) {
    let ctx = Context::new();
    ctx.eval_statements("var a = 3; var b = 4;", "bench").unwrap();

    c.bench_function("expression", |b| {
        b.iter(|| black_box(ctx.eval_expression("(a * a + b * b) / 5 - 1 == 4 && a < b", "bench").unwrap()))
    });
}

criterion_group!(
    benches,
    bench_loop,
    bench_call_chain,
    bench_string_build,
    bench_expression
);
criterion_main!(benches);
