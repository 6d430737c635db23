use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use splice_core::indent::indentation_unit;
use splice_core::{Converter, ParseTree, SyntaxKind, Tree, TreeBuilder, python};
use std::hint::black_box;

/// `count` import lines and the matching parse tree
fn imports(count: usize) -> (String, ParseTree) {
    let mut source = String::new();
    let mut statements = Vec::with_capacity(count);
    for i in 0..count {
        let start = source.len();
        source.push_str(&format!("import module_{i}\n"));
        let stop = source.len() - 1;
        statements.push(ParseTree::node(
            "import_statement",
            start,
            stop,
            vec![
                ParseTree::leaf("import", start, start + 6),
                ParseTree::leaf("dotted_name", start + 7, stop),
            ],
        ));
    }
    let list = ParseTree::node("import_list", 0, source.len(), statements);
    let tree = ParseTree::node("module", 0, source.len(), vec![list]);
    (source, tree)
}

fn import_tree(count: usize) -> Tree {
    let (source, parse_tree) = imports(count);
    Converter::new(python())
        .convert(&source, &parse_tree)
        .expect("benchmark source converts")
}

/// Benchmark parse-tree conversion, which includes the stream build
fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    for &size in &[10, 100, 1000] {
        let (source, parse_tree) = imports(size);
        let converter = Converter::new(python());
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{size}_imports")),
            &size,
            |b, _| b.iter(|| black_box(converter.convert(&source, &parse_tree))),
        );
    }
    group.finish();
}

/// Benchmark one insert and its removal; each edit recomputes the stream
fn bench_insert_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_remove");
    for &size in &[10, 100, 1000] {
        let tree = import_tree(size);
        let list = tree.find(SyntaxKind::ImportList).expect("import list");
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{size}_imports")),
            &size,
            |b, _| {
                b.iter(|| {
                    let mut tree = tree.clone();
                    let fragment = Tree::from_source(python(), SyntaxKind::Import, "import extra");
                    let mut handle = tree.list_mut(list).expect("list handle");
                    let added = handle.add_at_line(0, fragment).expect("line 0 is available");
                    black_box(tree.list_mut(list).and_then(|mut list| list.remove(added)))
                })
            },
        );
    }
    group.finish();
}

/// Benchmark subtree cloning
fn bench_clone_subtree(c: &mut Criterion) {
    let tree = import_tree(500);
    let list = tree.find(SyntaxKind::ImportList).expect("import list");
    c.bench_function("clone_subtree_500_imports", |b| {
        b.iter(|| black_box(tree.clone_subtree(list)))
    });
}

fn bench_indentation_unit(c: &mut Criterion) {
    let mut source = String::new();
    for i in 0..500 {
        source.push_str(&format!("def f{i}():\n    if x:\n        return {i}\n"));
    }
    c.bench_function("indentation_unit_1500_lines", |b| {
        b.iter(|| black_box(indentation_unit(&source, "    ")))
    });
}

/// Benchmark building a small tree by hand
fn bench_builder(c: &mut Criterion) {
    c.bench_function("builder_small_function", |b| {
        b.iter(|| {
            let mut builder = TreeBuilder::new(python(), "def f():\n    pass\n");
            builder.node(SyntaxKind::Program, |b| {
                b.node(SyntaxKind::Function, |b| {
                    b.tokens(&["def", "f", "(", ")", ":", "pass"]);
                });
            });
            black_box(builder.finish())
        })
    });
}

criterion_group!(
    benches,
    bench_convert,
    bench_insert_remove,
    bench_clone_subtree,
    bench_indentation_unit,
    bench_builder
);
criterion_main!(benches);
