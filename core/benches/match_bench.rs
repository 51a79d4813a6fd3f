use criterion::{criterion_group, criterion_main, Criterion};
use pantry_core::tokenizer::tokenize;
use pantry_core::{Catalog, Product, RelevanceMatcher, TextIndex};

fn synthetic_catalog(n: usize) -> Catalog {
    let adjectives = ["Organic", "Sharp", "Creamy", "Salted", "Roasted", "Sparkling", "Aged", "Spicy"];
    let nouns = ["Cheddar Cheese", "Whole Milk", "Potato Chips", "Almond Butter", "Green Tea", "Sourdough Bread"];
    Catalog::new(
        (0..n)
            .map(|i| Product::new(format!("{} {} No. {i}", adjectives[i % adjectives.len()], nouns[i % nouns.len()]), "$1.99", ""))
            .collect(),
    )
}

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_product_name", |b| b.iter(|| tokenize("For the Love of Chocolate Mousse Cake")));
}

fn bench_match(c: &mut Criterion) {
    let index = TextIndex::build(&synthetic_catalog(5_000));
    let matcher = RelevanceMatcher::default();
    c.bench_function("match_top3_5k", |b| b.iter(|| matcher.find(&index, "sharp cheddar cheese", 3)));
}

criterion_group!(benches, bench_tokenize, bench_match);
criterion_main!(benches);
