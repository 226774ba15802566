// Criterion benchmarks for dafsa-fst.
//
// The lexicon is generated: every combination of a few stems and endings,
// each ending rewritten to a tag on the output side. No data files needed.
//
// Run:
//   cargo bench -p dafsa-fst

use std::ops::ControlFlow;

use criterion::{Criterion, criterion_group, criterion_main};
use dafsa_core::label::pack_aligned;
use dafsa_core::{Feature, Label};
use dafsa_fst::format::{read_nfsa, write_trie};
use dafsa_fst::{Nfsa, Trie};

// ---------------------------------------------------------------------------
// Lexicon generation
// ---------------------------------------------------------------------------

const STEMS: &[&str] = &[
    "talo", "kissa", "koira", "auto", "kirja", "pöytä", "tuoli", "ikkuna", "ovi", "katu",
    "metsä", "järvi", "kaupunki", "kieli", "lause", "sana", "päivä", "yö", "aamu", "ilta",
];

const ENDINGS: &[(&str, &str)] = &[
    ("", ""),
    ("t", "+PL"),
    ("ssa", "+INE"),
    ("sta", "+ELA"),
    ("lla", "+ADE"),
    ("lta", "+ABL"),
    ("ksi", "+TRA"),
    ("na", "+ESS"),
];

fn labels(s: &str) -> Vec<Label> {
    s.chars().map(|c| c as Label).collect()
}

fn entries() -> Vec<(String, String, Feature)> {
    let mut out = Vec::new();
    for (i, stem) in STEMS.iter().enumerate() {
        for (j, (ending, tag)) in ENDINGS.iter().enumerate() {
            let feature = (i * ENDINGS.len() + j) as Feature + 1;
            out.push((format!("{stem}{ending}"), format!("{stem}{tag}"), feature));
        }
    }
    out
}

fn build_trie(entries: &[(String, String, Feature)]) -> Trie {
    let mut trie = Trie::new();
    for (surface, output, feature) in entries {
        let seq = pack_aligned(&labels(surface), &labels(output)).expect("BMP labels");
        trie.add(&seq, *feature);
    }
    trie
}

fn build_nfsa(trie: &Trie) -> Nfsa {
    let bytes = write_trie(trie, Vec::new()).expect("serialize");
    read_nfsa(&mut bytes.as_slice()).expect("deserialize")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Insert every generated entry into a fresh trie.
fn bench_trie_build(c: &mut Criterion) {
    let entries = entries();
    c.bench_function("trie_build_160_entries", |b| {
        b.iter(|| std::hint::black_box(build_trie(&entries)));
    });
}

/// Serialize the trie and load it back as a transducer.
fn bench_load(c: &mut Criterion) {
    let trie = build_trie(&entries());
    let bytes = write_trie(&trie, Vec::new()).expect("serialize");
    c.bench_function("read_nfsa", |b| {
        b.iter(|| std::hint::black_box(read_nfsa(&mut bytes.as_slice()).expect("deserialize")));
    });
}

/// Analyze every generated surface form, capitalized.
fn bench_analyze_words(c: &mut Criterion) {
    let entries = entries();
    let nfsa = build_nfsa(&build_trie(&entries));
    let walker = nfsa.walker();
    let mut config = walker.new_config();
    let words: Vec<String> = entries
        .iter()
        .map(|(surface, _, _)| {
            let mut chars = surface.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    c.bench_function("analyze_160_words", |b| {
        b.iter(|| {
            for word in &words {
                std::hint::black_box(walker.analyze(&mut config, word));
            }
        });
    });
}

/// Walk from every offset of a running text, counting matches only.
fn bench_walk_text(c: &mut Criterion) {
    let nfsa = build_nfsa(&build_trie(&entries()));
    let walker = nfsa.walker();
    let mut config = walker.new_config();
    let text: Vec<char> = "Kissa istui talossa ja koira juoksi metsässä. \
                           Illalla autot ajoivat kaupungista järville."
        .chars()
        .collect();

    c.bench_function("walk_text_all_offsets", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for start in 0..text.len() {
                let outcome = walker.walk(&mut config, &text, start, text.len(), |_| {
                    ControlFlow::Continue(())
                });
                total += outcome.matches;
            }
            std::hint::black_box(total)
        });
    });
}

criterion_group!(
    benches,
    bench_trie_build,
    bench_load,
    bench_analyze_words,
    bench_walk_text
);
criterion_main!(benches);
