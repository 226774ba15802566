// dafsa-compile: Compile a tab-separated lexicon into a binary automaton.
//
// Each lexicon line is `surface<TAB>feature` or
// `surface<TAB>output<TAB>feature`. Surface and output characters are
// aligned position by position; the shorter side is padded with epsilon.
// Blank lines and lines starting with `#` are skipped.
//
// Usage:
//   dafsa-compile [-o OUT] [LEXICON]
//
// Options:
//   -o, --output PATH   Output file (default: automaton.bin)
//   -h, --help          Print help

use std::io::{self, BufReader};
use std::path::PathBuf;

fn main() {
    dafsa_cli::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (out_path, args) = dafsa_cli::parse_option(&args, "-o", "--output")
        .unwrap_or_else(|e| dafsa_cli::fatal(&e));

    if dafsa_cli::wants_help(&args) {
        println!("dafsa-compile: Compile a lexicon into a binary automaton.");
        println!();
        println!("Usage: dafsa-compile [-o OUT] [LEXICON]");
        println!();
        println!("Reads LEXICON, or stdin if not given. Each line is");
        println!("surface<TAB>feature or surface<TAB>output<TAB>feature.");
        println!();
        println!("Options:");
        println!("  -o, --output PATH   Output file (default: automaton.bin)");
        println!("  -h, --help          Print this help");
        return;
    }

    if args.len() > 1 {
        dafsa_cli::fatal("expected at most one LEXICON argument");
    }

    let trie = match args.first() {
        Some(path) => {
            let file = std::fs::File::open(path)
                .unwrap_or_else(|e| dafsa_cli::fatal(&format!("failed to open {path}: {e}")));
            dafsa_cli::compile_lexicon(BufReader::new(file))
        }
        None => dafsa_cli::compile_lexicon(io::stdin().lock()),
    }
    .unwrap_or_else(|e| dafsa_cli::fatal(&e.to_string()));

    let out_path = PathBuf::from(out_path.as_deref().unwrap_or(dafsa_cli::DEFAULT_AUTOMATON));
    dafsa_cli::write_automaton(&trie, &out_path).unwrap_or_else(|e| {
        dafsa_cli::fatal(&format!("failed to write {}: {e}", out_path.display()))
    });

    eprintln!(
        "{}: {} states, {} transitions",
        out_path.display(),
        trie.size(),
        trie.transition_count()
    );
}
