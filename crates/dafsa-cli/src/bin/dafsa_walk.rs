// dafsa-walk: Look up words in a compiled automaton.
//
// Walks each word (from arguments, or stdin one per line) and prints every
// analysis that consumes the whole word.
//
// Usage:
//   dafsa-walk [-a PATH] [--json] [--no-fold] [WORD...]
//
// Options:
//   -a, --automaton PATH   Automaton file (default: $DAFSA_AUTOMATON, then automaton.bin)
//   --json                 Print one JSON object per analysis
//   --no-fold              Match case exactly
//   -h, --help             Print help

use std::io::{self, BufRead, Write};

use dafsa_cli::MatchRecord;
use dafsa_fst::{WalkConfig, Walker};

fn main() {
    dafsa_cli::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (automaton, args) = dafsa_cli::parse_option(&args, "-a", "--automaton")
        .unwrap_or_else(|e| dafsa_cli::fatal(&e));
    let (json, args) = dafsa_cli::take_flag(&args, "--json");
    let (no_fold, args) = dafsa_cli::take_flag(&args, "--no-fold");

    if dafsa_cli::wants_help(&args) {
        println!("dafsa-walk: Look up words in a compiled automaton.");
        println!();
        println!("Usage: dafsa-walk [-a PATH] [--json] [--no-fold] [WORD...]");
        println!();
        println!("If WORD arguments are given, looks up each word.");
        println!("Otherwise reads words from stdin (one per line).");
        println!();
        println!("Options:");
        println!("  -a, --automaton PATH   Automaton file (default: $DAFSA_AUTOMATON, then automaton.bin)");
        println!("  --json                 Print one JSON object per analysis");
        println!("  --no-fold              Match case exactly");
        println!("  -h, --help             Print this help");
        return;
    }

    let words: Vec<String> = args.iter().filter(|a| !a.starts_with('-')).cloned().collect();

    let path = dafsa_cli::automaton_path(automaton.as_deref());
    let nfsa = dafsa_cli::load_automaton(&path).unwrap_or_else(|e| dafsa_cli::fatal(&e));
    let walker = nfsa.walker();
    let mut config = walker.new_config().with_fold_case(!no_fold);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    let mut walk_word = |word: &str, out: &mut io::BufWriter<io::StdoutLock<'_>>| {
        print_word(&walker, &mut config, word, json, out)
    };

    let result = if words.is_empty() {
        let stdin = io::stdin();
        let mut result = Ok(());
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("error reading stdin: {e}");
                    break;
                }
            };
            let word = line.trim();
            if word.is_empty() {
                continue;
            }
            result = walk_word(word, &mut out);
            if result.is_err() {
                break;
            }
        }
        result
    } else {
        words.iter().try_for_each(|word| walk_word(word.as_str(), &mut out))
    };

    if let Err(e) = result.and_then(|()| out.flush()) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            dafsa_cli::fatal(&format!("failed to write output: {e}"));
        }
    }
}

fn print_word<W: Write>(
    walker: &Walker<'_>,
    config: &mut WalkConfig,
    word: &str,
    json: bool,
    out: &mut W,
) -> io::Result<()> {
    let results = walker.analyze(config, word);
    if json {
        for m in &results {
            serde_json::to_writer(&mut *out, &MatchRecord::new(word, m))?;
            writeln!(out)?;
        }
    } else if results.is_empty() {
        writeln!(out, "{word}: (no match)")?;
    } else {
        writeln!(out, "{word}:")?;
        for m in &results {
            writeln!(out, "  {}", dafsa_cli::format_match(m))?;
        }
    }
    Ok(())
}
