// dafsa-cli: shared utilities for CLI tools.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process;

use dafsa_core::label::pack_aligned;
use dafsa_core::{Feature, Label};
use dafsa_fst::walker::MatchResult;
use dafsa_fst::{DafsaError, Nfsa, Trie};
use serde::Serialize;
use tracing::debug;

/// Environment variable naming the automaton file for `dafsa-walk`.
pub const AUTOMATON_ENV: &str = "DAFSA_AUTOMATON";

/// Automaton file name used when nothing else is given.
pub const DEFAULT_AUTOMATON: &str = "automaton.bin";

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parse a `--long=VALUE`, `--long VALUE` or `-s VALUE` option.
///
/// Returns `(value, remaining_args)`. A later occurrence overrides an
/// earlier one.
pub fn parse_option(
    args: &[String],
    short: &str,
    long: &str,
) -> Result<(Option<String>, Vec<String>), String> {
    let mut value = None;
    let mut remaining = Vec::new();
    let mut iter = args.iter();
    let long_eq = format!("{long}=");

    while let Some(arg) = iter.next() {
        if let Some(val) = arg.strip_prefix(&long_eq) {
            value = Some(val.to_string());
        } else if arg == long || arg == short {
            match iter.next() {
                Some(val) => value = Some(val.clone()),
                None => return Err(format!("{arg} requires a value")),
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    Ok((value, remaining))
}

/// Remove every occurrence of `flag`; returns whether it was present.
pub fn take_flag(args: &[String], flag: &str) -> (bool, Vec<String>) {
    let present = args.iter().any(|a| a == flag);
    let remaining = args.iter().filter(|a| *a != flag).cloned().collect();
    (present, remaining)
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}

/// Pick the automaton file.
///
/// Search order:
/// 1. explicit `-a` argument
/// 2. `DAFSA_AUTOMATON` environment variable
/// 3. `automaton.bin` in the current directory
pub fn automaton_path(explicit: Option<&str>) -> PathBuf {
    resolve_automaton_path(explicit, std::env::var(AUTOMATON_ENV).ok())
}

fn resolve_automaton_path(explicit: Option<&str>, env: Option<String>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }
    match env {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(DEFAULT_AUTOMATON),
    }
}

/// Load a transducer, turning failures into a printable message.
pub fn load_automaton(path: &Path) -> Result<Nfsa, String> {
    dafsa_fst::format::load_nfsa(path)
        .map_err(|e| format!("failed to load {}: {e}", path.display()))
}

// ---------------------------------------------------------------------------
// Lexicon
// ---------------------------------------------------------------------------

/// Error reading a lexicon. Line numbers are 1-based.
#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// One lexicon line: a surface form, the output it maps to and its feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    pub surface: String,
    pub output: String,
    pub feature: Feature,
}

impl LexiconEntry {
    /// Surface and output aligned into packed labels.
    ///
    /// Returns `None` if a character lies outside the Basic Multilingual Plane.
    pub fn packed(&self) -> Option<Vec<Label>> {
        let surface: Vec<Label> = self.surface.chars().map(|c| c as Label).collect();
        let output: Vec<Label> = self.output.chars().map(|c| c as Label).collect();
        pack_aligned(&surface, &output)
    }
}

/// Parse one lexicon line.
///
/// Accepts `surface<TAB>feature` (output equals surface) or
/// `surface<TAB>output<TAB>feature`. Blank lines and `#` comments give
/// `Ok(None)`.
pub fn parse_lexicon_line(line: &str) -> Result<Option<LexiconEntry>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.trim_start().starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    let (surface, output, feature) = match fields.as_slice() {
        [surface, feature] => (*surface, *surface, *feature),
        [surface, output, feature] => (*surface, *output, *feature),
        _ => {
            return Err(format!(
                "expected 2 or 3 tab-separated fields, found {}",
                fields.len()
            ));
        }
    };
    if surface.is_empty() {
        return Err("empty surface form".to_string());
    }
    let feature: Feature = feature
        .trim()
        .parse()
        .map_err(|_| format!("invalid feature {:?}", feature.trim()))?;

    Ok(Some(LexiconEntry {
        surface: surface.to_string(),
        output: output.to_string(),
        feature,
    }))
}

/// Read a whole lexicon into a trie of packed labels.
pub fn compile_lexicon<R: BufRead>(reader: R) -> Result<Trie, LexiconError> {
    let mut trie = Trie::new();
    let mut entries = 0usize;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let malformed = |reason: String| LexiconError::Malformed {
            line: i + 1,
            reason,
        };
        let Some(entry) = parse_lexicon_line(&line).map_err(malformed)? else {
            continue;
        };
        let seq = entry.packed().ok_or_else(|| {
            malformed(format!(
                "{:?} -> {:?} has a character outside U+0000..U+FFFF",
                entry.surface, entry.output
            ))
        })?;
        trie.add(&seq, entry.feature);
        entries += 1;
    }
    debug!(entries, states = trie.size(), "lexicon compiled");
    Ok(trie)
}

/// Write a compiled trie to `path`.
pub fn write_automaton(trie: &Trie, path: &Path) -> Result<(), DafsaError> {
    let file = std::fs::File::create(path)?;
    dafsa_fst::format::write_trie(trie, std::io::BufWriter::new(file))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A match as printed by `dafsa-walk --json`.
#[derive(Debug, Serialize)]
pub struct MatchRecord<'a> {
    pub word: &'a str,
    pub output: &'a str,
    pub start: usize,
    pub end: usize,
    pub features: &'a [Feature],
}

impl<'a> MatchRecord<'a> {
    pub fn new(word: &'a str, m: &'a MatchResult) -> Self {
        Self {
            word,
            output: &m.output,
            start: m.start,
            end: m.end,
            features: &m.features,
        }
    }
}

/// Text rendering of a match: `output [f1,f2]`.
pub fn format_match(m: &MatchResult) -> String {
    let features: Vec<String> = m.features.iter().map(|f| f.to_string()).collect();
    format!("{} [{}]", m.output, features.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_option_forms() {
        let (v, rest) = parse_option(&args(&["-a", "x.bin", "word"]), "-a", "--automaton").unwrap();
        assert_eq!(v.as_deref(), Some("x.bin"));
        assert_eq!(rest, args(&["word"]));

        let (v, rest) = parse_option(&args(&["--automaton=y.bin"]), "-a", "--automaton").unwrap();
        assert_eq!(v.as_deref(), Some("y.bin"));
        assert!(rest.is_empty());

        let (v, rest) = parse_option(&args(&["a", "b"]), "-a", "--automaton").unwrap();
        assert_eq!(v, None);
        assert_eq!(rest, args(&["a", "b"]));
    }

    #[test]
    fn parse_option_missing_value() {
        let err = parse_option(&args(&["word", "-o"]), "-o", "--output").unwrap_err();
        assert!(err.contains("-o"));
    }

    #[test]
    fn take_flag_removes_all() {
        let (json, rest) = take_flag(&args(&["--json", "a", "--json"]), "--json");
        assert!(json);
        assert_eq!(rest, args(&["a"]));
        let (json, _) = take_flag(&args(&["a"]), "--json");
        assert!(!json);
    }

    #[test]
    fn automaton_path_order() {
        assert_eq!(
            resolve_automaton_path(Some("a.bin"), Some("b.bin".into())),
            PathBuf::from("a.bin")
        );
        assert_eq!(
            resolve_automaton_path(None, Some("b.bin".into())),
            PathBuf::from("b.bin")
        );
        assert_eq!(
            resolve_automaton_path(None, Some(String::new())),
            PathBuf::from(DEFAULT_AUTOMATON)
        );
        assert_eq!(resolve_automaton_path(None, None), PathBuf::from(DEFAULT_AUTOMATON));
    }

    #[test]
    fn lexicon_line_forms() {
        assert_eq!(
            parse_lexicon_line("talo\t1").unwrap(),
            Some(LexiconEntry {
                surface: "talo".into(),
                output: "talo".into(),
                feature: 1
            })
        );
        assert_eq!(
            parse_lexicon_line("went\tgo+PAST\t7\r").unwrap(),
            Some(LexiconEntry {
                surface: "went".into(),
                output: "go+PAST".into(),
                feature: 7
            })
        );
        assert_eq!(parse_lexicon_line("").unwrap(), None);
        assert_eq!(parse_lexicon_line("   ").unwrap(), None);
        assert_eq!(parse_lexicon_line("# comment\t1").unwrap(), None);
    }

    #[test]
    fn lexicon_line_errors() {
        assert!(parse_lexicon_line("talo").is_err());
        assert!(parse_lexicon_line("a\tb\tc\t1").is_err());
        assert!(parse_lexicon_line("talo\tx").is_err());
        assert!(parse_lexicon_line("talo\t-1").is_err());
        assert!(parse_lexicon_line("\t1").is_err());
    }

    #[test]
    fn compile_reports_line_number() {
        let text = "# header\ntalo\t1\nbroken\n";
        match compile_lexicon(text.as_bytes()) {
            Err(LexiconError::Malformed { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn compile_rejects_astral_characters() {
        match compile_lexicon("\u{1F600}\t1\n".as_bytes()) {
            Err(LexiconError::Malformed { line, .. }) => assert_eq!(line, 1),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn compiled_lexicon_walks() {
        let text = "talo\t1\ntalot\ttalo+PL\t2\n";
        let trie = compile_lexicon(text.as_bytes()).unwrap();
        let bytes = dafsa_fst::format::write_trie(&trie, Vec::new()).unwrap();
        let nfsa = dafsa_fst::format::read_nfsa(&mut bytes.as_slice()).unwrap();

        let walker = nfsa.walker();
        let mut config = walker.new_config();
        let results = walker.analyze(&mut config, "talot");
        assert_eq!(results.len(), 1);
        assert_eq!(format_match(&results[0]), "talo+PL [2]");
    }

    #[test]
    fn json_record() {
        let m = MatchResult {
            output: "talo".into(),
            start: 0,
            end: 4,
            state: 5,
            features: vec![1, 3],
        };
        let json = serde_json::to_string(&MatchRecord::new("Talo", &m)).unwrap();
        assert_eq!(
            json,
            r#"{"word":"Talo","output":"talo","start":0,"end":4,"features":[1,3]}"#
        );
    }
}
