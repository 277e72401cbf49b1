//! Random transaction input, in the same section grammar the workers read.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use rand::Rng;
use tracing::info;

use crate::error::{Error, Result};
use crate::txn::source::TransactionSource;

pub const SECTIONS_PER_SOURCE: RangeInclusive<usize> = 5..=10;
pub const AMOUNTS_PER_SECTION: RangeInclusive<usize> = 1..=7;
pub const MAX_AMOUNT: f64 = 500.0;

/// One amount line: sign always present, two decimals
pub fn amount_line(amount: f64) -> String {
    if amount >= 0.0 {
        format!("+{:.2}", amount)
    } else {
        format!("{:.2}", amount)
    }
}

/// A full source body: several `R` .. `W` sections of random deposits and withdrawals
pub fn sections<R: Rng>(rng: &mut R) -> String {
    let mut text = String::new();
    for _ in 0..rng.gen_range(SECTIONS_PER_SOURCE) {
        text.push_str("R\n");
        for _ in 0..rng.gen_range(AMOUNTS_PER_SECTION) {
            text.push_str(&amount_line(rng.gen_range(-MAX_AMOUNT..MAX_AMOUNT)));
            text.push('\n');
        }
        text.push_str("W\n");
    }
    text
}

/// Writes `<name>.in` under `dir` for every name and returns the matching file sources
pub fn write_roster<R: Rng>(dir: &Path, names: &[&str], rng: &mut R) -> Result<Vec<TransactionSource>> {
    fs::create_dir_all(dir).map_err(|err| Error::Io {
        worker: "generator".to_string(),
        source_name: dir.display().to_string(),
        err,
    })?;
    names
        .iter()
        .map(|name| {
            let path = dir.join(format!("{}.in", name));
            fs::write(&path, sections(rng)).map_err(|err| Error::Io {
                worker: name.to_string(),
                source_name: path.display().to_string(),
                err,
            })?;
            info!("wrote transactions for {} to \"{}\"", name, path.display());
            Ok(TransactionSource::file(*name, path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::shared::cwd;
    use crate::txn::grammar::{Grammar, Token};

    #[test]
    fn amount_lines_carry_a_sign() {
        assert_eq!(amount_line(12.5), "+12.50");
        assert_eq!(amount_line(0.0), "+0.00");
        assert_eq!(amount_line(-499.999), "-500.00");
    }

    #[test]
    fn generated_text_follows_the_grammar() {
        let grammar = Grammar::new().unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..20 {
            let text = sections(&mut rng);
            let tokens: Vec<Token> = text
                .lines()
                .map(|line| grammar.classify(line).unwrap())
                .collect();

            let mut section_count = 0;
            let mut amounts = 0;
            for token in tokens {
                match token {
                    Token::BeginSection => {
                        assert_eq!(amounts, 0);
                        section_count += 1;
                    }
                    Token::Amount(amount) => {
                        assert!(amount.abs() <= MAX_AMOUNT);
                        amounts += 1;
                    }
                    Token::EndSection => {
                        assert!(AMOUNTS_PER_SECTION.contains(&amounts));
                        amounts = 0;
                    }
                }
            }
            assert!(SECTIONS_PER_SOURCE.contains(&section_count));
            assert!(text.starts_with("R\n") && text.ends_with("W\n"));
        }
    }

    #[test]
    fn write_roster_creates_files() {
        let dir = cwd().join("tests").join("generate_tests");
        let mut rng = StdRng::seed_from_u64(1);
        let sources = write_roster(&dir, &["Vlad", "Frank"], &mut rng).unwrap();

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name(), "Vlad");
        assert!(dir.join("Frank.in").exists());
        let mut stream = sources[1].open().unwrap();
        assert_eq!(stream.next_line().unwrap().as_deref(), Some("R"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
