//! Saving and loading trained genomes.
//!
//! Two encodings of the same archive: pretty JSON for inspection and bincode
//! for compact storage. Genomes travel in their digit-string form either way,
//! so malformed data is rejected while decoding.

use crate::trainer::{Scored, TrainingReport};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenomeArchive {
    pub width: usize,
    pub height: usize,
    pub generations: usize,
    pub ranked: Vec<Scored>,
}

impl GenomeArchive {
    pub fn from_report(width: usize, height: usize, report: &TrainingReport) -> Self {
        Self {
            width,
            height,
            generations: report.generations_completed,
            ranked: report.ranked.clone(),
        }
    }

    pub fn best(&self) -> Option<&Scored> {
        self.ranked.first()
    }
}

pub fn write_json<W: Write>(writer: W, archive: &GenomeArchive) -> Result<()> {
    serde_json::to_writer_pretty(writer, archive).context("encoding genome archive as JSON")
}

pub fn read_json<R: Read>(reader: R) -> Result<GenomeArchive> {
    serde_json::from_reader(reader).context("decoding genome archive from JSON")
}

pub fn write_binary<W: Write>(mut writer: W, archive: &GenomeArchive) -> Result<()> {
    bincode::serde::encode_into_std_write(archive, &mut writer, bincode::config::standard())
        .context("encoding genome archive with bincode")?;
    Ok(())
}

pub fn read_binary<R: Read>(mut reader: R) -> Result<GenomeArchive> {
    bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())
        .context("decoding genome archive with bincode")
}

/// Saves by extension: `.json` is JSON, anything else bincode.
pub fn save(path: impl AsRef<Path>, archive: &GenomeArchive) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    if is_json(path) {
        write_json(&mut writer, archive)?;
    } else {
        write_binary(&mut writer, archive)?;
    }
    writer.flush().with_context(|| format!("flushing {}", path.display()))
}

pub fn load(path: impl AsRef<Path>) -> Result<GenomeArchive> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    if is_json(path) { read_json(reader) } else { read_binary(reader) }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{GENOME_LEN, Genome};
    use crate::strategy::Action;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn archive() -> GenomeArchive {
        let mut rng = SmallRng::seed_from_u64(12);
        GenomeArchive {
            width: 12,
            height: 12,
            generations: 4,
            ranked: vec![
                Scored {
                    genome: Genome::random(&mut rng),
                    fitness: 40,
                },
                Scored {
                    genome: Genome::uniform(Action::TurnRight),
                    fitness: 31,
                },
            ],
        }
    }

    #[test]
    fn json_keeps_genomes_as_digit_strings() {
        let mut buf = Vec::new();
        write_json(&mut buf, &archive()).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.contains(&"2".repeat(GENOME_LEN)));
        assert_eq!(read_json(&buf[..]).unwrap(), archive());
    }

    #[test]
    fn binary_matches_json_content() {
        let mut buf = Vec::new();
        write_binary(&mut buf, &archive()).unwrap();
        assert_eq!(read_binary(&buf[..]).unwrap(), archive());
    }

    #[test]
    fn corrupted_genome_fails_to_load() {
        let mut buf = Vec::new();
        write_json(&mut buf, &archive()).unwrap();
        let text = String::from_utf8(buf).unwrap().replacen(&"2".repeat(8), "22229222", 1);
        assert!(read_json(text.as_bytes()).is_err());
    }

    #[test]
    fn extension_picks_the_encoding() {
        assert!(is_json(Path::new("best.JSON")));
        assert!(!is_json(Path::new("best.bin")));
        assert!(!is_json(Path::new("best")));
    }
}
