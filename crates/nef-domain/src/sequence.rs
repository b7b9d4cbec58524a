//! Residue translation tables and the molecular system frame

use crate::document::{Loop, SaveFrame, UNKNOWN};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// Category (and framecode) of the molecular system frame
pub const NEF_MOLECULAR_SYSTEM: &str = "nef_molecular_system";

/// Category of the sequence loop
pub const NEF_SEQUENCE: &str = "nef_sequence";

const SEQUENCE_TAGS: [&str; 7] = [
    "index",
    "chain_code",
    "sequence_code",
    "residue_name",
    "linking",
    "residue_variant",
    "cis_peptide",
];

const PROTEIN: [(char, &str); 20] = [
    ('A', "ALA"),
    ('C', "CYS"),
    ('D', "ASP"),
    ('E', "GLU"),
    ('F', "PHE"),
    ('G', "GLY"),
    ('H', "HIS"),
    ('I', "ILE"),
    ('K', "LYS"),
    ('L', "LEU"),
    ('M', "MET"),
    ('N', "ASN"),
    ('P', "PRO"),
    ('Q', "GLN"),
    ('R', "ARG"),
    ('S', "SER"),
    ('T', "THR"),
    ('V', "VAL"),
    ('W', "TRP"),
    ('Y', "TYR"),
];

const DNA: [(char, &str); 4] = [('A', "DA"), ('C', "DC"), ('G', "DG"), ('T', "DT")];

const RNA: [(char, &str); 4] = [('A', "A"), ('C', "C"), ('G', "G"), ('U', "U")];

/// Kind of polymer a sequence describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoleculeType {
    /// Amino acids
    Protein,
    /// Deoxyribonucleotides
    Dna,
    /// Ribonucleotides
    Rna,
}

impl MoleculeType {
    fn table(self) -> &'static [(char, &'static str)] {
        match self {
            MoleculeType::Protein => &PROTEIN,
            MoleculeType::Dna => &DNA,
            MoleculeType::Rna => &RNA,
        }
    }

    /// Lower case name
    pub fn as_str(self) -> &'static str {
        match self {
            MoleculeType::Protein => "protein",
            MoleculeType::Dna => "dna",
            MoleculeType::Rna => "rna",
        }
    }
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A one letter code with no translation for the molecule type
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown {molecule_type} residue '{letter}' at position {position}")]
pub struct BadResidue {
    /// The offending letter
    pub letter: char,
    /// 1-based position in the sequence
    pub position: usize,
    /// Molecule type used for translation
    pub molecule_type: MoleculeType,
}

/// Translate one letter codes to three letter residue names
///
/// Letters are case insensitive; whitespace is skipped.
pub fn translate_1_to_3(letters: &str, molecule_type: MoleculeType) -> Result<Vec<String>, BadResidue> {
    let table = molecule_type.table();
    letters
        .chars()
        .filter(|c| !c.is_whitespace())
        .enumerate()
        .map(|(index, letter)| {
            let upper = letter.to_ascii_uppercase();
            table
                .iter()
                .find(|(code, _)| *code == upper)
                .map(|(_, name)| name.to_string())
                .ok_or(BadResidue {
                    letter,
                    position: index + 1,
                    molecule_type,
                })
        })
        .collect()
}

/// Chain codes to use: the user's codes first, then `A`..`Z` not already used
pub fn chain_code_iter(user_codes: &[String]) -> impl Iterator<Item = String> + '_ {
    let defaults = ('A'..='Z')
        .map(String::from)
        .filter(move |code| !user_codes.contains(code));
    user_codes.iter().cloned().chain(defaults)
}

/// One residue of a chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceResidue {
    /// Chain the residue belongs to
    pub chain_code: String,
    /// Residue number
    pub sequence_code: i64,
    /// Three letter residue name
    pub residue_name: String,
}

/// Number a chain's residues from 1
pub fn sequence_3let_to_residues(names: &[String], chain_code: &str) -> Vec<SequenceResidue> {
    names
        .iter()
        .zip(1..)
        .map(|(name, sequence_code)| SequenceResidue {
            chain_code: chain_code.to_string(),
            sequence_code,
            residue_name: name.clone(),
        })
        .collect()
}

/// Shift residue numbers by a per-chain offset; chains without an offset are unchanged
pub fn offset_chain_residues(residues: Vec<SequenceResidue>, offsets: &HashMap<String, i64>) -> Vec<SequenceResidue> {
    residues
        .into_iter()
        .map(|mut residue| {
            if let Some(offset) = offsets.get(&residue.chain_code) {
                residue.sequence_code += offset;
            }
            residue
        })
        .collect()
}

/// Build the `nef_molecular_system` frame for a set of residues
///
/// Residues are sorted by chain and number. The first residue of a chain is
/// linked `start` and the last `end` unless the chain is listed in
/// `no_chain_starts` / `no_chain_ends`, in which case it is `middle`. A chain
/// of one residue is `single`.
pub fn sequence_to_nef_frame(
    residues: &[SequenceResidue],
    no_chain_starts: &[String],
    no_chain_ends: &[String],
) -> SaveFrame {
    let mut frame = SaveFrame::from_scratch(NEF_MOLECULAR_SYSTEM, NEF_MOLECULAR_SYSTEM);

    let mut sorted = residues.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut lp = Loop::from_scratch(NEF_SEQUENCE);
    for tag in SEQUENCE_TAGS {
        let _ = lp.add_tag(tag);
    }

    for (index, residue) in sorted.iter().enumerate() {
        let first = index == 0 || sorted[index - 1].chain_code != residue.chain_code;
        let last = index + 1 == sorted.len() || sorted[index + 1].chain_code != residue.chain_code;

        let linking = match (first, last) {
            (true, true) => "single",
            (true, false) if !no_chain_starts.contains(&residue.chain_code) => "start",
            (false, true) if !no_chain_ends.contains(&residue.chain_code) => "end",
            _ => "middle",
        };

        let mut data = HashMap::new();
        data.insert("index", (index + 1).to_string());
        data.insert("chain_code", residue.chain_code.clone());
        data.insert("sequence_code", residue.sequence_code.to_string());
        data.insert("residue_name", residue.residue_name.clone());
        data.insert("linking", linking.to_string());
        data.insert("residue_variant", UNKNOWN.to_string());
        data.insert("cis_peptide", UNKNOWN.to_string());
        lp.add_row_from_map(&data);
    }

    frame.add_loop(lp);
    frame
}

/// Values of one `nef_sequence` column paired with the chain codes, or nothing
fn sequence_rows<'a>(frame: &'a SaveFrame, tag: &str) -> Vec<(&'a str, &'a str)> {
    let Some(lp) = frame.get_loop(NEF_SEQUENCE) else {
        return Vec::new();
    };
    match (lp.column("chain_code"), lp.column(tag)) {
        (Some(chains), Some(values)) => chains.into_iter().zip(values).collect(),
        _ => Vec::new(),
    }
}

/// Distinct chain codes in a molecular system frame, sorted
///
/// Residues with an unknown (`.`) chain code belong to no chain.
pub fn frame_to_chains(frame: &SaveFrame) -> Vec<String> {
    sequence_rows(frame, "chain_code")
        .into_iter()
        .map(|(chain, _)| chain)
        .filter(|chain| *chain != UNKNOWN)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// How many times each residue name occurs in one chain of a molecular system frame
pub fn count_residues(frame: &SaveFrame, chain_code: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for (chain, residue_name) in sequence_rows(frame, "residue_name") {
        if chain == chain_code {
            *counts.entry(residue_name.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_protein() {
        let names = translate_1_to_3("acD e", MoleculeType::Protein).unwrap();
        assert_eq!(names, vec!["ALA", "CYS", "ASP", "GLU"]);
    }

    #[test]
    fn test_translate_dna_and_rna() {
        assert_eq!(translate_1_to_3("gatc", MoleculeType::Dna).unwrap(), vec!["DG", "DA", "DT", "DC"]);
        assert_eq!(translate_1_to_3("GAUC", MoleculeType::Rna).unwrap(), vec!["G", "A", "U", "C"]);
    }

    #[test]
    fn test_bad_residue() {
        let err = translate_1_to_3("ACU", MoleculeType::Dna).unwrap_err();
        assert_eq!(err.letter, 'U');
        assert_eq!(err.position, 3);
        assert_eq!(err.to_string(), "Unknown dna residue 'U' at position 3");
    }

    #[test]
    fn test_chain_codes_skip_user_codes() {
        let user = vec!["B".to_string(), "X1".to_string()];
        let codes: Vec<String> = chain_code_iter(&user).take(4).collect();
        assert_eq!(codes, vec!["B", "X1", "A", "C"]);
    }

    #[test]
    fn test_offsets_apply_per_chain() {
        let names = vec!["ALA".to_string(), "GLY".to_string()];
        let mut residues = sequence_3let_to_residues(&names, "A");
        residues.extend(sequence_3let_to_residues(&names, "B"));

        let mut offsets = HashMap::new();
        offsets.insert("A".to_string(), 9);
        let residues = offset_chain_residues(residues, &offsets);

        let codes: Vec<i64> = residues.iter().map(|r| r.sequence_code).collect();
        assert_eq!(codes, vec![10, 11, 1, 2]);
    }

    #[test]
    fn test_linking() {
        let names: Vec<String> = ["ALA", "CYS", "ASP"].iter().map(|s| s.to_string()).collect();
        let mut residues = sequence_3let_to_residues(&names, "A");
        residues.extend(sequence_3let_to_residues(&names[..1], "B"));

        let frame = sequence_to_nef_frame(&residues, &[], &[]);
        let lp = frame.get_loop(NEF_SEQUENCE).unwrap();
        assert_eq!(lp.column("linking").unwrap(), vec!["start", "middle", "end", "single"]);
        assert_eq!(lp.column("index").unwrap(), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_suppressed_chain_ends() {
        let names: Vec<String> = ["ALA", "CYS", "ASP"].iter().map(|s| s.to_string()).collect();
        let residues = sequence_3let_to_residues(&names, "A");

        let frame = sequence_to_nef_frame(&residues, &["A".to_string()], &["A".to_string()]);
        let lp = frame.get_loop(NEF_SEQUENCE).unwrap();
        assert_eq!(lp.column("linking").unwrap(), vec!["middle", "middle", "middle"]);
    }

    fn multi_chain_frame() -> SaveFrame {
        let residues = [("A", 3, "HIS"), ("A", 4, "MET"), ("B", 5, "ARG"), ("B", 6, "GLN"), ("C", 7, "PRO")]
            .into_iter()
            .map(|(chain_code, sequence_code, residue_name)| SequenceResidue {
                chain_code: chain_code.to_string(),
                sequence_code,
                residue_name: residue_name.to_string(),
            })
            .collect::<Vec<_>>();
        sequence_to_nef_frame(&residues, &[], &[])
    }

    #[test]
    fn test_frame_to_chains() {
        assert_eq!(frame_to_chains(&multi_chain_frame()), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_frame_to_chains_skips_unknown_chain() {
        let residue = SequenceResidue {
            chain_code: UNKNOWN.to_string(),
            sequence_code: 3,
            residue_name: "HIS".to_string(),
        };
        let frame = sequence_to_nef_frame(&[residue], &[], &[]);
        assert!(frame_to_chains(&frame).is_empty());
        assert!(frame_to_chains(&SaveFrame::from_scratch("empty", NEF_MOLECULAR_SYSTEM)).is_empty());
    }

    #[test]
    fn test_count_residues() {
        let frame = multi_chain_frame();
        let counts: BTreeMap<&str, BTreeMap<String, usize>> =
            ["A", "B", "C", "D"].into_iter().map(|chain| (chain, count_residues(&frame, chain))).collect();

        assert_eq!(counts["A"], BTreeMap::from([("HIS".to_string(), 1), ("MET".to_string(), 1)]));
        assert_eq!(counts["B"], BTreeMap::from([("ARG".to_string(), 1), ("GLN".to_string(), 1)]));
        assert_eq!(counts["C"], BTreeMap::from([("PRO".to_string(), 1)]));
        assert!(counts["D"].is_empty());
    }
}
