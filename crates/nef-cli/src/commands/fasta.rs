//! FASTA sequence import command implementation.

use crate::cli::SequenceArgs;
use crate::error::{CliError, Result};
use crate::fasta::{self, ImportedSequence};
use crate::pipeline::{self, Context};
use nef_domain::sequence::{
    chain_code_iter, offset_chain_residues, sequence_3let_to_residues, sequence_to_nef_frame, translate_1_to_3,
};
use nef_domain::{MoleculeType, SequenceResidue};
use nef_io::SourceId;
use std::collections::HashMap;
use tracing::debug;

/// Entry id when neither the FASTA file nor the user names one
const DEFAULT_ENTRY_ID: &str = "fasta";

/// Execute the fasta import sequence command.
pub fn execute_fasta_sequence(args: SequenceArgs, ctx: &Context<'_>) -> Result<String> {
    let mut entry = pipeline::read_or_create_entry(ctx, args.input.pipe.as_deref(), args.entry_name.as_deref())?;

    let molecule_types: Vec<MoleculeType> = args.molecule_types.iter().map(|&m| m.into()).collect();
    let (residues, read_entry_id) = read_sequences(ctx, &args, &molecule_types)?;

    entry.entry_id = match (&args.entry_name, read_entry_id) {
        (Some(name), _) => name.clone(),
        (None, Some(read)) => read,
        (None, None) => DEFAULT_ENTRY_ID.to_string(),
    };

    let offsets = sequence_offsets(&chain_codes_in_order(&residues), &args.starts);
    let residues = offset_chain_residues(residues, &offsets);
    let frame = sequence_to_nef_frame(&residues, &args.no_chain_starts, &args.no_chain_ends);

    pipeline::stamp_and_add_frames(&mut entry, vec![frame], &pipeline::identity(file!()), ctx.clock)?;

    Ok(pipeline::emit(&entry))
}

/// Read all files and turn their sequences into residues
///
/// Also returns the entry id of the first sequence read.
fn read_sequences(
    ctx: &Context<'_>,
    args: &SequenceArgs,
    molecule_types: &[MoleculeType],
) -> Result<(Vec<SequenceResidue>, Option<String>)> {
    let mut sequences: Vec<ImportedSequence> = Vec::new();
    for path in &args.files {
        let lines = ctx.cache.lines(&SourceId::file(path))?;
        for record in fasta::read_records(lines, path)? {
            sequences.push(fasta::interpret(record, !args.no_header, path)?);
        }
    }
    debug!(sequences = sequences.len(), files = args.files.len(), "read fasta sequences");

    let molecule_types: Vec<MoleculeType> = match molecule_types {
        [single] => vec![*single; sequences.len()],
        types if types.len() >= sequences.len() => types.to_vec(),
        types => {
            return Err(CliError::InvalidInput(format!(
                "number of molecule types [{}] is different from number of chains [{}]",
                types.len(),
                sequences.len()
            )))
        }
    };

    let read_entry_id = sequences.first().map(|s| s.entry_id.clone());

    let mut residues = Vec::new();
    for ((sequence, chain_code), molecule_type) in
        sequences.into_iter().zip(chain_code_iter(&args.chain_codes)).zip(molecule_types)
    {
        let names = translate_1_to_3(&sequence.letters, molecule_type).map_err(|source| CliError::Translation {
            entry_id: sequence.entry_id.clone(),
            source,
        })?;

        let chain_code = sequence.chain_code.unwrap_or(chain_code);
        let chain_residues = sequence_3let_to_residues(&names, &chain_code);

        let header_offset = HashMap::from([(chain_code, sequence.start - 1)]);
        residues.extend(offset_chain_residues(chain_residues, &header_offset));
    }

    Ok((residues, read_entry_id))
}

/// Chain codes in order of first appearance
fn chain_codes_in_order(residues: &[SequenceResidue]) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for residue in residues {
        if !codes.contains(&residue.chain_code) {
            codes.push(residue.chain_code.clone());
        }
    }
    codes
}

/// Offsets from `--starts`: the first chains get `start - 1`, the rest none
fn sequence_offsets(chain_codes: &[String], starts: &[i64]) -> HashMap<String, i64> {
    chain_codes
        .iter()
        .zip(starts.iter().map(|start| start - 1).chain(std::iter::repeat(0)))
        .map(|(code, offset)| (code.clone(), offset))
        .collect()
}
