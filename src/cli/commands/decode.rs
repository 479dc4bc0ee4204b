//! `decode` command

use crate::cli::error::CliError;
use crate::cli::output::{format_card, format_review};
use crate::codec::Decoder;
use crate::export::to_yaml_string;
use crate::pipeline::review_samples;
use crate::validation::CardValidator;

use super::load_input;

/// Arguments for the `decode` command
#[derive(Debug)]
pub struct DecodeArgs {
    /// File of generated samples, `-` for stdin
    pub input: String,
    /// Print accepted cards as YAML instead of text
    pub yaml: bool,
    /// Skip the error-correction pre-pass
    pub strict: bool,
}

/// Handle the `decode` command
pub fn handle_decode(args: &DecodeArgs) -> Result<(), CliError> {
    let content = load_input(&args.input)?;

    let decoder = Decoder::standard().with_error_correction(!args.strict);
    let review = review_samples(&content, &decoder, &CardValidator::standard());

    if args.yaml {
        let yaml =
            to_yaml_string(&review.cards).map_err(|e| CliError::OutputError(e.to_string()))?;
        print!("{yaml}");
    } else {
        for card in &review.cards {
            println!("{}", format_card(card));
        }
    }

    eprint!("{}", format_review(&review));
    Ok(())
}
