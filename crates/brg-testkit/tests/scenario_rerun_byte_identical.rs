//! Reproducible output
//!
//! GREEN when:
//! - two runs over the same inputs with the same injected timestamp write
//!   byte-identical corrected sequence, report and summary files

use anyhow::Result;
use brg_testkit::{run_with_yaml, ResultsDir};

#[test]
fn identical_inputs_produce_identical_files() -> Result<()> {
    let dir = ResultsDir::with_default_inputs()?;

    let first = run_with_yaml(&dir, &[])?;
    let seq1 = std::fs::read(&first.paths.corrected_sequence)?;
    let rep1 = std::fs::read(&first.paths.validation_report)?;
    let sum1 = std::fs::read(&first.paths.summary)?;

    let second = run_with_yaml(&dir, &[])?;
    assert_eq!(std::fs::read(&second.paths.corrected_sequence)?, seq1);
    assert_eq!(std::fs::read(&second.paths.validation_report)?, rep1);
    assert_eq!(std::fs::read(&second.paths.summary)?, sum1);
    assert_eq!(first.sequence, second.sequence);
    Ok(())
}
