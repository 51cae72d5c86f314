//! Doctor command: diagnose keys, corpus, and index state.

use crate::cli::Output;
use crate::config::{Settings, OPENAI_API_KEY_VAR, WEATHER_API_KEY_VAR};
use crate::vector_store::index_exists;
use anyhow::Result;

/// Run the doctor command.
pub fn run_doctor(settings: &Settings) -> Result<()> {
    Output::header("Reise Doctor");
    println!();

    let mut all_ok = true;

    all_ok &= check_env_var(OPENAI_API_KEY_VAR);
    all_ok &= check_env_var(WEATHER_API_KEY_VAR);

    let corpus = settings.corpus_path();
    if corpus.exists() {
        Output::success(&format!("Corpus file found: {:?}", corpus));
    } else {
        Output::warning(&format!(
            "Corpus file missing: {:?} (needed for 'reise build')",
            corpus
        ));
        all_ok = false;
    }

    let index_dir = settings.index_dir();
    if index_exists(&index_dir) {
        Output::success(&format!("Vector index present: {:?}", index_dir));
    } else {
        Output::warning(&format!(
            "Vector index not built: {:?} (run 'reise build')",
            index_dir
        ));
        all_ok = false;
    }

    println!();
    if all_ok {
        Output::success("All checks passed.");
    } else {
        Output::warning("Some checks failed; see above.");
    }

    Ok(())
}

fn check_env_var(name: &str) -> bool {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => {
            Output::success(&format!("{} is set", name));
            true
        }
        _ => {
            Output::warning(&format!(
                "{} is not set. Set it with: export {}='...'",
                name, name
            ));
            false
        }
    }
}
