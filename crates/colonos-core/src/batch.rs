//! Batch orchestration.
//!
//! One pass over the residents in submitted order: derive the code, render
//! it, name the file. A resident that fails to render is recorded in
//! `failures` and the pass moves on; only a bad batch-level precondition
//! (blank address, no residents, blank name) stops the batch before it starts.

use std::time::Instant;

use crate::code::derive;
use crate::domain::{
    Artifact, BatchResult, ColonosError, GenerationOptions, ResidentFailure, ResidentInput, Result,
};
use crate::encoder::{EncodeOutcome, Renderer};
use crate::metrics::METRICS;
use crate::naming::name_for;
use crate::obs;

/// Drives derivation, rendering and naming over one batch.
#[derive(Default)]
pub struct BatchOrchestrator {
    renderer: Renderer,
}

impl BatchOrchestrator {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }

    /// Generate one artifact per resident.
    ///
    /// Returns [`ColonosError::InvalidInput`] without attempting anyone when
    /// the address is blank, the list is empty, or a name is blank.
    pub fn run(
        &self,
        residents: &[ResidentInput],
        options: &GenerationOptions,
    ) -> Result<BatchResult> {
        if let Err(e) = validate(residents, options) {
            obs::emit_batch_rejected(&options.address, residents.len(), &e);
            return Err(e);
        }

        let address = options.address.trim();
        let mut result = BatchResult::new(address);
        let _span = obs::BatchSpan::enter(&result.batch_id, address);
        let started = Instant::now();
        obs::emit_batch_started(
            residents.len(),
            &options.code_prefix,
            options.include_lot_number,
        );

        for resident in residents {
            match self.generate_one(resident, options) {
                Ok(artifact) => result.artifacts.push(artifact),
                Err(e) => result.failures.push(ResidentFailure {
                    ordinal: resident.ordinal,
                    name: resident.name.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        obs::emit_batch_finished(
            result.artifacts.len(),
            result.failures.len(),
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        Ok(result)
    }

    fn generate_one(
        &self,
        resident: &ResidentInput,
        options: &GenerationOptions,
    ) -> Result<Artifact> {
        let name = resident.name.trim();
        let code = derive(
            &options.address,
            name,
            resident.ordinal,
            &options.code_prefix,
            options.include_lot_number,
        )?;
        METRICS.inc_codes_derived();

        let outcome = self.renderer.attempt(&code);
        match &outcome {
            EncodeOutcome::FixedConfigSucceeded(_) => METRICS.inc_fixed_encodes(),
            EncodeOutcome::AutoConfigSucceeded(_) => METRICS.inc_auto_fallbacks(),
            EncodeOutcome::Failed(reason) => {
                METRICS.inc_encode_failures();
                obs::emit_resident_failed(resident.ordinal, &code, reason);
            }
        }
        let (image, encoder_path) = outcome.into_result(&code)?;
        obs::emit_artifact_generated(resident.ordinal, &code, encoder_path, image.width());

        let normalized = ResidentInput::new(name, resident.ordinal);
        Ok(Artifact {
            ordinal: resident.ordinal,
            file_name: name_for(&normalized),
            name: normalized.name,
            code,
            image,
            encoder_path,
        })
    }
}

/// Run a batch with the default QR renderer.
pub fn run_batch(residents: &[ResidentInput], options: &GenerationOptions) -> Result<BatchResult> {
    BatchOrchestrator::default().run(residents, options)
}

fn validate(residents: &[ResidentInput], options: &GenerationOptions) -> Result<()> {
    if options.address.trim().is_empty() {
        return Err(ColonosError::InvalidInput(
            "address must not be empty".to_string(),
        ));
    }
    if residents.is_empty() {
        return Err(ColonosError::InvalidInput(
            "at least one resident is required".to_string(),
        ));
    }
    if let Some(blank) = residents.iter().find(|r| r.name.trim().is_empty()) {
        return Err(ColonosError::InvalidInput(format!(
            "resident #{} has an empty name",
            blank.ordinal
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{residents_from_names, BatchStatus};
    use crate::obs::capture::record;
    use crate::encoder::{
        EncoderConfig, ErrorCorrection, Sizing, SymbolEncoder, SymbolError, SymbolMatrix,
    };

    /// Rejects any payload containing "bad", otherwise returns a 1x1 matrix.
    struct RejectsBad;

    impl SymbolEncoder for RejectsBad {
        fn encode(
            &self,
            text: &str,
            _sizing: Sizing,
            _level: ErrorCorrection,
        ) -> std::result::Result<SymbolMatrix, SymbolError> {
            if text.contains("bad") {
                Err(SymbolError("payload rejected".to_string()))
            } else {
                Ok(SymbolMatrix::new(1, vec![true]))
            }
        }
    }

    fn orchestrator_rejecting_bad() -> BatchOrchestrator {
        BatchOrchestrator::new(Renderer::new(Box::new(RejectsBad), EncoderConfig::default()))
    }

    #[test]
    fn identical_names_get_distinct_codes_without_lot() {
        let residents = residents_from_names(["Ana", "", "Ana"]);
        let options = GenerationOptions::new("Calle 10")
            .with_prefix("x")
            .with_lot_number(false);
        let result = run_batch(&residents, &options).expect("batch");

        let codes: Vec<_> = result.artifacts.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, ["xana1", "xana2"]);
        assert!(result.failures.is_empty());
        assert_eq!(result.status(), BatchStatus::Succeeded);
    }

    #[test]
    fn lot_number_suffix_is_shared() {
        let residents = residents_from_names(["Ana", "Beto"]);
        let options = GenerationOptions::new("Calle 10").with_prefix("g");
        let result = run_batch(&residents, &options).expect("batch");

        let codes: Vec<_> = result.artifacts.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, ["gana10", "gbeto10"]);
        assert_eq!(result.artifacts[0].file_name, "QR_Ana.png");
        assert_eq!(result.artifacts[1].file_name, "QR_Beto.png");
    }

    #[test]
    fn failure_does_not_abort_batch() {
        let residents = residents_from_names(["Ana", "Bad Actor", "Carla"]);
        let options = GenerationOptions::new("Lote 15");
        let result = orchestrator_rejecting_bad()
            .run(&residents, &options)
            .expect("batch");

        assert_eq!(result.attempted(), 3);
        assert_eq!(result.artifacts.len(), 2);
        assert_eq!(result.artifacts[0].ordinal, 1);
        assert_eq!(result.artifacts[1].ordinal, 3);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].ordinal, 2);
        assert!(result.failures[0].reason.contains("payload rejected"));
        assert_eq!(result.status(), BatchStatus::PartiallySucceeded);
        assert!(result.is_success());
    }

    #[test]
    fn all_failures_is_complete_failure() {
        let residents = residents_from_names(["Bad One", "Bad Two"]);
        let result = orchestrator_rejecting_bad()
            .run(&residents, &GenerationOptions::new("Lote 15"))
            .expect("batch");
        assert!(result.artifacts.is_empty());
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.status(), BatchStatus::Failed);
    }

    #[test]
    fn empty_resident_list_is_invalid_input() {
        let residents = residents_from_names(["", "  "]);
        let err = run_batch(&residents, &GenerationOptions::new("Calle 10")).unwrap_err();
        assert!(matches!(err, ColonosError::InvalidInput(_)));
    }

    #[test]
    fn blank_address_is_invalid_input() {
        let residents = residents_from_names(["Ana"]);
        let err = run_batch(&residents, &GenerationOptions::new("  ")).unwrap_err();
        assert!(matches!(err, ColonosError::InvalidInput(_)));
    }

    #[test]
    fn rejected_batch_is_logged_before_returning() {
        let (outcome, events) =
            record(|| run_batch(&[], &GenerationOptions::new("Calle 10")));
        assert!(matches!(outcome, Err(ColonosError::InvalidInput(_))));

        let rejected: Vec<_> = events
            .iter()
            .filter(|e| e.event.as_deref() == Some("batch.rejected"))
            .collect();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].level, tracing::Level::WARN);
        assert!(events
            .iter()
            .all(|e| e.event.as_deref() != Some("batch.started")));
    }

    #[test]
    fn blank_name_is_rejected_before_any_attempt() {
        let residents = vec![ResidentInput::new("Ana", 1), ResidentInput::new(" ", 2)];
        let err = run_batch(&residents, &GenerationOptions::new("Calle 10")).unwrap_err();
        match err {
            ColonosError::InvalidInput(msg) => assert!(msg.contains("#2")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn artifacts_keep_submitted_order() {
        let residents = residents_from_names(["Zoe", "Ana", "Mia"]);
        let result = run_batch(&residents, &GenerationOptions::new("Privada")).expect("batch");
        let names: Vec<_> = result.artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Zoe", "Ana", "Mia"]);
        let codes: Vec<_> = result.artifacts.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, ["girasolzoe1", "girasolana2", "girasolmia3"]);
    }
}
