//! Two-phase training protocol.
//!
//! An estimator is fed batches of documents through [`Estimator::fit`] until it
//! has seen enough, then [`Estimator::complete_training`] finalizes it and
//! publishes whatever it learned into the shared [`AnnotationMaps`].
//! A [`TransformerEstimator`] can afterwards produce a transformer from the
//! finalized state.
//!
//! Multi-stage featurizers are expressed as a [`PipelineEstimator`]: a head
//! stage that collects statistics and a tail stage built from the head's
//! published annotation.

pub mod document_statistics;

use std::fmt;

use crate::{
    error::{FeaturizerError, Result},
    vectorizer::annotation::AnnotationMaps,
};

pub use document_statistics::DocumentStatisticsEstimator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainingState {
    /// not built yet (pipeline tail before its head completed)
    Pending,
    Training,
    Finished,
}

/// What an estimator wants after consuming a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitResult {
    /// feed the next batch
    Continue,
    /// enough data, stop feeding
    Complete,
    /// feed everything again from the first batch
    ResetAndContinue,
}

pub trait Estimator {
    fn name(&self) -> &'static str;

    fn state(&self) -> TrainingState;

    /// Consume one batch of documents. Only valid while `Training`.
    fn fit(&mut self, batch: &[&str]) -> Result<FitResult>;

    /// Finalize and publish. Only valid while `Training`, moves to `Finished`.
    fn complete_training(&mut self, annotations: &mut AnnotationMaps) -> Result<()>;
}

pub trait TransformerEstimator: Estimator {
    type Transformer;

    /// Build the transformer. Fails with `NotFinished` before `complete_training`.
    fn create_transformer(&self, annotations: &AnnotationMaps) -> Result<Self::Transformer>;
}

pub(crate) fn ensure_training(name: &str, state: TrainingState) -> Result<()> {
    match state {
        TrainingState::Training => Ok(()),
        other => Err(FeaturizerError::not_training(format!("{name} is {other:?}"))),
    }
}

pub(crate) fn ensure_finished(name: &str, state: TrainingState) -> Result<()> {
    match state {
        TrainingState::Finished => Ok(()),
        other => Err(FeaturizerError::not_finished(format!("{name} is {other:?}"))),
    }
}

/// Run the fit loop over `batches`, then complete training.
///
/// - `Continue` moves to the next batch
/// - `Complete` stops feeding early
/// - `ResetAndContinue` starts over from the first batch
pub fn train<'a, E, B>(estimator: &mut E, batches: &[B], annotations: &mut AnnotationMaps) -> Result<()>
where
    E: Estimator + ?Sized,
    B: AsRef<[&'a str]>,
{
    let mut next = 0;
    while next < batches.len() {
        match estimator.fit(batches[next].as_ref())? {
            FitResult::Continue => next += 1,
            FitResult::Complete => {
                log::debug!("{} complete after {} batch(es)", estimator.name(), next + 1);
                break;
            }
            FitResult::ResetAndContinue => {
                log::debug!("{} requested another pass", estimator.name());
                next = 0;
            }
        }
    }
    estimator.complete_training(annotations)
}

type TailFactory<T> = Box<dyn FnOnce(&AnnotationMaps) -> Result<T> + Send + Sync>;

/// Head stage followed by a tail stage built lazily from the annotations the
/// head publishes.
///
/// Training input goes to the head only. `complete_training` completes the
/// head, builds the tail and completes it too. Transformers come from the tail.
pub struct PipelineEstimator<H, T> {
    name: &'static str,
    head: H,
    make_tail: Option<TailFactory<T>>,
    tail: Option<T>,
}

impl<H, T> PipelineEstimator<H, T>
where
    H: Estimator,
    T: Estimator,
{
    pub fn from_stages<F>(name: &'static str, head: H, make_tail: F) -> Self
    where
        F: FnOnce(&AnnotationMaps) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            name,
            head,
            make_tail: Some(Box::new(make_tail)),
            tail: None,
        }
    }

    #[inline]
    pub fn head(&self) -> &H {
        &self.head
    }

    /// `None` until training completed
    #[inline]
    pub fn tail(&self) -> Option<&T> {
        self.tail.as_ref()
    }

    pub fn tail_state(&self) -> TrainingState {
        self.tail
            .as_ref()
            .map_or(TrainingState::Pending, |tail| tail.state())
    }
}

impl<H, T> Estimator for PipelineEstimator<H, T>
where
    H: Estimator,
    T: Estimator,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn state(&self) -> TrainingState {
        match &self.tail {
            Some(tail) => tail.state(),
            None => self.head.state(),
        }
    }

    fn fit(&mut self, batch: &[&str]) -> Result<FitResult> {
        ensure_training(self.name, self.state())?;
        self.head.fit(batch)
    }

    fn complete_training(&mut self, annotations: &mut AnnotationMaps) -> Result<()> {
        ensure_training(self.name, self.state())?;
        self.head.complete_training(annotations)?;

        let make_tail = self
            .make_tail
            .take()
            .ok_or_else(|| FeaturizerError::not_training(format!("{} tail already built", self.name)))?;
        let mut tail = make_tail(annotations)?;
        if tail.state() == TrainingState::Training {
            tail.complete_training(annotations)?;
        }
        log::debug!("{}: {} -> {} finished", self.name, self.head.name(), tail.name());
        self.tail = Some(tail);
        Ok(())
    }
}

impl<H, T> TransformerEstimator for PipelineEstimator<H, T>
where
    H: Estimator,
    T: TransformerEstimator,
{
    type Transformer = T::Transformer;

    fn create_transformer(&self, annotations: &AnnotationMaps) -> Result<Self::Transformer> {
        match &self.tail {
            Some(tail) => tail.create_transformer(annotations),
            None => Err(FeaturizerError::not_finished(format!(
                "{} has not completed training",
                self.name
            ))),
        }
    }
}

impl<H: fmt::Debug, T: fmt::Debug> fmt::Debug for PipelineEstimator<H, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineEstimator")
            .field("name", &self.name)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records batches; asks for one extra pass, stops at `stop_after` documents.
    #[derive(Debug)]
    struct Recorder {
        state: TrainingState,
        seen: Vec<String>,
        resets_left: usize,
        stop_after: usize,
    }

    impl Recorder {
        fn new(resets: usize, stop_after: usize) -> Self {
            Self {
                state: TrainingState::Training,
                seen: Vec::new(),
                resets_left: resets,
                stop_after,
            }
        }
    }

    impl Estimator for Recorder {
        fn name(&self) -> &'static str {
            "Recorder"
        }

        fn state(&self) -> TrainingState {
            self.state
        }

        fn fit(&mut self, batch: &[&str]) -> Result<FitResult> {
            ensure_training(self.name(), self.state)?;
            self.seen.extend(batch.iter().map(|s| s.to_string()));
            if self.seen.len() >= self.stop_after {
                return Ok(FitResult::Complete);
            }
            if batch.contains(&"last") && self.resets_left > 0 {
                self.resets_left -= 1;
                return Ok(FitResult::ResetAndContinue);
            }
            Ok(FitResult::Continue)
        }

        fn complete_training(&mut self, _annotations: &mut AnnotationMaps) -> Result<()> {
            ensure_training(self.name(), self.state)?;
            self.state = TrainingState::Finished;
            Ok(())
        }
    }

    impl TransformerEstimator for Recorder {
        type Transformer = usize;

        fn create_transformer(&self, _annotations: &AnnotationMaps) -> Result<usize> {
            ensure_finished(self.name(), self.state)?;
            Ok(self.seen.len())
        }
    }

    #[test]
    fn train_feeds_every_batch_then_completes() {
        let mut est = Recorder::new(0, usize::MAX);
        let mut maps = AnnotationMaps::new(1);
        train(&mut est, &[vec!["a", "b"], vec!["last"]], &mut maps).unwrap();
        assert_eq!(est.seen, vec!["a", "b", "last"]);
        assert_eq!(est.state(), TrainingState::Finished);
    }

    #[test]
    fn reset_restarts_from_first_batch() {
        let mut est = Recorder::new(1, usize::MAX);
        let mut maps = AnnotationMaps::new(1);
        train(&mut est, &[["a"], ["last"]], &mut maps).unwrap();
        assert_eq!(est.seen, vec!["a", "last", "a", "last"]);
    }

    #[test]
    fn complete_stops_early() {
        let mut est = Recorder::new(0, 2);
        let mut maps = AnnotationMaps::new(1);
        train(&mut est, &[["a"], ["b"], ["c"]], &mut maps).unwrap();
        assert_eq!(est.seen, vec!["a", "b"]);
        assert_eq!(est.state(), TrainingState::Finished);
    }

    #[test]
    fn protocol_order_is_enforced() {
        let mut est = Recorder::new(0, usize::MAX);
        let mut maps = AnnotationMaps::new(1);
        assert!(matches!(est.create_transformer(&maps), Err(FeaturizerError::NotFinished(_))));

        est.complete_training(&mut maps).unwrap();
        assert!(matches!(est.fit(&["x"]), Err(FeaturizerError::NotTraining(_))));
        assert!(matches!(est.complete_training(&mut maps), Err(FeaturizerError::NotTraining(_))));
        assert_eq!(est.create_transformer(&maps).unwrap(), 0);
    }

    #[test]
    fn pipeline_builds_tail_on_completion() {
        let head = Recorder::new(0, usize::MAX);
        let mut pipeline = PipelineEstimator::from_stages("Pipe", head, |_maps: &AnnotationMaps| {
            Ok(Recorder::new(0, usize::MAX))
        });
        let mut maps = AnnotationMaps::new(1);

        assert_eq!(pipeline.state(), TrainingState::Training);
        assert_eq!(pipeline.tail_state(), TrainingState::Pending);
        assert!(matches!(pipeline.create_transformer(&maps), Err(FeaturizerError::NotFinished(_))));

        pipeline.fit(&["a", "b"]).unwrap();
        pipeline.complete_training(&mut maps).unwrap();

        assert_eq!(pipeline.head().seen, vec!["a", "b"]);
        assert_eq!(pipeline.state(), TrainingState::Finished);
        assert_eq!(pipeline.tail_state(), TrainingState::Finished);
        // tail saw no documents
        assert_eq!(pipeline.create_transformer(&maps).unwrap(), 0);
        assert!(matches!(pipeline.fit(&["c"]), Err(FeaturizerError::NotTraining(_))));
        assert!(matches!(pipeline.complete_training(&mut maps), Err(FeaturizerError::NotTraining(_))));
    }

    #[test]
    fn failing_tail_factory_propagates() {
        let mut pipeline = PipelineEstimator::from_stages(
            "Pipe",
            Recorder::new(0, usize::MAX),
            |_maps: &AnnotationMaps| -> Result<Recorder> { Err(FeaturizerError::invalid_argument("colIndex")) },
        );
        let mut maps = AnnotationMaps::new(1);
        assert!(matches!(
            pipeline.complete_training(&mut maps),
            Err(FeaturizerError::InvalidArgument(_))
        ));
    }
}
