use std::fmt;
use std::sync::Arc;

use super::error::TransformError;
use crate::domain::Record;

/// Predicate stage function; `Ok(false)` drops the record
pub type Predicate = Arc<dyn Fn(&Record) -> Result<bool, TransformError> + Send + Sync>;

/// Mapping stage function; always yields exactly one record
pub type Mapper = Arc<dyn Fn(Record) -> Result<Record, TransformError> + Send + Sync>;

/// One step of a pipeline
#[derive(Clone)]
pub enum Stage {
    Filter(Predicate),
    Map(Mapper),
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(_) => write!(f, "Filter(..)"),
            Self::Map(_) => write!(f, "Map(..)"),
        }
    }
}

/// Ordered, stateless composition of filter and map stages
///
/// A pipeline knows nothing about topics, tasks or transports, so it can be
/// exercised directly against literal records:
///
/// ```rust,ignore
/// let large = Pipeline::new()
///     .try_filter(field_at_least("amount", 100.0))
///     .try_map(select_fields(&["amount", "user-id"]));
///
/// let out = large.run(records)?;
/// ```
///
/// Stage errors are never caught here; they propagate to the caller, whose
/// error policy decides what happens next.
#[derive(Clone, Default)]
pub struct Pipeline {
    name: Option<String>,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Empty pipeline (passes every record through unchanged)
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty pipeline registered under the name `identity`
    pub fn identity() -> Self {
        Self::new().named("identity")
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Append a stage
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append an infallible filter stage
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.try_filter(move |record| Ok(predicate(record)))
    }

    /// Append a filter stage whose predicate may fail
    pub fn try_filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&Record) -> Result<bool, TransformError> + Send + Sync + 'static,
    {
        self.stage(Stage::Filter(Arc::new(predicate)))
    }

    /// Append an infallible map stage
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Record) -> Record + Send + Sync + 'static,
    {
        self.try_map(move |record| Ok(f(record)))
    }

    /// Append a map stage that may fail
    pub fn try_map<F>(self, f: F) -> Self
    where
        F: Fn(Record) -> Result<Record, TransformError> + Send + Sync + 'static,
    {
        self.stage(Stage::Map(Arc::new(f)))
    }

    /// Compose: stages of `self` run first, then stages of `next`
    ///
    /// The result is anonymous; composition is associative.
    pub fn then(mut self, next: Pipeline) -> Self {
        self.stages.extend(next.stages);
        self.name = None;
        self
    }

    /// Apply every stage in order to one record
    ///
    /// Returns `Ok(None)` as soon as a filter rejects the record; later
    /// stages never see it.
    pub fn apply(&self, record: Record) -> Result<Option<Record>, TransformError> {
        let mut current = record;
        for stage in &self.stages {
            match stage {
                Stage::Filter(predicate) => {
                    if !predicate(&current)? {
                        return Ok(None);
                    }
                }
                Stage::Map(f) => current = f(current)?,
            }
        }
        Ok(Some(current))
    }

    /// Apply the pipeline to a finite sequence of records
    pub fn run<I>(&self, records: I) -> Result<Vec<Record>, TransformError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut output = Vec::new();
        for record in records {
            if let Some(out) = self.apply(record)? {
                output.push(out);
            }
        }
        Ok(output)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .finish()
    }
}
