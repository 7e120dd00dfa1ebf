use crate::Mechanism::mech_store::MechanismError;
use crate::Sorter::rxn_class::ClassifierError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SorterError {
    #[error("unknown sort criterion '{0}'")]
    UnknownCriterion(String),
    #[error("the sort specification has no criteria")]
    EmptySpec,
    #[error("criterion '{0}' requires isolate species")]
    MissingIsolateSpecies(String),
    #[error("invalid sort input: {0}")]
    SortInput(String),
    #[error("classification of {reaction} failed: {source}")]
    Classifier {
        reaction: String,
        #[source]
        source: ClassifierError,
    },
    #[error(transparent)]
    Mechanism(#[from] MechanismError),
}
