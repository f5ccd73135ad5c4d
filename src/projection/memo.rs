//! Compute-once state for projector outputs

use crate::error::Result;

/// Either not yet computed, or computed and frozen
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Memo<T> {
    #[default]
    Uncomputed,
    Computed(T),
}

impl<T> Memo<T> {
    pub fn is_computed(&self) -> bool {
        matches!(self, Memo::Computed(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Memo::Computed(value) => Some(value),
            Memo::Uncomputed => None,
        }
    }

    /// Run `compute` on first access only; a failed computation leaves the
    /// memo uncomputed so nothing partial is ever stored
    pub fn get_or_try_compute<F>(&mut self, compute: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Memo::Uncomputed = self {
            *self = Memo::Computed(compute()?);
        }
        match self {
            Memo::Computed(value) => Ok(value),
            Memo::Uncomputed => unreachable!("memo populated above"),
        }
    }
}
