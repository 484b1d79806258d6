//! Core type bindings for Python.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::cards::{Card, CardKind};
use crate::core::GameError;

impl From<GameError> for PyErr {
    fn from(err: GameError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Python wrapper for Card.
#[pyclass(name = "Card")]
#[derive(Clone, Debug)]
pub struct PyCard(pub Card);

#[pymethods]
impl PyCard {
    /// Session-unique card ID, used to place the card.
    #[getter]
    fn id(&self) -> u32 {
        self.0.id.raw()
    }

    /// Board value. Zero for an unresolved swap or wild card.
    #[getter]
    fn value(&self) -> u8 {
        self.0.value
    }

    /// "standard", "swap" or "wild".
    #[getter]
    fn kind(&self) -> &'static str {
        match self.0.kind {
            CardKind::Standard => "standard",
            CardKind::Swap => "swap",
            CardKind::Wild => "wild",
        }
    }

    #[getter]
    fn is_ace(&self) -> bool {
        self.0.is_ace()
    }

    fn __repr__(&self) -> String {
        format!("Card({}, id={})", self.0, self.0.id)
    }

    fn __eq__(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
