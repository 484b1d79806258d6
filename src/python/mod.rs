//! Python bindings for the minigame engines.
//!
//! # Quick Start
//!
//! ```python
//! import minigame_hub as hub
//!
//! game = hub.StackemGame(chips=500, difficulty="medium", seed=7)
//! game.deal()
//! top = game.hand[0]
//! game.place(top.id, 1, 1)
//!
//! crash = hub.CrashGame(chips=500)
//! crash.set_auto_cash_out(2.0)
//! crash.launch(25)
//! while crash.tick() == "running":
//!     pass
//! ```

use pyo3::prelude::*;

mod py_core;
mod py_games;

pub use py_core::*;
pub use py_games::*;

/// minigame_hub: Stack'em and Space Crash engines.
#[pymodule]
fn minigame_hub(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCard>()?;
    m.add_class::<PyStackemGame>()?;
    m.add_class::<PyCrashGame>()?;
    Ok(())
}
