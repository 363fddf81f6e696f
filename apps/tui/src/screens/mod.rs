//! TUI screen definitions.
//!
//! The wizard is a single screen; each wizard step renders inside it.

pub(crate) mod wizard;

pub(crate) use wizard::{ScreenAction, WizardScreen};
