//! Layouts registered by [`LayoutRegistry::with_builtins`](crate::LayoutRegistry::with_builtins)

pub mod circlepack;
pub mod circular;
pub mod force;
pub mod layered;
pub mod random;
pub mod script;

use crate::config::LayoutConfig;
use crate::Layout;

/// Builtin layouts in presentation order
pub fn layouts(config: &LayoutConfig) -> Vec<Layout> {
    vec![
        random::layout().into(),
        circular::layout().into(),
        circlepack::layout().into(),
        layered::layout().into(),
        script::layout(&config.script).into(),
        force::layout().into(),
    ]
}
