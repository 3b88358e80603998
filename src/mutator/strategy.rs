use crate::editor::EditorConfig;
use crate::model::{RepeatStrategy, StepGroupNode, StepNode, Strategy};

/// Computes the looping strategy a step group should carry after `new_step`
/// was added to it or edited inside it.
///
/// A group made only of looping steps (`config.looping_step_kind`) repeats
/// over `config.repeat_items` one item at a time. Returns `None` when the rule
/// does not apply or the group already has a strategy of its own.
pub fn derive_strategy(
    group: &StepGroupNode,
    leaf_steps: &[&StepNode],
    new_step: &StepNode,
    config: &EditorConfig,
) -> Option<Strategy> {
    if !config.auto_strategy {
        return None;
    }
    if group.strategy.as_ref().is_some_and(|s| !s.is_empty()) {
        return None;
    }

    let looping = |step: &StepNode| step.kind == config.looping_step_kind;
    if !looping(new_step) || !leaf_steps.iter().all(|step| looping(step)) {
        return None;
    }

    Some(Strategy::repeat(RepeatStrategy::sequential(
        config.repeat_items.clone(),
    )))
}
