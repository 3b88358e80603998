//! Integration tests for editing sessions.
//!
//! These exercise the editor end to end: gesture requests in, committed trees
//! and refreshed node states out.
mod common;
use common::*;
use std::cell::RefCell;
use std::rc::Rc;
use stepgraph::prelude::*;

/// What a commit handler saw, recorded as owned data.
#[derive(Debug, Clone, PartialEq)]
enum Committed {
    Tree(Vec<String>),
    Dependencies(Vec<String>),
}

fn recording_editor(tree: ExecutionTree) -> (StageEditor, Rc<RefCell<Vec<Committed>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let editor = StageEditor::builder(tree)
        .with_dependencies(vec![DependencyNode::new("db", "Service")])
        .with_commit_handler(move |commit: Commit<'_>| {
            let entry = match commit {
                Commit::Tree(tree) => Committed::Tree(identifiers(tree)),
                Commit::Dependencies(deps) => {
                    Committed::Dependencies(deps.iter().map(|d| d.identifier.clone()).collect())
                }
            };
            sink.borrow_mut().push(entry);
        })
        .build();
    (editor, log)
}

#[cfg(test)]
mod editor_tests {
    use super::*;

    #[test]
    fn test_successful_edit_commits_new_tree() {
        let (mut editor, log) = recording_editor(tree(vec![step("A"), step("B")]));
        let outcome = editor
            .insert(
                step("C"),
                InsertRequest::Parallel {
                    destination: NodeRef::new("B"),
                },
            )
            .unwrap();

        assert!(outcome.is_inserted());
        assert_eq!(
            log.borrow().as_slice(),
            &[Committed::Tree(vec!["A".into(), "B".into(), "C".into()])]
        );
        assert!(editor.states().contains("C"));
    }

    #[test]
    fn test_failed_edit_does_not_commit() {
        let (mut editor, log) = recording_editor(tree(vec![step("A")]));
        let outcome = editor
            .insert(
                step("C"),
                InsertRequest::Link {
                    source: Some(NodeRef::new("x")),
                    target: None,
                },
            )
            .unwrap();
        assert_eq!(outcome, InsertOutcome::TargetNotFound);
        assert!(!editor.remove(&path("steps.4.step")).unwrap());
        assert!(log.borrow().is_empty());
        assert_eq!(editor.tree(), &tree(vec![step("A")]));
    }

    #[test]
    fn test_path_errors_surface_as_editor_errors() {
        let (mut editor, _log) = recording_editor(tree(vec![step("A")]));
        let err = editor.remove(&path("steps.0.task")).unwrap_err();
        assert!(matches!(err, EditorError::Path(PathError::UnknownToken { .. })));
        assert_eq!(err.to_string(), "Path 'steps.0.task' contains unknown token 'task'");
    }

    #[test]
    fn test_collapse_survives_edits_but_saved_does_not() {
        let (mut editor, _log) = recording_editor(deployment_tree());
        assert!(editor.set_collapsed("deploy", true));
        editor.mark_saved();
        assert!(editor.states().get("fetch").is_saved);

        editor
            .insert(
                step("smoke"),
                InsertRequest::ContainerAppend {
                    destination: Some(NodeRef::new("deploy")),
                    rollback: false,
                },
            )
            .unwrap();

        let deploy = editor.states().get("deploy");
        assert!(deploy.is_step_group_collapsed);
        assert!(!deploy.is_saved);
        assert!(!editor.states().get("fetch").is_saved);
        assert!(!editor.states().get("smoke").is_saved);

        editor.mark_saved();
        assert!(editor.states().iter().all(|(_, state)| state.is_saved));
    }

    #[test]
    fn test_reload_starts_states_over() {
        let (mut editor, log) = recording_editor(deployment_tree());
        editor.set_collapsed("deploy", true);
        editor.reload(deployment_tree());
        assert!(!editor.states().get("deploy").is_step_group_collapsed);
        // reloading is not an edit
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_remove_by_identifier_falls_back_to_dependencies() {
        let (mut editor, log) = recording_editor(deployment_tree());
        assert!(editor.states().contains("db"));

        assert!(editor.remove_by_identifier("db").unwrap());
        assert!(editor.dependencies().is_empty());
        assert!(!editor.states().contains("db"));
        assert_eq!(
            log.borrow().last(),
            Some(&Committed::Dependencies(Vec::new()))
        );

        assert!(!editor.remove_by_identifier("db").unwrap());
        assert!(editor.remove_by_identifier("verify").unwrap());
        assert!(!editor.states().contains("verify"));
    }

    #[test]
    fn test_add_dependency_commits_and_tracks_state() {
        let (mut editor, log) = recording_editor(tree(vec![]));
        editor.add_dependency(DependencyNode::new("cache", "Service"));
        assert_eq!(
            log.borrow().as_slice(),
            &[Committed::Dependencies(vec!["db".into(), "cache".into()])]
        );
        assert_eq!(editor.states().get("cache").step_type, StepType::Service);
    }

    #[test]
    fn test_update_step_through_editor() {
        let (mut editor, _log) = recording_editor(deployment_tree());
        let updated = editor
            .update_step(
                &path(STAGE_PREFIX).join(&path("steps.0.step")),
                StepNode::new("fetch", "GitClone"),
            )
            .unwrap();
        assert!(updated);
        assert_eq!(editor.tree().steps[0].as_step().map(|s| s.kind.as_str()), Some("GitClone"));
    }

    #[test]
    fn test_editor_index_uses_configured_prefix() {
        let editor = StageEditor::builder(deployment_tree())
            .with_path_prefix(path(STAGE_PREFIX))
            .build();
        let index = editor.index();
        let entry = index.by_identifier("fetch").unwrap();
        assert_eq!(entry.absolute.to_string(), format!("{}.steps.0.step", STAGE_PREFIX));
    }

    #[test]
    fn test_editor_from_json_and_looping_kind() {
        let mut editor = StageEditor::from_json(DEPLOYMENT_JSON).unwrap();
        assert_eq!(editor.config(), &EditorConfig::default());
        assert_eq!(editor.tree(), &deployment_tree());

        let mut looping = StageEditor::builder(tree(vec![group("g", vec![])]))
            .with_looping_step_kind("Http")
            .build();
        looping
            .insert(
                ExecutionNode::step("probe", "Http"),
                InsertRequest::ContainerAppend {
                    destination: Some(NodeRef::new("g")),
                    rollback: false,
                },
            )
            .unwrap();
        assert!(looping.tree().steps[0].as_step_group().unwrap().strategy.is_some());

        assert!(matches!(
            StageEditor::from_json("{\"steps\": 3}"),
            Err(EditorError::Json(_))
        ));
        assert!(editor.remove_by_identifier("fetch").unwrap());
    }

    #[test]
    fn test_editor_config_from_partial_json() {
        let config = EditorConfig::from_json(
            r#"{ "loopingStepKind": "Http", "pathPrefix": "stage.spec.execution" }"#,
        )
        .unwrap();
        assert_eq!(config.looping_step_kind, "Http");
        assert_eq!(config.repeat_items, "<+stage.output.hosts>");
        assert_eq!(config.path_prefix, path("stage.spec.execution"));
        assert!(config.auto_strategy);

        let editor = StageEditor::builder(tree(vec![])).with_config(config.clone()).build();
        assert_eq!(editor.config(), &config);
    }
}
