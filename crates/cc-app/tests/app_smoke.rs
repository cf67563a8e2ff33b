//! Integration tests for the project services on the bundled demos.

use std::path::PathBuf;

use cc_app::{evaluate_project, load_project, match_speed, save_project};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

#[test]
fn straight_through_demo_evaluates() {
    let project = load_project(&demo("straight_through.yaml")).unwrap();
    let evaluation = evaluate_project(&project).unwrap();

    assert_eq!(evaluation.kind, "straight-through");
    assert_eq!(evaluation.sections.len(), 1);
    let section = &evaluation.sections[0];
    assert_eq!(section.tests.len(), 3);
    assert!((evaluation.speed_rpm - 7894.0).abs() < 1e-6);
    assert!(section.specified.eff > 0.6 && section.specified.eff < 0.85);
    assert!((section.specified.flow_v / section.guarantee.flow_v - 1.0).abs() < 1e-9);
    assert_eq!(evaluation.mechanical_losses, 0.0);

    let text = evaluation.to_string();
    assert!(text.contains("straight-through compressor"), "{text}");
    assert!(text.contains("shaft power"), "{text}");
}

#[test]
fn back_to_back_demo_evaluates() {
    let project = load_project(&demo("back_to_back.yaml")).unwrap();
    let evaluation = evaluate_project(&project).unwrap();

    assert_eq!(evaluation.kind, "back-to-back");
    assert_eq!(evaluation.sections.len(), 2);
    let second = &evaluation.sections[1];
    assert!((second.specified.discharge_p / 15e5 - 1.0).abs() < 0.05);
}

#[test]
fn matched_speed_is_saved_and_reproduced() {
    let project = load_project(&demo("straight_through.yaml")).unwrap();
    let (updated, evaluation) = match_speed(&project).unwrap();

    assert!(updated.speed.is_some());
    let specified = &evaluation.sections[0].specified;
    assert!((specified.discharge_p / 6.4e5 - 1.0).abs() < 1e-6);
    assert!(evaluation.speed_rpm > 7894.0);

    let path = std::env::temp_dir().join("cc_app_matched_speed.yaml");
    save_project(&path, &updated).unwrap();
    let reloaded = load_project(&path).unwrap();
    assert_eq!(reloaded, updated);

    let again = evaluate_project(&reloaded).unwrap();
    assert_eq!(again, evaluate_project(&updated).unwrap());
    assert!((again.speed_rpm / evaluation.speed_rpm - 1.0).abs() < 1e-12);
    assert!((again.sections[0].specified.discharge_p / 6.4e5 - 1.0).abs() < 1e-6);
}

#[test]
fn project_round_trip_reproduces_results() {
    let project = load_project(&demo("straight_through.yaml")).unwrap();
    let path = std::env::temp_dir().join("cc_app_round_trip.json");
    save_project(&path, &project).unwrap();
    let reloaded = load_project(&path).unwrap();
    assert_eq!(
        evaluate_project(&project).unwrap(),
        evaluate_project(&reloaded).unwrap()
    );
}
