use gitmad::types::FIX_MARKER;
use gitmad::{GenerationError, GenerationOutput, Mode, RoastCard, RoastRequest};

#[path = "test_utils.rs"]
mod test_utils;
use test_utils::{Reply, ScriptedGenerator, client_for, fix_json, roast_json};

#[tokio::test]
async fn test_roast_parses_card() {
    let generator = ScriptedGenerator::new([Reply::ok(roast_json("The Spaghetti Chef"))]);
    let client = client_for(&generator);

    let output = client
        .generate(&RoastRequest::roast("function x() {}"))
        .await
        .expect("roast never fails");

    let card = output.into_roast().expect("roast card");
    assert_eq!(card.archetype, "The Spaghetti Chef");
    assert_eq!(card.stats.efficiency, 20);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_roast_accepts_fenced_reply() {
    let fenced = format!("```json\n{}\n```", roast_json("The Tangled Weaver"));
    let generator = ScriptedGenerator::new([Reply::ok(fenced)]);

    let card = client_for(&generator).roast("let a = 1;", None).await;
    assert_eq!(card.archetype, "The Tangled Weaver");
}

#[tokio::test]
async fn test_roast_failures_become_placeholder_card() {
    let replies = [
        Reply::fail("connection reset"),
        Reply::ok(""),
        Reply::ok("I refuse to answer in JSON"),
        Reply::ok(r#"{"archetype": "Half a Card"}"#),
    ];
    let generator = ScriptedGenerator::new(replies);
    let client = client_for(&generator);

    for _ in 0..4 {
        let output = client
            .generate(&RoastRequest::roast("x"))
            .await
            .expect("roast failures are absorbed");
        assert_eq!(output, GenerationOutput::Roast(RoastCard::system_failure()));
    }
    assert_eq!(generator.calls(), 4);
}

#[tokio::test]
async fn test_fix_failures_propagate() {
    let generator = ScriptedGenerator::new([Reply::fail("quota"), Reply::ok("")]);
    let client = client_for(&generator);

    assert!(matches!(
        client.fix("x").await,
        Err(GenerationError::Request(message)) if message == "quota"
    ));
    assert!(matches!(client.fix("x").await, Err(GenerationError::Empty)));
}

#[tokio::test]
async fn test_fix_rejects_card_shaped_reply() {
    let generator = ScriptedGenerator::new([Reply::ok(roast_json("Wrong Mode"))]);

    let result = client_for(&generator).fix("x").await;
    assert!(matches!(
        result,
        Err(GenerationError::Shape { mode: Mode::Fix, .. })
    ));
}

#[tokio::test]
async fn test_fix_prompt_carries_marker_and_schema() {
    let generator = ScriptedGenerator::new([Reply::ok(fix_json("const x = 1;"))]);

    let fix = client_for(&generator)
        .fix("var x = 1")
        .await
        .expect("fix result");
    assert_eq!(fix.fixed_code, "const x = 1;");

    let prompts = generator.prompts();
    let prompt = prompts.first().expect("one prompt");
    assert_eq!(prompt.mode, Mode::Fix);
    assert!(prompt.contents.starts_with(FIX_MARKER));
    assert!(prompt.contents.ends_with("var x = 1"));
    assert_eq!(
        prompt.response_schema["properties"]["mode"]["enum"][0],
        "fix"
    );
}

#[tokio::test]
async fn test_roast_prompt_names_archetype_to_avoid() {
    let generator = ScriptedGenerator::new([Reply::ok(roast_json("The Tangled Weaver"))]);

    client_for(&generator)
        .roast("x", Some("The Spaghetti Chef".to_string()))
        .await;

    let prompts = generator.prompts();
    let prompt = prompts.first().expect("one prompt");
    assert_eq!(prompt.mode, Mode::Roast);
    assert!(
        prompt
            .system_instruction
            .contains("The previous roast used \"The Spaghetti Chef\"")
    );
    assert!((prompt.temperature - 0.9).abs() < f32::EPSILON);
}

#[test]
fn test_request_mode_detection() {
    assert_eq!(RoastRequest::from_text("MODE: FIX \n\nx").mode, Mode::Fix);
    assert_eq!(RoastRequest::from_text("fn main() {}").mode, Mode::Roast);
    assert_eq!(RoastRequest::roast("x").avoiding(Some("  ".to_string())).avoid_archetype, None);
}
