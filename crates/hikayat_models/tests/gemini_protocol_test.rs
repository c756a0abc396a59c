#![cfg(feature = "gemini")]

// Request shapes and response parsing against recorded API payloads.

use hikayat_core::StoryText;
use hikayat_error::{GeminiErrorKind, HikayatErrorKind, StoryErrorKind};
use hikayat_models::{
    GenerateContentResponse, STYLE_SUFFIX, analysis_request, extract_image, image_request,
    parse_analysis,
};
use hikayat_rate_limit::ModelSettings;
use serde_json::Value;

fn fixture(json: &str) -> GenerateContentResponse {
    serde_json::from_str(json).expect("fixture should deserialize")
}

//
// ─── REQUESTS ───────────────────────────────────────────────────────────────────
//

#[test]
fn test_analysis_request_shape() -> anyhow::Result<()> {
    let story = StoryText::new("  كان يا ما كان، ولد اسمه كريم يحب القطط.  ")?;
    let value = serde_json::to_value(analysis_request(&story))?;

    assert_eq!(value["contents"][0]["role"], "user");
    let text = value["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("prompt text");
    assert!(text.contains("Moroccan children's books"));
    assert!(text.ends_with("كان يا ما كان، ولد اسمه كريم يحب القطط."));

    let config = &value["generationConfig"];
    assert_eq!(config["responseMimeType"], "application/json");
    assert!(config.get("imageConfig").is_none());

    let items = &config["responseSchema"]["properties"]["scenes"]["items"];
    assert_eq!(items["type"], "OBJECT");
    let required: Vec<&str> = items["required"]
        .as_array()
        .expect("required list")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(required, ["narrative_segment", "visual_prompt", "characters"]);
    Ok(())
}

#[test]
fn test_image_request_shape() -> anyhow::Result<()> {
    let settings = ModelSettings::default();
    let value = serde_json::to_value(image_request("A cat on a riad roof", &settings))?;

    let text = value["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("prompt text");
    assert_eq!(text, format!("A cat on a riad roof{}", STYLE_SUFFIX));

    let config = &value["generationConfig"];
    assert_eq!(config["imageConfig"]["aspectRatio"], "1:1");
    assert_eq!(config["imageConfig"]["imageSize"], "1K");
    assert!(config.get("responseMimeType").is_none());
    assert!(config.get("responseSchema").is_none());
    Ok(())
}

#[test]
fn test_image_request_is_constant_across_prompts() -> anyhow::Result<()> {
    let settings = ModelSettings::default();
    let first = serde_json::to_value(image_request("one", &settings))?;
    let second = serde_json::to_value(image_request("two", &settings))?;

    assert_eq!(first["generationConfig"], second["generationConfig"]);
    Ok(())
}

//
// ─── ANALYSIS RESPONSES ─────────────────────────────────────────────────────────
//

#[test]
fn test_parse_analysis_fixture() {
    let response = fixture(include_str!("fixtures/analysis_response.json"));
    let analysis = parse_analysis(&response).unwrap();

    assert_eq!(analysis.len(), 3);
    assert!(analysis.scenes[0].narrative_segment.starts_with("في صباح مشمس"));
    assert!(analysis.scenes[1].visual_prompt.contains("Fes pottery"));
    assert!(analysis.scenes[2].characters.contains("Grandfather"));
    assert_eq!(response.usage_metadata.map(|u| u.total_token_count), Some(801));
}

#[test]
fn test_parse_fenced_analysis() {
    let response = fixture(include_str!("fixtures/fenced_analysis_response.json"));
    let analysis = parse_analysis(&response).unwrap();

    // Fewer scenes than requested is accepted.
    assert_eq!(analysis.len(), 1);
}

#[test]
fn test_parse_analysis_without_text() {
    let response = fixture(include_str!("fixtures/blocked_response.json"));
    let err = parse_analysis(&response).unwrap_err();

    match err.kind() {
        HikayatErrorKind::Story(e) => assert_eq!(e.kind, StoryErrorKind::MissingText),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_parse_analysis_not_json() {
    let response = fixture(include_str!("fixtures/text_only_response.json"));
    let err = parse_analysis(&response).unwrap_err();

    assert!(matches!(
        err.kind(),
        HikayatErrorKind::Story(e) if matches!(e.kind, StoryErrorKind::MalformedAnalysis(_))
    ));
}

#[test]
fn test_parse_analysis_wrong_shape() {
    let response = fixture(
        r#"{"candidates": [{"content": {"parts": [{"text": "{\"scenes\": [{\"visual_prompt\": \"x\"}]}"}]}}]}"#,
    );
    let err = parse_analysis(&response).unwrap_err();

    assert!(matches!(
        err.kind(),
        HikayatErrorKind::Story(e) if matches!(e.kind, StoryErrorKind::MalformedAnalysis(_))
    ));
}

#[test]
fn test_parse_analysis_zero_scenes() {
    let response =
        fixture(r#"{"candidates": [{"content": {"parts": [{"text": "{\"scenes\": []}"}]}}]}"#);
    let err = parse_analysis(&response).unwrap_err();

    match err.kind() {
        HikayatErrorKind::Story(e) => assert_eq!(e.kind, StoryErrorKind::NoScenes),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_thought_parts_are_ignored() {
    let response = fixture(
        r#"{"candidates": [{"content": {"parts": [
            {"text": "Let me think about {braces}", "thought": true},
            {"text": "{\"scenes\": [{\"narrative_segment\": \"a\", \"visual_prompt\": \"b\", \"characters\": \"c\"}]}"}
        ]}}]}"#,
    );

    let analysis = parse_analysis(&response).unwrap();
    assert_eq!(analysis.scenes[0].visual_prompt, "b");
}

//
// ─── IMAGE RESPONSES ────────────────────────────────────────────────────────────
//

#[test]
fn test_extract_image_fixture() {
    let response = fixture(include_str!("fixtures/image_response.json"));
    let artifact = extract_image(&response, "gemini-3-pro-image-preview").unwrap();

    assert_eq!(artifact.mime(), "image/png");
    assert_eq!(artifact.len(), 16);
    assert_eq!(&artifact.data()[1..4], b"PNG");
    assert_eq!(artifact.file_extension(), "png");
    assert!(artifact.data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
}

#[test]
fn test_extract_image_without_inline_data() {
    let response = fixture(include_str!("fixtures/text_only_response.json"));
    let err = extract_image(&response, "gemini-3-pro-image-preview").unwrap_err();

    match err.kind() {
        HikayatErrorKind::Gemini(e) => assert_eq!(
            e.kind,
            GeminiErrorKind::NoImageData("gemini-3-pro-image-preview".to_string())
        ),
        other => panic!("unexpected error: {}", other),
    }
    assert!(!err.is_retryable());
}

#[test]
fn test_extract_image_bad_base64() {
    let response = fixture(
        r#"{"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "***"}}]}}]}"#,
    );
    let err = extract_image(&response, "m").unwrap_err();

    assert!(matches!(
        err.kind(),
        HikayatErrorKind::Gemini(e) if matches!(e.kind, GeminiErrorKind::Base64Decode(_))
    ));
}

#[test]
fn test_extract_image_defaults_mime() {
    let response = fixture(
        r#"{"candidates": [{"content": {"parts": [{"inlineData": {"data": "AAEC"}}]}}]}"#,
    );
    let artifact = extract_image(&response, "m").unwrap();

    assert_eq!(artifact.mime(), "image/png");
    assert_eq!(artifact.data(), &[0u8, 1, 2]);
}
