//! 수신 메시지 분류기.
//!
//! 원시 텍스트 프레임 → [`ClassifiedMessage`]. 상태 없음, 실패 없음:
//! 잘못된 입력은 `Unparseable`로 강등된다.

use serde_json::{Map, Value};

use crate::models::message::{ClassifiedMessage, MessageKind};

/// 알림 본문 최대 글자 수
pub const PREVIEW_LIMIT: usize = 100;

/// 잘림 표시
const ELLIPSIS: &str = "...";

const UNKNOWN_SENDER: &str = "unknown";
const ENCRYPTED_PLACEHOLDER: &str = "🔒 암호화된 메시지";
const DEFAULT_FILE_NAME: &str = "파일";
const DEFAULT_DURATION: &str = "0";

/// 원시 페이로드 분류
///
/// 우선순위: 시스템 > 암호화 > 음성(파일+오디오) > 파일 > 텍스트
pub fn classify(raw: &str) -> ClassifiedMessage {
    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        _ => {
            return ClassifiedMessage {
                kind: MessageKind::Unparseable,
                sender: UNKNOWN_SENDER.to_string(),
                display_text: truncate_preview(raw),
                file_name: None,
                audio_duration: None,
            }
        }
    };

    let sender = string_field(&object, "username").unwrap_or_else(|| UNKNOWN_SENDER.to_string());
    let text = string_field(&object, "text").unwrap_or_default();

    if flag(&object, "isSystem") || flag(&object, "isKillAll") {
        return ClassifiedMessage {
            kind: MessageKind::System,
            sender,
            display_text: truncate_preview(&text),
            file_name: None,
            audio_duration: None,
        };
    }

    let is_file = flag(&object, "isFile");
    let mut file_name = None;
    let mut audio_duration = None;

    let (kind, display_text) = if flag(&object, "isEncrypted") {
        (MessageKind::UserEncrypted, ENCRYPTED_PLACEHOLDER.to_string())
    } else if is_file && flag(&object, "isAudio") {
        let duration =
            string_field(&object, "duration").unwrap_or_else(|| DEFAULT_DURATION.to_string());
        let body = truncate_preview(&format!("🎤 음성 메시지 ({duration}초)"));
        audio_duration = Some(duration);
        (MessageKind::UserAudio, body)
    } else if is_file {
        let name =
            string_field(&object, "fileName").unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        let body = truncate_preview(&format!("📎 {name}"));
        file_name = Some(name);
        (MessageKind::UserFile, body)
    } else {
        (MessageKind::UserText, truncate_preview(&text))
    };

    ClassifiedMessage {
        kind,
        sender,
        display_text,
        file_name,
        audio_duration,
    }
}

/// 100자 초과 시 100자 + "..."
pub fn truncate_preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_LIMIT) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// 불리언 플래그. 문자열 "true"도 허용, 그 외 타입은 false.
fn flag(object: &Map<String, Value>, key: &str) -> bool {
    match object.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// 문자열 필드. 숫자/불리언은 문자열로 변환, null·객체·배열은 없음으로 본다.
fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(encrypted: bool, file: bool, audio: bool) -> String {
        serde_json::json!({
            "username": "bob",
            "text": "hello",
            "isEncrypted": encrypted,
            "isFile": file,
            "isAudio": audio,
            "fileName": "report.pdf",
            "duration": "12",
        })
        .to_string()
    }

    #[test]
    fn malformed_payloads_are_unparseable() {
        for raw in ["", "not json", "{", "[1,2,3]", "\"string\"", "42", "null"] {
            let msg = classify(raw);
            assert_eq!(msg.kind, MessageKind::Unparseable, "payload: {raw:?}");
            assert_eq!(msg.display_text, raw);
        }
    }

    #[test]
    fn long_unparseable_is_truncated() {
        let raw = "x".repeat(150);
        let msg = classify(&raw);
        assert_eq!(msg.kind, MessageKind::Unparseable);
        assert_eq!(msg.display_text, format!("{}...", "x".repeat(100)));
    }

    #[test]
    fn system_flags_win_over_everything() {
        let cases = [
            r#"{"isSystem":true,"isEncrypted":true,"isFile":true,"isAudio":true}"#,
            r#"{"isKillAll":true,"text":"bye"}"#,
            r#"{"isSystem":false,"isKillAll":true,"isFile":true}"#,
        ];
        for raw in cases {
            let msg = classify(raw);
            assert_eq!(msg.kind, MessageKind::System, "payload: {raw}");
            assert!(msg.kind.is_suppressed());
        }
    }

    #[test]
    fn precedence_over_all_flag_combinations() {
        let expected = [
            // (encrypted, file, audio) → kind
            ((false, false, false), MessageKind::UserText),
            ((false, false, true), MessageKind::UserText),
            ((false, true, false), MessageKind::UserFile),
            ((false, true, true), MessageKind::UserAudio),
            ((true, false, false), MessageKind::UserEncrypted),
            ((true, false, true), MessageKind::UserEncrypted),
            ((true, true, false), MessageKind::UserEncrypted),
            ((true, true, true), MessageKind::UserEncrypted),
        ];
        for ((encrypted, file, audio), kind) in expected {
            let msg = classify(&payload(encrypted, file, audio));
            assert_eq!(msg.kind, kind, "flags: {encrypted} {file} {audio}");
        }
    }

    #[test]
    fn encrypted_never_exposes_content() {
        let msg = classify(r#"{"username":"eve","text":"secret","isEncrypted":true}"#);
        assert_eq!(msg.display_text, ENCRYPTED_PLACEHOLDER);
        assert!(!msg.display_text.contains("secret"));
    }

    #[test]
    fn audio_body_contains_duration() {
        let msg = classify(r#"{"isFile":true,"isAudio":true,"duration":"7"}"#);
        assert_eq!(msg.kind, MessageKind::UserAudio);
        assert!(msg.display_text.contains('7'));
        assert_eq!(msg.audio_duration.as_deref(), Some("7"));
        assert_eq!(msg.sender, UNKNOWN_SENDER);
    }

    #[test]
    fn audio_duration_defaults_to_zero_and_accepts_numbers() {
        let msg = classify(r#"{"isFile":true,"isAudio":true}"#);
        assert_eq!(msg.audio_duration.as_deref(), Some("0"));

        let msg = classify(r#"{"isFile":true,"isAudio":true,"duration":15}"#);
        assert_eq!(msg.audio_duration.as_deref(), Some("15"));
    }

    #[test]
    fn oversized_audio_duration_is_truncated() {
        let duration = "9".repeat(150);
        let raw = serde_json::json!({"isFile": true, "isAudio": true, "duration": duration});
        let msg = classify(&raw.to_string());

        assert_eq!(msg.kind, MessageKind::UserAudio);
        assert_eq!(msg.display_text.chars().count(), PREVIEW_LIMIT + ELLIPSIS.len());
        assert!(msg.display_text.ends_with(ELLIPSIS));
        assert_eq!(msg.audio_duration.as_deref(), Some(duration.as_str()));
    }

    #[test]
    fn file_name_and_default() {
        let msg = classify(r#"{"username":"bob","isFile":true,"fileName":"cat.png"}"#);
        assert_eq!(msg.kind, MessageKind::UserFile);
        assert_eq!(msg.file_name.as_deref(), Some("cat.png"));
        assert!(msg.display_text.contains("cat.png"));

        let msg = classify(r#"{"isFile":true}"#);
        assert_eq!(msg.file_name.as_deref(), Some(DEFAULT_FILE_NAME));
    }

    #[test]
    fn text_truncation_boundary() {
        let exact = "a".repeat(100);
        let msg = classify(&serde_json::json!({ "text": exact }).to_string());
        assert_eq!(msg.display_text, exact);

        let long = "b".repeat(101);
        let msg = classify(&serde_json::json!({ "text": long }).to_string());
        assert_eq!(msg.display_text.chars().count(), 103);
        assert!(msg.display_text.ends_with("..."));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let korean = "가".repeat(120);
        let preview = truncate_preview(&korean);
        assert_eq!(preview, format!("{}...", "가".repeat(100)));
    }

    #[test]
    fn sender_and_unknown_fields() {
        let msg = classify(r#"{"username":"bob","text":"hi","room":"lobby","x":[1]}"#);
        assert_eq!(msg.kind, MessageKind::UserText);
        assert_eq!(msg.sender, "bob");
        assert_eq!(msg.display_text, "hi");

        let msg = classify(r#"{"text":"hi","username":null}"#);
        assert_eq!(msg.sender, UNKNOWN_SENDER);
    }

    #[test]
    fn string_flags_are_accepted() {
        let msg = classify(r#"{"isEncrypted":"true","text":"s"}"#);
        assert_eq!(msg.kind, MessageKind::UserEncrypted);

        let msg = classify(r#"{"isFile":1,"text":"plain"}"#);
        assert_eq!(msg.kind, MessageKind::UserText);
    }
}
